//! Byte-at-a-time driver.
//!
//! Pulls bytes from any reader and pushes them into an [`Engine`], one call
//! per byte, remembering the offset of each so failures can be located in the
//! source afterwards.

use std::io::{self, BufReader, Read};

use tracing::debug;

use crate::{Engine, EngineError};

/// What to do when a byte is not an instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnInvalid {
    /// Stop and report the byte.
    #[default]
    Abort,
    /// Drop the byte and continue with the next one.
    Skip,
}

/// A failure while driving an engine, with the byte offset it happened at.
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("{source} at byte {offset}")]
    Engine {
        offset: usize,
        #[source]
        source: EngineError,
    },

    #[error("I/O error at byte {offset}: {source}")]
    Io {
        offset: usize,
        #[source]
        source: io::Error,
    },
}

impl DriveError {
    pub fn offset(&self) -> usize {
        match self {
            DriveError::Engine { offset, .. } | DriveError::Io { offset, .. } => *offset,
        }
    }

    /// The engine error, if this failure came from the engine.
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            DriveError::Engine { source, .. } => Some(source),
            DriveError::Io { .. } => None,
        }
    }
}

pub struct Driver {
    engine: Engine,
    on_invalid: OnInvalid,
    offset: usize,
    skipped: usize,
}

impl Driver {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            on_invalid: OnInvalid::default(),
            offset: 0,
            skipped: 0,
        }
    }

    pub fn set_on_invalid(&mut self, on_invalid: OnInvalid) {
        self.on_invalid = on_invalid;
    }

    /// Push a single byte, applying the invalid-byte policy.
    pub fn push(&mut self, byte: u8) -> Result<(), DriveError> {
        let offset = self.offset;
        self.offset += 1;

        match self.engine.process(byte) {
            Ok(()) => Ok(()),
            Err(EngineError::UnrecognizedInstruction { byte }) if self.on_invalid == OnInvalid::Skip => {
                debug!(offset, byte, "skipping unrecognized byte");
                self.skipped += 1;
                Ok(())
            }
            Err(source) => Err(DriveError::Engine { offset, source }),
        }
    }

    /// Stream every byte of `source` into the engine without ending input.
    pub fn feed<R: Read>(&mut self, source: R) -> Result<(), DriveError> {
        for byte in BufReader::new(source).bytes() {
            let byte = byte.map_err(|source| DriveError::Io {
                offset: self.offset,
                source,
            })?;
            self.push(byte)?;
        }
        Ok(())
    }

    /// End of input: see [`Engine::finish`].
    pub fn finish(&mut self) -> Result<(), DriveError> {
        self.engine.finish().map_err(|source| DriveError::Engine {
            offset: self.offset,
            source,
        })
    }

    /// Feed all of `source`, then finish.
    pub fn run<R: Read>(&mut self, source: R) -> Result<(), DriveError> {
        self.feed(source)?;
        self.finish()
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes dropped under [`OnInvalid::Skip`].
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }
}
