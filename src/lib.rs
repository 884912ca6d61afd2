//! A streaming Brainfuck-style interpreter.
//!
//! Instructions are pushed into an [`Engine`] one byte at a time and are never
//! re-read. Loops still work: the first time a loop body streams past it is
//! executed and recorded, and when its `]` finds a non-zero cell the recording
//! is replayed until the cell reaches zero. Auxiliary state grows with the
//! loops that are currently open, not with the program.
//!
//! Features and behaviors:
//! - Sparse tape of wrapping byte cells; the pointer is clamped at address 0.
//! - Instructions: `+ - < > [ ] .`; newline and space are ignored; any other
//!   byte is rejected without changing engine state.
//! - `.` renders the tape (current cell as a character, a number, or the
//!   whole tape) and sends one line to the output sink, in execution order.
//! - Optional step limit and cooperative cancellation.
//!
//! Quick start:
//!
//! ```
//! use stream_bf::{Engine, Render};
//! use std::sync::{Arc, Mutex};
//!
//! let lines = Arc::new(Mutex::new(Vec::new()));
//! let sink = lines.clone();
//!
//! let mut engine = Engine::new();
//! engine.set_render(Render::Decimal);
//! engine.set_output_sink(move |line| sink.lock().unwrap().push(line.to_string()));
//!
//! for &byte in b"+++[>+<-]>." {
//!     engine.process(byte).expect("valid instruction");
//! }
//! engine.finish().expect("loops resolved");
//!
//! assert_eq!(lines.lock().unwrap().as_slice(), ["3"]);
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod control;
pub mod driver;
pub mod engine;
pub mod error;
pub mod instruction;
pub mod logging;
pub mod loops;
pub mod operator;
pub mod render;
pub mod repl;
mod replay;
pub mod tape;
mod theme;

pub use config::{Config, ConfigError};
pub use control::StepControl;
pub use driver::{DriveError, Driver, OnInvalid};
pub use engine::{Engine, Trace};
pub use error::EngineError;
pub use instruction::{Category, Instruction, classify};
pub use loops::FrameState;
pub use operator::{Arithmetic, CellOperator};
pub use render::Render;
pub use tape::Tape;
