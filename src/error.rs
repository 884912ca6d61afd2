/// Errors that can occur while streaming instructions into an [`Engine`](crate::Engine).
///
/// Only [`EngineError::UnrecognizedInstruction`] is produced by a default engine.
/// The remaining variants appear when strict loop checking or a
/// [`StepControl`](crate::StepControl) guard has been switched on.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    /// The pushed byte belongs to none of the instruction categories.
    /// No engine state was touched.
    #[error("unrecognized instruction: byte {byte} ({})", describe(*byte))]
    UnrecognizedInstruction { byte: u8 },

    /// A loop-close arrived while no loop was open (strict mode only).
    #[error("malformed loop: ']' without a matching '['")]
    MalformedLoop,

    /// Input ended while loops were still open (strict mode only).
    #[error("unclosed loop: {depth} '[' still open at end of input")]
    UnclosedLoop { depth: usize },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: u64 },

    /// Execution aborted due to cooperative cancellation (e.g., timeout)
    #[error("Execution aborted: cancelled")]
    Canceled,
}

fn describe(byte: u8) -> String {
    if byte.is_ascii_graphic() {
        format!("'{}'", byte as char)
    } else {
        format!("{byte:#04x}")
    }
}
