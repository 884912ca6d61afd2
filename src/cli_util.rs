use std::io::{self, Write};

use crate::{DriveError, EngineError};

/// Pretty-print a [`DriveError`] with caret positioning when the source is
/// at hand. If `program` is `Some("sbf")`, prefix messages with "sbf: ...".
pub fn print_drive_error(program: Option<&str>, code: Option<&[u8]>, err: &DriveError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    let msg = match err {
        DriveError::Engine { source, .. } => prefix_program(&describe(source)),
        DriveError::Io { source, .. } => prefix_program(&format!("I/O error: {source}")),
    };

    match code {
        Some(code) => print_error_with_context(&msg, code, err.offset()),
        None => {
            eprintln!("{msg} at byte {}", err.offset());
            let _ = io::stderr().flush();
        }
    }
}

fn describe(err: &EngineError) -> String {
    match err {
        EngineError::UnrecognizedInstruction { .. } => format!("Parse error: {err}"),
        EngineError::MalformedLoop | EngineError::UnclosedLoop { .. } => {
            format!("Loop error: {err}")
        }
        EngineError::StepLimitExceeded { .. } | EngineError::Canceled => err.to_string(),
    }
}

/// Print a concise error with byte offset and a caret context window.
/// Non-UTF-8 bytes in the window are shown lossily.
pub fn print_error_with_context(prefix: &str, code: &[u8], pos: usize) {
    eprintln!("{prefix} at byte {pos}");

    // Show a short window around the position for context
    const WINDOW_BYTES: usize = 32;

    let start = pos.saturating_sub(WINDOW_BYTES).min(code.len());
    let end = (pos + WINDOW_BYTES + 1).min(code.len());
    let slice = String::from_utf8_lossy(&code[start..end]);

    // newlines are instructions too; keep the window on one line
    eprintln!("  {}", slice.replace('\n', " "));

    let caret_offset = String::from_utf8_lossy(&code[start..pos.min(code.len())])
        .chars()
        .count();
    eprintln!("  {}^", " ".repeat(caret_offset));
    let _ = io::stderr().flush();
}
