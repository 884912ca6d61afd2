//! Rendering of retriever output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Tape;

/// How a retriever instruction turns the tape into a printable line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Render {
    /// The current cell as a character.
    #[default]
    Char,
    /// The current cell as a decimal number.
    Decimal,
    /// Every visited cell in address order, the pointer cell bracketed.
    Tape,
}

impl Render {
    pub fn render(&self, tape: &Tape) -> String {
        match self {
            Render::Char => (tape.read() as char).to_string(),
            Render::Decimal => tape.read().to_string(),
            Render::Tape => tape_view(tape),
        }
    }
}

/// `2 [3] 0` for a tape of three cells with the pointer on address 1.
pub fn tape_view(tape: &Tape) -> String {
    let pointer = tape.pointer();
    tape.cells()
        .map(|(addr, value)| {
            if addr == pointer {
                format!("[{value}]")
            } else {
                value.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for Render {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Render::Char => "char",
            Render::Decimal => "decimal",
            Render::Tape => "tape",
        };
        f.write_str(name)
    }
}

impl FromStr for Render {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "char" => Ok(Render::Char),
            "decimal" => Ok(Render::Decimal),
            "tape" => Ok(Render::Tape),
            other => Err(format!(
                "invalid output format: {other}, must be 'char', 'decimal' or 'tape'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tape() -> Tape {
        let mut tape = Tape::new();
        tape.write(2);
        tape.move_right();
        tape.write(b'A');
        tape.move_right();
        tape.move_left();
        tape
    }

    #[test]
    fn char_and_decimal_use_the_current_cell() {
        let tape = sample_tape();
        assert_eq!(Render::Char.render(&tape), "A");
        assert_eq!(Render::Decimal.render(&tape), "65");
    }

    #[test]
    fn tape_view_brackets_the_pointer() {
        let tape = sample_tape();
        assert_eq!(Render::Tape.render(&tape), "2 [65] 0");
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Decimal".parse::<Render>(), Ok(Render::Decimal));
        assert_eq!(" tape ".parse::<Render>(), Ok(Render::Tape));
        assert!("hex".parse::<Render>().is_err());
    }
}
