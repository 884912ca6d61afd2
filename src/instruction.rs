//! Instruction classification.
//!
//! Every pushed byte is mapped onto one of five fixed categories before the
//! engine does anything else with it. The mapping is a pure function.

use std::fmt;

use crate::EngineError;

/// Semantic category of an instruction byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `+` and `-`: transform the current cell.
    Operator,
    /// `<` and `>`: move the pointer.
    Mover,
    /// `[` and `]`: open or close a loop.
    Looper,
    /// `.`: hand the current tape view to the output collaborator.
    Retriever,
    /// newline and space: no effect.
    Ignore,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Operator => "operator",
            Category::Mover => "mover",
            Category::Looper => "looper",
            Category::Retriever => "retriever",
            Category::Ignore => "ignore",
        };
        f.write_str(name)
    }
}

/// A classified instruction: its category plus the raw byte it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub category: Category,
    pub byte: u8,
}

impl Instruction {
    /// Classify `byte`, keeping it alongside its category.
    pub fn decode(byte: u8) -> Result<Self, EngineError> {
        classify(byte).map(|category| Self { category, byte })
    }
}

/// Map a raw byte onto its [`Category`].
///
/// Fails with [`EngineError::UnrecognizedInstruction`] for anything outside
/// `+-<>[].`, newline and space.
pub fn classify(byte: u8) -> Result<Category, EngineError> {
    match byte {
        b'+' | b'-' => Ok(Category::Operator),
        b'<' | b'>' => Ok(Category::Mover),
        b'[' | b']' => Ok(Category::Looper),
        b'.' => Ok(Category::Retriever),
        b'\n' | b' ' => Ok(Category::Ignore),
        _ => Err(EngineError::UnrecognizedInstruction { byte }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fixed_byte_has_its_category() {
        let cases = [
            (b'+', Category::Operator),
            (b'-', Category::Operator),
            (b'<', Category::Mover),
            (b'>', Category::Mover),
            (b'[', Category::Looper),
            (b']', Category::Looper),
            (b'.', Category::Retriever),
            (b'\n', Category::Ignore),
            (b' ', Category::Ignore),
        ];
        for (byte, want) in cases {
            assert_eq!(classify(byte), Ok(want), "byte {byte}");
        }
    }

    #[test]
    fn everything_else_is_rejected() {
        let known = b"+-<>[]. \n";
        for byte in 0..=u8::MAX {
            if known.contains(&byte) {
                continue;
            }
            assert_eq!(
                classify(byte),
                Err(EngineError::UnrecognizedInstruction { byte })
            );
        }
    }

    #[test]
    fn input_instruction_is_not_supported() {
        assert!(classify(b',').is_err());
        assert!(classify(b'\t').is_err());
        assert!(classify(b'\r').is_err());
    }

    #[test]
    fn classification_is_stable() {
        for byte in [b'+', b'[', b'.', 0x7f] {
            assert_eq!(classify(byte), classify(byte));
        }
    }

    #[test]
    fn decode_keeps_the_raw_byte() {
        let instr = Instruction::decode(b'>').unwrap();
        assert_eq!(instr.category, Category::Mover);
        assert_eq!(instr.byte, b'>');
    }
}
