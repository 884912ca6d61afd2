//! Cell arithmetic for operator instructions.

/// Transform applied to the current cell by an operator instruction.
///
/// The byte passed in is the raw instruction (`+` or `-`). Implemented for
/// [`Arithmetic`] and for any `Fn(u8, u8) -> u8` closure, so callers can
/// swap in their own behaviour:
///
/// ```
/// use stream_bf::Engine;
///
/// let mut engine = Engine::new();
/// engine.set_operator(|instruction: u8, cell: u8| match instruction {
///     b'+' => cell.wrapping_mul(2).max(1),
///     _ => cell / 2,
/// });
/// ```
pub trait CellOperator: Send {
    fn apply(&self, instruction: u8, cell: u8) -> u8;
}

/// Wrapping add/subtract with configurable deltas (1 and 1 by default).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arithmetic {
    pub increment: u8,
    pub decrement: u8,
}

impl Default for Arithmetic {
    fn default() -> Self {
        Self {
            increment: 1,
            decrement: 1,
        }
    }
}

impl CellOperator for Arithmetic {
    fn apply(&self, instruction: u8, cell: u8) -> u8 {
        match instruction {
            b'+' => cell.wrapping_add(self.increment),
            b'-' => cell.wrapping_sub(self.decrement),
            _ => cell,
        }
    }
}

impl<F> CellOperator for F
where
    F: Fn(u8, u8) -> u8 + Send,
{
    fn apply(&self, instruction: u8, cell: u8) -> u8 {
        self(instruction, cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_arithmetic_wraps() {
        let ops = Arithmetic::default();
        assert_eq!(ops.apply(b'+', 255), 0);
        assert_eq!(ops.apply(b'-', 0), 255);
        assert_eq!(ops.apply(b'+', 1), 2);
    }

    #[test]
    fn custom_deltas() {
        let ops = Arithmetic {
            increment: 2,
            decrement: 3,
        };
        assert_eq!(ops.apply(b'+', 1), 3);
        assert_eq!(ops.apply(b'-', 1), 254);
    }

    #[test]
    fn closures_are_operators() {
        let double = |instruction: u8, cell: u8| {
            if instruction == b'+' { cell * 2 } else { cell / 2 }
        };
        assert_eq!(double.apply(b'+', 3), 6);
        assert_eq!(double.apply(b'-', 6), 3);
    }
}
