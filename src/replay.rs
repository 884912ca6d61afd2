//! Replay driver.
//!
//! Re-executes a recorded loop body in place. A cursor walks the body one
//! step at a time and wraps back to the first step after the last one; each
//! time it wraps, the zero test on the current cell decides whether another
//! pass runs. Nested loop steps are replayed recursively with the same rule.

use crate::EngineError;
use crate::instruction::Instruction;
use crate::loops::Step;

/// What the replay driver needs from the machine it drives.
pub(crate) trait Machine {
    /// Value of the cell under the pointer.
    fn cell(&self) -> u8;

    /// Account for one replay pass (step limits, cancellation).
    fn tick(&mut self) -> Result<(), EngineError>;

    /// Apply a single recorded instruction.
    fn execute(&mut self, instruction: Instruction) -> Result<(), EngineError>;

    /// A nested loop step is about to be replayed.
    fn enter_loop(&mut self) {}

    /// The nested loop step finished, or failed.
    fn leave_loop(&mut self) {}
}

/// Step index into a recorded body that wraps after the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor {
    step: usize,
    step_count: usize,
}

impl Cursor {
    pub(crate) fn new(step_count: usize) -> Self {
        Self {
            step: 0,
            step_count,
        }
    }

    pub(crate) fn step(&self) -> usize {
        self.step
    }

    /// True before the first step of a pass.
    pub(crate) fn at_start(&self) -> bool {
        self.step == 0
    }

    pub(crate) fn walk(&mut self) {
        self.step += 1;
        if self.step >= self.step_count {
            self.step = 0;
        }
    }
}

/// Run `body` for as long as the current cell is non-zero at a pass boundary.
///
/// Returns the number of full passes executed. A loop whose body never zeroes
/// the cell spins here until the machine's `tick` refuses to continue.
pub(crate) fn replay<M: Machine>(machine: &mut M, body: &[Step]) -> Result<u64, EngineError> {
    let mut cursor = Cursor::new(body.len());
    let mut passes = 0u64;

    loop {
        if cursor.at_start() {
            if machine.cell() == 0 {
                return Ok(passes);
            }
            machine.tick()?;
            passes += 1;
        }

        match body.get(cursor.step()) {
            Some(Step::Op(instruction)) => machine.execute(*instruction)?,
            Some(Step::Loop(inner)) => {
                machine.enter_loop();
                let result = replay(machine, inner);
                machine.leave_loop();
                result?;
            }
            None => {}
        }
        cursor.walk();
    }
}
