//! The streaming engine.
//!
//! [`Engine::process`] is the single entry point: the caller pushes one
//! instruction byte at a time and the engine never asks for earlier bytes
//! again. Backward control flow is reproduced by recording each loop body on
//! its first pass and replaying it from the recording, see [`crate::loops`]
//! and [`crate::replay`].

use tracing::{debug, trace, warn};

use crate::control::StepControl;
use crate::error::EngineError;
use crate::instruction::{Category, Instruction};
use crate::loops::{FrameState, LoopStack, Step};
use crate::operator::{Arithmetic, CellOperator};
use crate::render::Render;
use crate::replay::{self, Machine};
use crate::tape::Tape;

/// Snapshot handed to a trace observer after every executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trace {
    /// Zero-based index among executed instructions. Replay pass checks
    /// count against a step limit but get no index.
    pub step: u64,
    pub instruction: u8,
    pub pointer_before: i64,
    pub cell_before: u8,
    pub pointer: i64,
    pub cell: u8,
    /// Number of open loops when the instruction ran.
    pub depth: usize,
    /// Whether the instruction came from a recorded loop body.
    pub replay: bool,
}

/// Single-pass interpreter over a stream of instruction bytes.
///
/// The engine owns its tape and loop stack; nothing is shared between
/// instances.
pub struct Engine {
    tape: Tape,
    loops: LoopStack,
    operator: Box<dyn CellOperator>,
    render: Render,
    output_sink: Option<Box<dyn FnMut(&str) + Send>>,
    observer: Option<Box<dyn FnMut(&Trace) + Send>>,
    control: Option<StepControl>,
    strict_loops: bool,
    steps: u64,
    executed: u64,
    replay_depth: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// A fresh engine: tape `{0: 0}`, pointer 0, no open loops.
    pub fn new() -> Self {
        Self {
            tape: Tape::new(),
            loops: LoopStack::new(),
            operator: Box::new(Arithmetic::default()),
            render: Render::default(),
            output_sink: None,
            observer: None,
            control: None,
            strict_loops: false,
            steps: 0,
            executed: 0,
            replay_depth: 0,
        }
    }

    /// Replace the cell arithmetic used by `+` and `-`.
    pub fn set_operator<O>(&mut self, operator: O)
    where
        O: CellOperator + 'static,
    {
        self.operator = Box::new(operator);
    }

    pub fn set_render(&mut self, render: Render) {
        self.render = render;
    }

    /// Provide an output sink. When set, every `.` sends its rendered line
    /// here instead of stdout.
    pub fn set_output_sink<F>(&mut self, sink: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.output_sink = Some(Box::new(sink));
    }

    /// Observe every executed instruction, including replayed ones.
    pub fn set_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&Trace) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn set_step_control(&mut self, control: StepControl) {
        self.control = Some(control);
    }

    /// Treat an unmatched `]` and loops left open at [`finish`](Self::finish)
    /// as errors instead of ignoring them.
    pub fn set_strict_loops(&mut self, strict: bool) {
        self.strict_loops = strict;
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Number of currently open loops, counting those being replayed.
    pub fn depth(&self) -> usize {
        self.loops.depth() + self.replay_depth
    }

    pub fn loop_state(&self) -> Option<FrameState> {
        self.loops.state()
    }

    /// Steps counted against a step limit: executed instructions, replayed
    /// ones included, plus one per replay pass.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Push one instruction byte.
    ///
    /// An unrecognized byte is reported before anything else happens, so the
    /// engine is left exactly as it was and the caller may keep pushing.
    /// Otherwise a loop whose body finished recording on a non-zero cell is
    /// replayed to completion first, then the new instruction is dispatched.
    pub fn process(&mut self, byte: u8) -> Result<(), EngineError> {
        let instruction = Instruction::decode(byte)?;
        self.flush()?;

        match instruction.category {
            Category::Ignore => Ok(()),
            Category::Looper if byte == b'[' => {
                self.open_loop();
                Ok(())
            }
            Category::Looper => self.close_loop(),
            Category::Operator | Category::Mover | Category::Retriever => {
                self.dispatch(instruction)
            }
        }
    }

    /// Push every byte of `code` in order, stopping at the first error.
    pub fn process_all(&mut self, code: &[u8]) -> Result<(), EngineError> {
        code.iter().try_for_each(|&byte| self.process(byte))
    }

    /// Resolve a loop that is waiting for replay.
    ///
    /// Replay is normally triggered by the next pushed byte; call this when
    /// no further byte may come for a while (e.g. after a REPL submission).
    pub fn flush(&mut self) -> Result<(), EngineError> {
        while let Some(frame) = self.loops.take_pending() {
            let depth = self.loops.depth() + 1;
            debug!(depth, steps = frame.step_count(), "replaying loop body");

            self.replay_depth = 1;
            let result = replay::replay(self, &frame.body);
            self.replay_depth = 0;

            // the parent keeps the loop even when the replay was cut short
            self.loops.nest(frame.body);
            let passes = result?;
            debug!(depth, passes, "loop closed after replay");
        }
        Ok(())
    }

    /// Signal end of input: resolve any pending replay and check for loops
    /// that were never closed.
    pub fn finish(&mut self) -> Result<(), EngineError> {
        self.flush()?;

        let depth = self.loops.depth();
        if depth > 0 {
            if self.strict_loops {
                return Err(EngineError::UnclosedLoop { depth });
            }
            warn!(depth, "input ended inside an open loop");
        }
        Ok(())
    }

    /// Drop all program state, keeping sinks, operator and limits.
    pub fn reset(&mut self) {
        self.tape = Tape::new();
        self.loops.clear();
        self.steps = 0;
        self.executed = 0;
        self.replay_depth = 0;
    }

    fn dispatch(&mut self, instruction: Instruction) -> Result<(), EngineError> {
        if !self.loops.is_skipping() {
            self.apply(instruction)?;
        }
        self.loops.record(Step::Op(instruction));
        Ok(())
    }

    fn open_loop(&mut self) {
        let state = if self.loops.is_skipping() || self.tape.read() == 0 {
            FrameState::Skipping
        } else {
            FrameState::Recording
        };
        self.loops.open(state);
        debug!(depth = self.loops.depth(), ?state, "loop opened");
    }

    fn close_loop(&mut self) -> Result<(), EngineError> {
        let Some(state) = self.loops.state() else {
            if self.strict_loops {
                return Err(EngineError::MalformedLoop);
            }
            warn!(pointer = self.tape.pointer(), "ignoring ']' with no open loop");
            return Ok(());
        };

        if state == FrameState::Recording && self.tape.read() != 0 {
            self.loops.begin_replay();
            debug!(depth = self.loops.depth(), "loop body recorded, replay pending");
        } else if let Some(frame) = self.loops.pop() {
            debug!(depth = self.loops.depth() + 1, ?state, "loop closed");
            self.loops.nest(frame.body);
        }
        Ok(())
    }

    fn count_step(&mut self) -> Result<(), EngineError> {
        if let Some(ctrl) = self.control.as_ref() {
            ctrl.check(self.steps)?;
        }
        self.steps += 1;
        Ok(())
    }

    fn apply(&mut self, instruction: Instruction) -> Result<(), EngineError> {
        self.count_step()?;
        let (pointer_before, cell_before) = (self.tape.pointer(), self.tape.read());

        match instruction.category {
            Category::Operator => {
                let after = self.operator.apply(instruction.byte, cell_before);
                self.tape.write(after);
            }
            Category::Mover => {
                if instruction.byte == b'<' {
                    self.tape.move_left();
                } else {
                    self.tape.move_right();
                }
            }
            Category::Retriever => {
                let line = self.render.render(&self.tape);
                self.emit(&line);
            }
            Category::Looper | Category::Ignore => {}
        }

        let event = Trace {
            step: self.executed,
            instruction: instruction.byte,
            pointer_before,
            cell_before,
            pointer: self.tape.pointer(),
            cell: self.tape.read(),
            depth: self.depth(),
            replay: self.replay_depth > 0,
        };
        self.executed += 1;
        trace!(
            instr = %(event.instruction as char),
            ptr = event.pointer,
            cell = event.cell,
            depth = event.depth,
            replay = event.replay,
            "executed"
        );
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
        Ok(())
    }

    fn emit(&mut self, line: &str) {
        match self.output_sink.as_mut() {
            Some(sink) => sink(line),
            None => println!("{line}"),
        }
    }
}

impl Machine for Engine {
    fn cell(&self) -> u8 {
        self.tape.read()
    }

    fn tick(&mut self) -> Result<(), EngineError> {
        self.count_step()
    }

    fn execute(&mut self, instruction: Instruction) -> Result<(), EngineError> {
        self.apply(instruction)
    }

    fn enter_loop(&mut self) {
        self.replay_depth += 1;
    }

    fn leave_loop(&mut self) {
        self.replay_depth = self.replay_depth.saturating_sub(1);
    }
}
