//! Loop stack: one frame per open loop.
//!
//! A frame records the body of its loop the first time the body streams
//! past. Once the body is complete the frame can be replayed without ever
//! looking at the source again. A loop that closes while an enclosing loop is
//! still recording is folded into the parent's body as a single nested step,
//! so the parent's own recording state survives untouched.

use crate::instruction::Instruction;

/// One recorded step of a loop body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A primitive instruction (operator, mover or retriever).
    Op(Instruction),
    /// A complete inner loop, run with while-non-zero semantics.
    Loop(Vec<Step>),
}

/// Where a frame is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// First pass: instructions are executed and appended to the body.
    Recording,
    /// The loop was entered on a zero cell, or sits inside such a loop.
    /// Instructions are appended to the body but not executed.
    Skipping,
    /// The body is complete and the cell was non-zero at its close. The loop
    /// is resolved by replay before the next instruction is dispatched.
    Replaying,
}

impl FrameState {
    /// Whether new instructions still belong to this frame's body.
    pub fn is_recording(self) -> bool {
        matches!(self, FrameState::Recording | FrameState::Skipping)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub state: FrameState,
    pub body: Vec<Step>,
}

impl Frame {
    fn new(state: FrameState) -> Self {
        Self {
            state,
            body: Vec::new(),
        }
    }

    /// Number of recorded steps at this nesting level.
    pub fn step_count(&self) -> usize {
        self.body.len()
    }
}

/// Stack of open loop frames, innermost last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopStack {
    frames: Vec<Frame>,
}

impl LoopStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open loops; 0 means top level.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn state(&self) -> Option<FrameState> {
        self.frames.last().map(|frame| frame.state)
    }

    pub fn innermost(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn is_skipping(&self) -> bool {
        self.state() == Some(FrameState::Skipping)
    }

    pub fn open(&mut self, state: FrameState) {
        self.frames.push(Frame::new(state));
    }

    /// Append `step` to the innermost body if that frame is still recording.
    pub fn record(&mut self, step: Step) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.state.is_recording() {
                frame.body.push(step);
            }
        }
    }

    /// Mark the innermost frame's body as complete and due for replay.
    pub fn begin_replay(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.state = FrameState::Replaying;
        }
    }

    /// Pop the innermost frame if it is waiting to be replayed.
    pub fn take_pending(&mut self) -> Option<Frame> {
        match self.state() {
            Some(FrameState::Replaying) => self.frames.pop(),
            _ => None,
        }
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Fold a finished loop into the enclosing body, if there is one still
    /// being recorded. At top level the body is simply dropped.
    pub fn nest(&mut self, body: Vec<Step>) {
        self.record(Step::Loop(body));
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Category;

    fn op(byte: u8) -> Step {
        Step::Op(Instruction {
            category: Category::Operator,
            byte,
        })
    }

    #[test]
    fn records_only_into_the_innermost_frame() {
        let mut stack = LoopStack::new();
        stack.open(FrameState::Recording);
        stack.record(op(b'+'));
        stack.open(FrameState::Recording);
        stack.record(op(b'-'));

        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.innermost().unwrap().body, vec![op(b'-')]);
    }

    #[test]
    fn closing_inner_loop_restores_outer_state_and_nests_body() {
        let mut stack = LoopStack::new();
        stack.open(FrameState::Recording);
        stack.record(op(b'+'));
        stack.open(FrameState::Skipping);
        stack.record(op(b'-'));

        let inner = stack.pop().unwrap();
        stack.nest(inner.body);

        assert_eq!(stack.state(), Some(FrameState::Recording));
        let outer = stack.innermost().unwrap();
        assert_eq!(outer.body, vec![op(b'+'), Step::Loop(vec![op(b'-')])]);
        assert_eq!(outer.step_count(), 2);
    }

    #[test]
    fn replaying_frames_do_not_record() {
        let mut stack = LoopStack::new();
        stack.open(FrameState::Recording);
        stack.record(op(b'+'));
        stack.begin_replay();
        stack.record(op(b'-'));
        assert_eq!(stack.innermost().unwrap().step_count(), 1);
    }

    #[test]
    fn take_pending_only_pops_replaying_frames() {
        let mut stack = LoopStack::new();
        stack.open(FrameState::Recording);
        assert!(stack.take_pending().is_none());

        stack.begin_replay();
        let frame = stack.take_pending().unwrap();
        assert_eq!(frame.state, FrameState::Replaying);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn nesting_at_top_level_drops_the_body() {
        let mut stack = LoopStack::new();
        stack.nest(vec![op(b'+')]);
        assert_eq!(stack.depth(), 0);
        assert!(stack.innermost().is_none());
    }
}
