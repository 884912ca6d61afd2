use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::EngineError;

/// Controls for cooperative cancellation and step limiting.
///
/// Nothing is limited unless a `StepControl` is installed on the engine.
#[derive(Clone, Debug, Default)]
pub struct StepControl {
    pub max_steps: Option<u64>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<u64>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self {
            max_steps,
            cancel_flag,
        }
    }

    /// Fail if cancellation was requested or `steps` has reached the limit.
    pub fn check(&self, steps: u64) -> Result<(), EngineError> {
        if self.cancel_flag.load(Ordering::Relaxed) {
            return Err(EngineError::Canceled);
        }
        if let Some(limit) = self.max_steps {
            if steps >= limit {
                return Err(EngineError::StepLimitExceeded { limit });
            }
        }
        Ok(())
    }
}
