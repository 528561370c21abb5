//! Error types for hook dispatch. Handler failures are values, not control
//! flow: `trigger` records them per handler and `chain` skips past them.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// The handler reported a failure
    #[error("Hook handler failed: {0}")]
    HandlerFailed(String),

    /// The handler exceeded the dispatcher's per-handler timeout
    #[error("Hook handler timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },
}

impl HookError {
    pub fn failed(message: impl Into<String>) -> Self {
        HookError::HandlerFailed(message.into())
    }
}
