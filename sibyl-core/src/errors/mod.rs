//! Error taxonomy for the Sibyl workspace.
//!
//! Every internal error is either recovered locally (fan-out, rerank,
//! low-confidence policy) or converted into a cascade-level transition.
//! The only error a caller ever sees raised is `Validation` on malformed
//! input; everything else becomes a degraded `EngineResult`.

mod agent_error;
mod llm_error;
mod retrieval_error;

pub use agent_error::AgentError;
pub use llm_error::LlmError;
pub use retrieval_error::{FusionError, RetrievalError};

/// Umbrella error for the whole workspace.
#[derive(Debug, thiserror::Error)]
pub enum SibylError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Fusion(#[from] FusionError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("invalid query: {0}")]
    Validation(String),

    #[error("session store failed: {0}")]
    SessionStore(String),
}

impl SibylError {
    /// True when this error may legally reach the caller as a raised error.
    /// Everything else must be absorbed into a degraded `EngineResult`.
    pub fn is_caller_visible(&self) -> bool {
        matches!(self, SibylError::Validation(_))
    }
}

pub type SibylResult<T> = Result<T, SibylError>;
