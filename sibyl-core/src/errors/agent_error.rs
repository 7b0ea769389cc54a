/// Planning-agent errors. Both variants are recovered by cascade level 1
/// (the deterministic engine pinned to vector search).
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent loop exceeded its wall-clock timeout of {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("agent loop failed: {reason}")]
    Failed { reason: String },
}
