/// Retrieval subsystem errors.
///
/// A single failing strategy is recovered locally by the fan-out layer;
/// only `AllStrategiesFailed` is fatal to a retrieval call.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("strategy '{strategy}' failed: {reason}")]
    StrategyFailed { strategy: String, reason: String },

    #[error("strategy '{strategy}' exceeded its deadline of {deadline_ms}ms")]
    StrategyTimeout { strategy: String, deadline_ms: u64 },

    #[error("all {attempted} strategies failed for query")]
    AllStrategiesFailed { attempted: usize },

    #[error("index search failed: {reason}")]
    IndexFailed { reason: String },

    #[error("embedding generation failed: {reason}")]
    EmbeddingFailed { reason: String },
}

/// Fusion-stage errors: malformed strategy output is logged and that
/// strategy's results are dropped, never fatal to the query.
#[derive(Debug, thiserror::Error)]
pub enum FusionError {
    #[error("strategy '{strategy}' produced malformed output: {reason}")]
    MalformedStrategyOutput { strategy: String, reason: String },

    #[error("invalid fusion config: {reason}")]
    InvalidConfig { reason: String },
}
