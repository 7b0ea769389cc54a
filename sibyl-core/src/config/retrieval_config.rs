use serde::{Deserialize, Serialize};

use super::defaults;

/// Retrieval subsystem configuration: fan-out, file-scope aggregation,
/// and the optional rerank stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Result cap after fusion.
    pub top_k: usize,
    /// Per-strategy deadline within one fan-out batch (milliseconds).
    pub strategy_deadline_ms: u64,
    /// Wide chunk-set size pulled by the content file aggregator.
    pub similarity_top_k: usize,
    /// Maximum distinct files returned by file-scope aggregation.
    pub top_k_files: usize,
    /// Maximum chunks kept per file.
    pub top_k_per_file: usize,
    /// Run the rerank oracle on the fused top-N.
    pub rerank_enabled: bool,
    /// Truncation point after reranking.
    pub rerank_top_n: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::DEFAULT_TOP_K,
            strategy_deadline_ms: defaults::DEFAULT_STRATEGY_DEADLINE_MS,
            similarity_top_k: defaults::DEFAULT_SIMILARITY_TOP_K,
            top_k_files: defaults::DEFAULT_TOP_K_FILES,
            top_k_per_file: defaults::DEFAULT_TOP_K_PER_FILE,
            rerank_enabled: defaults::DEFAULT_RERANK_ENABLED,
            rerank_top_n: defaults::DEFAULT_RERANK_TOP_N,
        }
    }
}
