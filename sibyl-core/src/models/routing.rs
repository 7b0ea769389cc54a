//! Router output: which retrieval granularity a query should take.

use serde::{Deserialize, Serialize};

/// Retrieval granularity chosen for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    /// Chunk-level multi-strategy fan-out + fusion.
    Chunk,
    /// File-level retrieval scored from chunk content.
    FilesViaContent,
    /// File-level retrieval matched through file metadata.
    FilesViaMetadata,
}

/// Produced once per query by the router, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub mode: RoutingMode,
    pub rationale: String,
}

impl RoutingDecision {
    pub fn new(mode: RoutingMode, rationale: impl Into<String>) -> Self {
        Self {
            mode,
            rationale: rationale.into(),
        }
    }
}
