//! Planning-agent execution trace.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One tool invocation made by the planning loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool: String,
    pub query: String,
    pub duration: Duration,
}

/// What the planning loop did for one query. A timed-out loop is
/// cancelled wholesale and surfaces no trace; traces only describe
/// completed runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentTrace {
    pub iterations: usize,
    pub tool_calls: Vec<ToolCallRecord>,
    pub elapsed: Duration,
}
