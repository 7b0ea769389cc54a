use serde::{Deserialize, Serialize};

use super::defaults;

/// Planning-agent configuration.
/// Invariant: `max_iterations > 0` (checked by `SibylConfig::validate`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Upper bound on planning-loop iterations.
    pub max_iterations: usize,
    /// Hard wall-clock timeout for the whole loop (seconds).
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: defaults::DEFAULT_MAX_ITERATIONS,
            timeout_secs: defaults::DEFAULT_AGENT_TIMEOUT_SECS,
        }
    }
}
