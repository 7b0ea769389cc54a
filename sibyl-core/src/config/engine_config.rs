use serde::{Deserialize, Serialize};

use super::defaults;

/// Query-understanding heuristics. Like the router lists, the markers are
/// corpus-language tuning and live in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnderstandingConfig {
    /// Queries at or under this many characters are heuristically simple.
    pub simple_max_chars: usize,
    /// Queries at or under this many whitespace words are heuristically simple.
    pub simple_max_words: usize,
    /// Markers whose presence disqualifies the simple shortcut.
    pub explanatory_markers: Vec<String>,
}

impl Default for UnderstandingConfig {
    fn default() -> Self {
        Self {
            simple_max_chars: defaults::DEFAULT_SIMPLE_MAX_CHARS,
            simple_max_words: defaults::DEFAULT_SIMPLE_MAX_WORDS,
            explanatory_markers: vec![
                "why".to_string(),
                "compare".to_string(),
                "difference".to_string(),
                "explain".to_string(),
                "为什么".to_string(),
                "区别".to_string(),
                "比较".to_string(),
            ],
        }
    }
}

/// Deterministic-engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sources scoring below this trigger the low-confidence policy.
    pub similarity_threshold: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: defaults::DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}
