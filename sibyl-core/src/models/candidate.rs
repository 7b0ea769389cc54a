//! Retrieval candidates and per-strategy result lists.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata key under which strategies record the originating file.
pub const META_SOURCE_FILE: &str = "source_file";

/// Metadata key under which strategies record the index-side vector id.
pub const META_VECTOR_ID: &str = "vector_id";

/// Metadata key preserving the native similarity score after RRF fusion
/// overwrites `score` with the rank-scale fused score.
pub const META_NATIVE_SCORE: &str = "native_score";

/// One retrieved span of text. Immutable once produced; the `id` is a
/// content fingerprint, so the same span surfaced by two different
/// strategies carries the same id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalCandidate {
    /// Content fingerprint (blake3 of the text), stable across strategies.
    pub id: String,
    pub text: String,
    /// Native score assigned by the producing strategy, if it has one.
    pub score: Option<f32>,
    pub source_metadata: HashMap<String, String>,
    /// 1-based rank within the producing strategy's result list.
    pub strategy_rank: usize,
}

impl RetrievalCandidate {
    pub fn new(text: impl Into<String>, score: Option<f32>, strategy_rank: usize) -> Self {
        let text = text.into();
        Self {
            id: fingerprint(&text),
            text,
            score,
            source_metadata: HashMap::new(),
            strategy_rank,
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.source_metadata.insert(key.to_string(), value.into());
        self
    }

    /// The originating file, when the producing strategy recorded one.
    pub fn source_file(&self) -> Option<&str> {
        self.source_metadata.get(META_SOURCE_FILE).map(|s| s.as_str())
    }

    /// The similarity-scale score: the preserved native score when RRF
    /// fusion replaced `score` with a rank-scale value, else `score`.
    pub fn similarity_score(&self) -> Option<f32> {
        self.source_metadata
            .get(META_NATIVE_SCORE)
            .and_then(|s| s.parse().ok())
            .or(self.score)
    }
}

/// Content fingerprint used as the candidate id.
pub fn fingerprint(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

/// The ordered output of one strategy for one retrieval call.
/// Produced once per call, consumed by fusion, then discarded.
#[derive(Debug, Clone)]
pub struct StrategyResult {
    pub strategy_name: String,
    pub candidates: Vec<RetrievalCandidate>,
}

impl StrategyResult {
    pub fn new(strategy_name: impl Into<String>, candidates: Vec<RetrievalCandidate>) -> Self {
        Self {
            strategy_name: strategy_name.into(),
            candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_across_strategies() {
        let a = RetrievalCandidate::new("the same span", Some(0.9), 1);
        let b = RetrievalCandidate::new("the same span", Some(0.2), 7);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn fingerprint_differs_for_different_text() {
        assert_ne!(fingerprint("alpha"), fingerprint("beta"));
    }
}
