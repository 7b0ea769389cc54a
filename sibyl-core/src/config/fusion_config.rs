use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Fusion algorithm applied to the per-strategy ranked lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionAlgorithm {
    /// Reciprocal Rank Fusion: score += weight / (rrf_k + rank).
    Rrf,
    /// Per-candidate max of weight * native score.
    WeightedScore,
    /// Per-strategy order preserved, strategies in configured order.
    Concat,
}

/// Fusion configuration, set once at engine construction.
/// Invariant: `rrf_k > 0` (checked by `SibylConfig::validate`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub algorithm: FusionAlgorithm,
    /// Per-strategy weight; strategies absent from the map weigh 1.0.
    pub weights: HashMap<String, f32>,
    /// Collapse candidates with equal content fingerprint.
    pub dedup: bool,
    /// RRF smoothing constant. Higher k reduces the influence of
    /// high-ranking items from any single list.
    pub rrf_k: u32,
}

impl FusionConfig {
    pub fn weight_for(&self, strategy: &str) -> f32 {
        self.weights.get(strategy).copied().unwrap_or(1.0)
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            algorithm: FusionAlgorithm::Rrf,
            weights: HashMap::new(),
            dedup: defaults::DEFAULT_DEDUP,
            rrf_k: defaults::DEFAULT_RRF_K,
        }
    }
}
