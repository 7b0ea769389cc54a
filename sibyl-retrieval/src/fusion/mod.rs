//! Candidate fusion: merge N ranked lists into one.
//!
//! Pure stage, no I/O: identical inputs must always produce identical
//! output (a tested property). Malformed strategy output is logged and
//! that strategy's list dropped, never fatal.

pub mod rrf;

use std::collections::HashSet;

use tracing::{debug, warn};

use sibyl_core::config::{FusionAlgorithm, FusionConfig};
use sibyl_core::models::{RetrievalCandidate, StrategyResult};

pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    /// Merge the per-strategy lists into one ordered list capped at `top_k`.
    pub fn fuse(&self, results: &[StrategyResult], top_k: usize) -> Vec<RetrievalCandidate> {
        let well_formed: Vec<StrategyResult> = results
            .iter()
            .filter(|r| {
                if let Some(reason) = malformed_reason(r) {
                    warn!(strategy = %r.strategy_name, reason, "dropping malformed strategy output");
                    false
                } else {
                    true
                }
            })
            .cloned()
            .collect();

        let mut fused = match self.config.algorithm {
            FusionAlgorithm::Rrf => rrf::fuse(&well_formed, &self.config),
            FusionAlgorithm::WeightedScore => weighted_score(&well_formed, &self.config),
            FusionAlgorithm::Concat => concat(&well_formed),
        };

        // Dedup behaves identically regardless of the algorithm above.
        if self.config.dedup {
            dedup_by_id(&mut fused);
        }
        fused.truncate(top_k);

        debug!(
            strategies = well_formed.len(),
            fused = fused.len(),
            algorithm = ?self.config.algorithm,
            "fusion complete"
        );
        fused
    }
}

/// A strategy list is malformed when any candidate is missing its
/// content fingerprint or text.
fn malformed_reason(result: &StrategyResult) -> Option<&'static str> {
    for c in &result.candidates {
        if c.id.is_empty() {
            return Some("candidate with empty id");
        }
        if c.text.is_empty() {
            return Some("candidate with empty text");
        }
        if c.score.is_some_and(|s| s.is_nan()) {
            return Some("candidate with NaN score");
        }
    }
    None
}

/// Per-candidate max of weight * native score: a single strong hit
/// dominates, accumulation is deliberately not a sum.
fn weighted_score(results: &[StrategyResult], config: &FusionConfig) -> Vec<RetrievalCandidate> {
    use std::collections::HashMap;

    struct Best {
        candidate: RetrievalCandidate,
        score: f32,
        first_seen: usize,
    }

    let mut by_id: HashMap<String, Best> = HashMap::new();
    let mut sequence = 0usize;

    for result in results {
        let weight = config.weight_for(&result.strategy_name);
        for candidate in &result.candidates {
            let weighted = weight * candidate.score.unwrap_or(0.0);
            by_id
                .entry(candidate.id.clone())
                .and_modify(|best| best.score = best.score.max(weighted))
                .or_insert_with(|| {
                    let best = Best {
                        candidate: candidate.clone(),
                        score: weighted,
                        first_seen: sequence,
                    };
                    sequence += 1;
                    best
                });
        }
    }

    let mut fused: Vec<Best> = by_id.into_values().collect();
    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.first_seen.cmp(&b.first_seen))
    });
    fused
        .into_iter()
        .map(|best| {
            let mut c = best.candidate;
            c.score = Some(best.score);
            c
        })
        .collect()
}

/// Per-strategy order preserved; strategies processed in the fixed
/// configured order they arrive in.
fn concat(results: &[StrategyResult]) -> Vec<RetrievalCandidate> {
    results
        .iter()
        .flat_map(|r| r.candidates.iter().cloned())
        .collect()
}

/// Collapse equal content fingerprints to the first occurrence,
/// keeping its (fused) score.
fn dedup_by_id(candidates: &mut Vec<RetrievalCandidate>) {
    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(c.id.clone()));
}
