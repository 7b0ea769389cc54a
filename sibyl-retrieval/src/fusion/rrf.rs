//! Reciprocal Rank Fusion: score = Σ weight_s / (rrf_k + rank)
//!
//! Combines multiple ranked lists into a single fused ranking without
//! requiring score normalization across different retrieval methods.

use std::collections::HashMap;

use sibyl_core::config::FusionConfig;
use sibyl_core::models::{RetrievalCandidate, StrategyResult};

struct Accumulated {
    candidate: RetrievalCandidate,
    score: f64,
    /// Insertion sequence: ties are broken by first-seen strategy order,
    /// which is deterministic because strategies arrive in configured order.
    first_seen: usize,
}

/// Fuse the per-strategy ranked lists with weighted RRF.
///
/// Ranks are 1-based; a candidate absent from a strategy contributes 0
/// from it. Output is ordered by descending fused score, ties by
/// first-seen order, and carries the fused score in `score`.
pub fn fuse(results: &[StrategyResult], config: &FusionConfig) -> Vec<RetrievalCandidate> {
    let k = f64::from(config.rrf_k);
    let mut by_id: HashMap<String, Accumulated> = HashMap::new();
    let mut sequence = 0usize;

    for result in results {
        let weight = f64::from(config.weight_for(&result.strategy_name));
        for (i, candidate) in result.candidates.iter().enumerate() {
            let rank = (i + 1) as f64;
            let contribution = weight / (k + rank);
            by_id
                .entry(candidate.id.clone())
                .and_modify(|acc| acc.score += contribution)
                .or_insert_with(|| {
                    let acc = Accumulated {
                        candidate: candidate.clone(),
                        score: contribution,
                        first_seen: sequence,
                    };
                    sequence += 1;
                    acc
                });
        }
    }

    let mut fused: Vec<Accumulated> = by_id.into_values().collect();
    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.first_seen.cmp(&b.first_seen))
    });

    fused
        .into_iter()
        .map(|acc| {
            let mut c = acc.candidate;
            // The fused score is rank-scale; keep the native similarity
            // around for threshold checks downstream.
            if let Some(native) = c.score {
                c.source_metadata
                    .insert(sibyl_core::models::META_NATIVE_SCORE.to_string(), native.to_string());
            }
            c.score = Some(acc.score as f32);
            c
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(strategy: &str, texts: &[&str]) -> StrategyResult {
        StrategyResult::new(
            strategy,
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| RetrievalCandidate::new(*t, None, i + 1))
                .collect(),
        )
    }

    #[test]
    fn rrf_arithmetic_matches_hand_computation() {
        // Rank 1 in A (weight 1.0) and rank 2 in B (weight 1.0), k=60.
        let results = vec![list("a", &["x", "y"]), list("b", &["y", "x"])];
        let config = FusionConfig::default();
        let fused = fuse(&results, &config);

        let expected = 1.0 / 61.0 + 1.0 / 62.0;
        for c in &fused {
            assert!((c.score.unwrap() as f64 - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn ties_break_by_first_seen_strategy_order() {
        // Symmetric contributions: x and y tie exactly; x is seen first.
        let results = vec![list("a", &["x", "y"]), list("b", &["y", "x"])];
        let fused = fuse(&results, &FusionConfig::default());
        assert_eq!(fused[0].text, "x");
        assert_eq!(fused[1].text, "y");
    }

    #[test]
    fn weights_scale_contributions() {
        let mut config = FusionConfig::default();
        config.weights.insert("b".to_string(), 3.0);
        let results = vec![list("a", &["x"]), list("b", &["y"])];
        let fused = fuse(&results, &config);
        // y: 3/61 beats x: 1/61.
        assert_eq!(fused[0].text, "y");
    }
}
