//! Property tests for the fusion engine: determinism and dedup.

use proptest::prelude::*;

use sibyl_core::config::{FusionAlgorithm, FusionConfig};
use sibyl_core::models::{RetrievalCandidate, StrategyResult};
use sibyl_retrieval::FusionEngine;

/// Candidate texts drawn from a small pool so lists overlap.
fn arb_strategy_result(name: &'static str) -> impl Strategy<Value = StrategyResult> {
    prop::collection::vec((0usize..12, 0.0f32..1.0), 0..10).prop_map(move |items| {
        StrategyResult::new(
            name,
            items
                .into_iter()
                .enumerate()
                .map(|(i, (text_idx, score))| {
                    RetrievalCandidate::new(format!("chunk-{text_idx}"), Some(score), i + 1)
                })
                .collect(),
        )
    })
}

fn arb_results() -> impl Strategy<Value = Vec<StrategyResult>> {
    (
        arb_strategy_result("vector"),
        arb_strategy_result("lexical"),
        arb_strategy_result("pattern"),
    )
        .prop_map(|(a, b, c)| vec![a, b, c])
}

fn arb_algorithm() -> impl Strategy<Value = FusionAlgorithm> {
    prop_oneof![
        Just(FusionAlgorithm::Rrf),
        Just(FusionAlgorithm::WeightedScore),
        Just(FusionAlgorithm::Concat),
    ]
}

proptest! {
    /// For fixed config and fixed strategy outputs, fusion is a pure
    /// function: repeated calls agree exactly.
    #[test]
    fn fusion_is_deterministic(results in arb_results(), algorithm in arb_algorithm(), rrf_k in 1u32..200) {
        let engine = FusionEngine::new(FusionConfig {
            algorithm,
            rrf_k,
            ..FusionConfig::default()
        });
        let first = engine.fuse(&results, 20);
        let second = engine.fuse(&results, 20);
        prop_assert_eq!(first, second);
    }

    /// With dedup enabled, no candidate id appears twice, under any
    /// algorithm.
    #[test]
    fn dedup_removes_duplicate_ids(results in arb_results(), algorithm in arb_algorithm()) {
        let engine = FusionEngine::new(FusionConfig {
            algorithm,
            dedup: true,
            ..FusionConfig::default()
        });
        let fused = engine.fuse(&results, 50);
        let mut ids: Vec<&str> = fused.iter().map(|c| c.id.as_str()).collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(before, ids.len());
    }

    /// Fused output never exceeds the requested cap.
    #[test]
    fn fusion_respects_top_k(results in arb_results(), top_k in 0usize..15) {
        let engine = FusionEngine::new(FusionConfig::default());
        prop_assert!(engine.fuse(&results, top_k).len() <= top_k);
    }
}
