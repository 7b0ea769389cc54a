//! Integration tests for fan-out resilience, file-scope aggregation,
//! and the rerank stage, driven by the in-memory mock collaborators.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sibyl_core::config::{RetrievalConfig, RouterConfig};
use sibyl_core::models::META_SOURCE_FILE;
use sibyl_retrieval::file_scope::{ContentFileAggregator, MetadataFileAggregator};
use sibyl_retrieval::strategy::{
    HybridStrategy, LexicalStrategy, PatternStrategy, RetrievalStrategy, StrategyClients,
    VectorStrategy,
};
use sibyl_retrieval::{MultiStrategyRetriever, RerankStage};

use test_fixtures::{MockEmbedder, MockIndex, MockRerank, SeededChunk};

const DEADLINE: Duration = Duration::from_millis(500);

fn clients(index: Arc<MockIndex>) -> StrategyClients {
    StrategyClients {
        index,
        embedder: Arc::new(MockEmbedder),
    }
}

fn corpus() -> Vec<SeededChunk> {
    vec![
        SeededChunk::new("systems science studies complex wholes", 0.90, "sys.md", "v1"),
        SeededChunk::new("feedback loops are a systems concept", 0.80, "sys.md", "v2"),
        SeededChunk::new("emergence arises from interactions", 0.73, "sys.md", "v3"),
        SeededChunk::new("applications include urban planning", 0.70, "app.md", "v4"),
        SeededChunk::new("ecology applies systems thinking", 0.60, "app.md", "v5"),
        SeededChunk::new("supply chains as dynamic systems", 0.56, "app.md", "v6"),
    ]
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fanout_survives_one_failing_strategy() {
    let index = Arc::new(MockIndex::new(corpus()));
    index.fail_terms(true);

    let strategies = vec![
        Arc::new(RetrievalStrategy::Vector(VectorStrategy::new(
            clients(index.clone()),
            DEADLINE,
        ))),
        Arc::new(RetrievalStrategy::Lexical(LexicalStrategy::new(
            clients(index.clone()),
            DEADLINE,
        ))),
    ];
    let retriever = MultiStrategyRetriever::new(strategies, DEADLINE);

    let results = retriever.fan_out("systems", 5).await.expect("vector leg survives");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].strategy_name, "vector");
    assert!(!results[0].candidates.is_empty());
}

#[tokio::test]
async fn fanout_errors_only_when_all_strategies_fail() {
    let index = Arc::new(MockIndex::new(corpus()));
    index.fail_vector(true);
    index.fail_terms(true);

    let strategies = vec![
        Arc::new(RetrievalStrategy::Vector(VectorStrategy::new(
            clients(index.clone()),
            DEADLINE,
        ))),
        Arc::new(RetrievalStrategy::Lexical(LexicalStrategy::new(
            clients(index.clone()),
            DEADLINE,
        ))),
    ];
    let retriever = MultiStrategyRetriever::new(strategies, DEADLINE);

    let err = retriever.fan_out("systems", 5).await.unwrap_err();
    assert!(err.to_string().contains("all 2 strategies failed"));
}

#[tokio::test]
async fn slow_strategy_times_out_without_blocking_others() {
    let slow_index = Arc::new(MockIndex::new(corpus()));
    slow_index.set_delay(Some(Duration::from_millis(200)));
    let fast_index = Arc::new(MockIndex::new(corpus()));

    let strategies = vec![
        Arc::new(RetrievalStrategy::Pattern(PatternStrategy::new(
            clients(slow_index),
            Duration::from_millis(50),
        ))),
        Arc::new(RetrievalStrategy::Vector(VectorStrategy::new(
            clients(fast_index),
            DEADLINE,
        ))),
    ];
    let retriever = MultiStrategyRetriever::new(strategies, Duration::from_millis(50));

    let results = retriever.fan_out("systems", 5).await.expect("fast leg survives");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].strategy_name, "vector");
}

#[tokio::test]
async fn results_arrive_in_configured_strategy_order() {
    let index = Arc::new(MockIndex::new(corpus()));
    let strategies = vec![
        Arc::new(RetrievalStrategy::Lexical(LexicalStrategy::new(
            clients(index.clone()),
            DEADLINE,
        ))),
        Arc::new(RetrievalStrategy::Vector(VectorStrategy::new(
            clients(index.clone()),
            DEADLINE,
        ))),
    ];
    let retriever = MultiStrategyRetriever::new(strategies, DEADLINE);

    let results = retriever.fan_out("systems", 5).await.unwrap();
    let names: Vec<_> = results.iter().map(|r| r.strategy_name.as_str()).collect();
    assert_eq!(names, vec!["lexical", "vector"]);
}

#[tokio::test]
async fn blank_query_skips_the_index() {
    let index = Arc::new(MockIndex::new(corpus()));
    let strategy = RetrievalStrategy::Vector(VectorStrategy::new(clients(index.clone()), DEADLINE));
    let result = strategy.retrieve("   ", 5).await.unwrap();
    assert!(result.candidates.is_empty());
    assert_eq!(index.search_calls(), 0);
}

// ---------------------------------------------------------------------------
// Hybrid strategy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hybrid_fuses_both_legs_and_tolerates_one_failure() {
    let index = Arc::new(MockIndex::new(corpus()));
    let hybrid = HybridStrategy::new(clients(index.clone()), DEADLINE, 60);

    let full = hybrid.retrieve("systems", 5).await.unwrap();
    assert!(!full.candidates.is_empty());

    index.fail_terms(true);
    let degraded = hybrid.retrieve("systems", 5).await.unwrap();
    assert!(!degraded.candidates.is_empty());
}

// ---------------------------------------------------------------------------
// File-scope aggregation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn content_aggregation_orders_files_by_mean_top_chunk_score() {
    // sys.md top-3 mean = (0.90+0.80+0.73)/3 = 0.81,
    // app.md top-3 mean = (0.70+0.60+0.56)/3 = 0.62.
    let index = Arc::new(MockIndex::new(corpus()));
    let aggregator = ContentFileAggregator::new(
        VectorStrategy::new(clients(index), DEADLINE),
        RetrievalConfig::default(),
    );

    let chunks = aggregator.retrieve("什么是系统科学？").await.unwrap();
    assert!(!chunks.is_empty());

    let files: Vec<&str> = chunks.iter().filter_map(|c| c.source_file()).collect();
    let first_app = files.iter().position(|f| *f == "app.md");
    let last_sys = files.iter().rposition(|f| *f == "sys.md");
    assert!(last_sys.unwrap() < first_app.unwrap(), "sys.md chunks come first");
}

#[tokio::test]
async fn content_aggregation_respects_file_and_chunk_caps() {
    let mut chunks = corpus();
    for i in 0..8 {
        chunks.push(SeededChunk::new(
            &format!("extra passage number {i}"),
            0.5,
            "extra.md",
            &format!("x{i}"),
        ));
    }
    let index = Arc::new(MockIndex::new(chunks));
    let config = RetrievalConfig {
        top_k_files: 2,
        top_k_per_file: 2,
        ..RetrievalConfig::default()
    };
    let aggregator =
        ContentFileAggregator::new(VectorStrategy::new(clients(index), DEADLINE), config);

    let out = aggregator.retrieve("anything at all").await.unwrap();
    let mut per_file: HashMap<&str, usize> = HashMap::new();
    for c in &out {
        *per_file.entry(c.source_file().unwrap()).or_default() += 1;
    }
    assert!(per_file.len() <= 2, "at most top_k_files distinct files");
    assert!(per_file.values().all(|&n| n <= 2), "at most top_k_per_file chunks per file");
}

#[tokio::test]
async fn content_aggregation_empty_query_is_empty_without_index_calls() {
    let index = Arc::new(MockIndex::new(corpus()));
    let aggregator = ContentFileAggregator::new(
        VectorStrategy::new(clients(index.clone()), DEADLINE),
        RetrievalConfig::default(),
    );
    assert!(aggregator.retrieve("").await.unwrap().is_empty());
    assert_eq!(index.search_calls(), 0);
}

#[tokio::test]
async fn metadata_aggregation_matches_file_names() {
    let chunks = vec![
        SeededChunk::new("quarterly revenue table", 0.9, "report.pdf", "r1"),
        SeededChunk::new("executive summary", 0.8, "report.pdf", "r2"),
        SeededChunk::new("unrelated passage", 0.7, "notes.md", "n1"),
    ];
    let index = Arc::new(MockIndex::new(chunks));
    let aggregator = MetadataFileAggregator::new(
        VectorStrategy::new(clients(index.clone()), DEADLINE),
        index,
        RouterConfig::default(),
        RetrievalConfig::default(),
    );

    let out = aggregator.retrieve("summarize report.pdf").await.unwrap();
    assert!(!out.is_empty());
    assert!(out
        .iter()
        .all(|c| c.source_metadata[META_SOURCE_FILE] == "report.pdf"));
}

#[tokio::test]
async fn metadata_aggregation_no_match_is_empty_not_error() {
    let index = Arc::new(MockIndex::new(corpus()));
    let aggregator = MetadataFileAggregator::new(
        VectorStrategy::new(clients(index.clone()), DEADLINE),
        index,
        RouterConfig::default(),
        RetrievalConfig::default(),
    );
    let out = aggregator.retrieve("missing.pdf contents").await.unwrap();
    assert!(out.is_empty());
}

// ---------------------------------------------------------------------------
// Rerank stage
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rerank_reorders_by_oracle_scores() {
    let mut overrides = HashMap::new();
    overrides.insert("low native, high rerank".to_string(), 0.95);
    overrides.insert("high native, low rerank".to_string(), 0.10);
    let stage = RerankStage::new(Some(Arc::new(MockRerank::with_overrides(overrides))), 5);

    let fused = vec![
        test_fixtures::candidate("high native, low rerank", 0.9, "a.md"),
        test_fixtures::candidate("low native, high rerank", 0.2, "b.md"),
    ];
    let out = stage.apply("q", fused).await;
    assert_eq!(out[0].text, "low native, high rerank");
}

#[tokio::test]
async fn rerank_failure_degrades_to_passthrough() {
    let oracle = Arc::new(MockRerank::default());
    oracle.fail(true);
    let stage = RerankStage::new(Some(oracle), 1);

    let fused = vec![
        test_fixtures::candidate("first", 0.9, "a.md"),
        test_fixtures::candidate("second", 0.2, "b.md"),
    ];
    let out = stage.apply("q", fused.clone()).await;
    // Pass-through: same list, not truncated to top_n.
    assert_eq!(out, fused);
}
