//! Cascade behavior over the mock collaborators: every level of the
//! fallback walk, the result-shape guarantee, and session persistence.

use std::sync::Arc;
use std::time::Duration;

use sibyl_agent::{CascadeController, STATIC_APOLOGY};
use sibyl_core::config::SibylConfig;
use sibyl_core::errors::SibylError;
use sibyl_core::models::FallbackReason;
use sibyl_engine::EngineClients;
use test_fixtures::{
    MemorySessionStore, MockCompletion, MockEmbedder, MockIndex, Reply, SeededChunk,
};

const TOOL_DIRECTIVE: &str =
    r#"{"action": "tool", "tool": "vector-search", "query": "fusion ranking"}"#;
const FINAL_DIRECTIVE: &str = r#"{"action": "final", "answer": "Fusion merges ranked lists."}"#;

fn corpus() -> Vec<SeededChunk> {
    vec![
        SeededChunk::new("fusion merges ranked lists from strategies", 0.90, "sys.md", "v1"),
        SeededChunk::new("reciprocal rank fusion discounts deep ranks", 0.80, "sys.md", "v2"),
    ]
}

fn build(
    chunks: Vec<SeededChunk>,
    replies: Vec<Reply>,
    config: SibylConfig,
) -> (CascadeController, Arc<MockCompletion>, Arc<MockIndex>) {
    let completion = Arc::new(MockCompletion::scripted(replies));
    let index = Arc::new(MockIndex::new(chunks));
    let clients = EngineClients {
        index: index.clone(),
        embedder: Arc::new(MockEmbedder),
        completion: completion.clone(),
        rerank: None,
    };
    let cascade = CascadeController::new(clients, config).expect("config is valid");
    (cascade, completion, index)
}

#[tokio::test]
async fn agent_answers_at_level_zero_with_a_trace() {
    // Planning reply, the tool's own answer generation, then the final
    // directive.
    let (cascade, _, _) = build(
        corpus(),
        vec![
            Reply::text(TOOL_DIRECTIVE),
            Reply::text("tool found fusion passages"),
            Reply::text(FINAL_DIRECTIVE),
        ],
        SibylConfig::default(),
    );

    let result = cascade.answer(None, "fusion ranking", &[]).await.unwrap();

    assert_eq!(result.answer, "Fusion merges ranked lists.");
    assert_eq!(result.fallback.level, 0);
    assert_eq!(result.fallback.reason, None);
    assert!(!result.sources.is_empty());
    let trace = result.trace.expect("level-0 answers carry a trace");
    assert_eq!(trace.iterations, 2);
    assert_eq!(trace.tool_calls.len(), 1);
    assert_eq!(trace.tool_calls[0].tool, "vector-search");
}

#[tokio::test]
async fn off_protocol_reply_becomes_the_final_answer() {
    let (cascade, _, _) = build(
        corpus(),
        vec![
            Reply::text(TOOL_DIRECTIVE),
            Reply::text("tool found fusion passages"),
            Reply::text("The answer is reciprocal rank fusion."),
        ],
        SibylConfig::default(),
    );

    let result = cascade.answer(None, "fusion ranking", &[]).await.unwrap();

    assert_eq!(result.answer, "The answer is reciprocal rank fusion.");
    assert_eq!(result.fallback.level, 0);
    assert_eq!(result.fallback.reason, None);
    let trace = result.trace.unwrap();
    assert_eq!(trace.iterations, 2);
    assert_eq!(trace.tool_calls.len(), 1);
}

#[tokio::test]
async fn agent_answer_without_sources_triggers_the_policy() {
    // The agent answers directly without calling any tool, so the result
    // has no evidence behind it; the low-confidence policy regenerates
    // with a provenance disclaimer before the answer leaves the cascade.
    let (cascade, _, _) = build(
        corpus(),
        vec![
            Reply::text("Direct answer without searching."),
            Reply::text("a careful general reply"),
        ],
        SibylConfig::default(),
    );

    let result = cascade.answer(None, "fusion ranking", &[]).await.unwrap();

    assert_eq!(result.fallback.level, 0);
    assert_eq!(result.fallback.reason, Some(FallbackReason::NoSources));
    assert!(result.answer.contains("not grounded"));
    assert!(result.answer.ends_with("a careful general reply"));
    assert!(result.sources.is_empty());
    let trace = result.trace.unwrap();
    assert!(trace.tool_calls.is_empty());
}

#[tokio::test]
async fn blank_final_directive_counts_as_agent_failure() {
    // A well-formed final directive with an empty answer must not leak
    // the raw directive text; it fails the loop and level 1 answers.
    let (cascade, _, _) = build(
        corpus(),
        vec![
            Reply::text(r#"{"action": "final", "answer": "  "}"#),
            Reply::text("recovered answer"),
        ],
        SibylConfig::default(),
    );

    let result = cascade.answer(None, "fusion ranking", &[]).await.unwrap();

    assert_eq!(result.answer, "recovered answer");
    assert_eq!(result.fallback.level, 1);
    assert_eq!(result.fallback.reason, Some(FallbackReason::AgentError));
}

#[tokio::test]
async fn level_one_policy_rewrite_keeps_the_cascade_reason() {
    // With an empty corpus the level-1 engine's own policy rewrites the
    // answer (disclaimer included), but the recorded reason stays the
    // cascade's: the level field already marks the degraded path.
    let (cascade, _, _) = build(
        Vec::new(),
        vec![
            Reply::Fail,
            Reply::text("draft"),
            Reply::text("ungrounded reply"),
        ],
        SibylConfig::default(),
    );

    let result = cascade.answer(None, "fusion ranking", &[]).await.unwrap();

    assert_eq!(result.fallback.level, 1);
    assert_eq!(result.fallback.reason, Some(FallbackReason::AgentError));
    assert!(result.answer.contains("not grounded"));
    assert!(result.answer.ends_with("ungrounded reply"));
}

#[tokio::test]
async fn agent_failure_falls_back_to_the_deterministic_engine() {
    // First call (the planning prompt) fails; the deterministic engine
    // then answers with the second reply.
    let (cascade, _, _) = build(
        corpus(),
        vec![Reply::Fail, Reply::text("deterministic answer")],
        SibylConfig::default(),
    );

    let result = cascade.answer(None, "fusion ranking", &[]).await.unwrap();

    assert_eq!(result.answer, "deterministic answer");
    assert_eq!(result.fallback.level, 1);
    assert_eq!(result.fallback.reason, Some(FallbackReason::AgentError));
    assert!(!result.sources.is_empty());
    assert!(result.trace.is_none());
}

#[tokio::test(start_paused = true)]
async fn agent_timeout_falls_back_to_the_deterministic_engine() {
    let mut config = SibylConfig::default();
    config.agent.timeout_secs = 1;
    let (cascade, _, index) = build(
        corpus(),
        vec![Reply::text(TOOL_DIRECTIVE), Reply::text("late answer")],
        config,
    );
    // The tool call stalls past the agent timeout but inside the
    // per-strategy deadline, so level 1 still succeeds.
    index.set_delay(Some(Duration::from_secs(2)));

    let result = cascade.answer(None, "fusion ranking", &[]).await.unwrap();

    assert_eq!(result.answer, "late answer");
    assert_eq!(result.fallback.level, 1);
    assert_eq!(result.fallback.reason, Some(FallbackReason::AgentTimeout));
}

#[tokio::test]
async fn retrieval_failure_falls_through_to_a_pure_completion() {
    let (cascade, _, index) = build(
        corpus(),
        vec![Reply::Fail, Reply::text("general knowledge answer")],
        SibylConfig::default(),
    );
    index.fail_vector(true);
    index.fail_terms(true);
    index.fail_pattern(true);

    let result = cascade.answer(None, "fusion ranking", &[]).await.unwrap();

    assert_eq!(result.answer, "general knowledge answer");
    assert_eq!(result.fallback.level, 2);
    assert_eq!(
        result.fallback.reason,
        Some(FallbackReason::DeterministicError)
    );
    assert!(result.sources.is_empty());
}

#[tokio::test]
async fn every_level_failing_yields_the_static_answer() {
    let (cascade, _, index) = build(
        Vec::new(),
        vec![Reply::Fail; 8],
        SibylConfig::default(),
    );
    index.fail_vector(true);
    index.fail_terms(true);
    index.fail_pattern(true);

    let result = cascade.answer(None, "fusion ranking", &[]).await.unwrap();

    assert_eq!(result.answer, STATIC_APOLOGY);
    assert_eq!(result.fallback.level, 3);
    assert_eq!(
        result.fallback.reason,
        Some(FallbackReason::DeterministicError)
    );
}

#[tokio::test]
async fn iteration_budget_exhaustion_counts_as_agent_failure() {
    // The model keeps calling tools and never finishes; the loop gives
    // up after max_iterations and level 1 answers.
    let mut config = SibylConfig::default();
    config.agent.max_iterations = 2;
    let (cascade, _, _) = build(
        corpus(),
        vec![
            Reply::text(TOOL_DIRECTIVE),
            Reply::text("tool answer one"),
            Reply::text(TOOL_DIRECTIVE),
            Reply::text("tool answer two"),
            Reply::text("budget answer"),
        ],
        config,
    );

    let result = cascade.answer(None, "fusion ranking", &[]).await.unwrap();

    assert_eq!(result.answer, "budget answer");
    assert_eq!(result.fallback.level, 1);
    assert_eq!(result.fallback.reason, Some(FallbackReason::AgentError));
}

#[tokio::test]
async fn validation_is_the_only_raised_error() {
    let (cascade, completion, _) = build(corpus(), Vec::new(), SibylConfig::default());

    let err = cascade.answer(None, "  ", &[]).await.unwrap_err();

    assert!(matches!(err, SibylError::Validation(_)));
    assert_eq!(completion.calls(), 0);
}

#[tokio::test]
async fn answers_are_persisted_to_the_session_store() {
    let store = Arc::new(MemorySessionStore::new());
    let (cascade, _, _) = build(
        corpus(),
        vec![
            Reply::text(TOOL_DIRECTIVE),
            Reply::text("tool found fusion passages"),
            Reply::text(FINAL_DIRECTIVE),
        ],
        SibylConfig::default(),
    );
    let cascade = cascade.with_session_store(store.clone());

    cascade
        .answer(Some("s1"), "fusion ranking", &[])
        .await
        .unwrap();

    let turns = store.turns("s1");
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].question, "fusion ranking");
    assert_eq!(turns[0].answer, "Fusion merges ranked lists.");
    assert!(!turns[0].source_ids.is_empty());
}

#[tokio::test]
async fn no_session_id_skips_persistence() {
    let store = Arc::new(MemorySessionStore::new());
    let (cascade, _, _) = build(
        corpus(),
        vec![Reply::text(FINAL_DIRECTIVE)],
        SibylConfig::default(),
    );
    let cascade = cascade.with_session_store(store.clone());

    cascade.answer(None, "fusion ranking", &[]).await.unwrap();

    assert!(store.turns("s1").is_empty());
}
