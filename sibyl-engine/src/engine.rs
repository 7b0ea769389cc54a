//! DeterministicEngine: the synchronous retrieval-augmented pipeline.
//!
//! Stage order: understanding → routing (or pinned strategy) →
//! retrieval/aggregation → fusion → rerank → one grounded completion →
//! low-confidence policy. This engine is also fallback level 1: it must
//! succeed or raise only retrieval/LLM errors (plus validation on bad
//! input), and is the safety net the planning agent falls back to.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use sibyl_core::config::SibylConfig;
use sibyl_core::constants::{MAX_QUERY_BYTES, STREAM_CHANNEL_CAPACITY};
use sibyl_core::errors::{SibylError, SibylResult};
use sibyl_core::models::{
    ChatMessage, CondensedQuery, EngineResult, FallbackRecord, RetrievalCandidate, RoutingMode,
    StreamEvent,
};
use sibyl_core::traits::{
    ICompletionService, IEmbeddingProvider, IIndexSearch, IRerankOracle,
};

use sibyl_retrieval::file_scope::{ContentFileAggregator, MetadataFileAggregator};
use sibyl_retrieval::strategy::{
    HybridStrategy, LexicalStrategy, PatternStrategy, RetrievalStrategy, StrategyClients,
    VectorStrategy,
};
use sibyl_retrieval::{FusionEngine, MultiStrategyRetriever, QueryRouter, RerankStage};

use crate::condense::HistoryCondenser;
use crate::confidence::LowConfidencePolicy;
use crate::prompts;
use crate::understanding::QueryUnderstander;

/// External collaborator handles, injected once at construction.
#[derive(Clone)]
pub struct EngineClients {
    pub index: Arc<dyn IIndexSearch>,
    pub embedder: Arc<dyn IEmbeddingProvider>,
    pub completion: Arc<dyn ICompletionService>,
    pub rerank: Option<Arc<dyn IRerankOracle>>,
}

/// Pinning disables the router: retrieval runs exactly one configured
/// path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyPin {
    Vector,
    Hybrid,
    MultiStrategy,
}

pub struct DeterministicEngine {
    clients: EngineClients,
    config: SibylConfig,
    retriever: MultiStrategyRetriever,
    pinned_vector: Arc<RetrievalStrategy>,
    pinned_hybrid: Arc<RetrievalStrategy>,
    fusion: FusionEngine,
    router: QueryRouter,
    rerank: RerankStage,
    content_files: ContentFileAggregator,
    metadata_files: MetadataFileAggregator,
    understander: QueryUnderstander,
    condenser: HistoryCondenser,
    policy: LowConfidencePolicy,
    pin: Option<StrategyPin>,
}

impl DeterministicEngine {
    pub fn new(clients: EngineClients, config: SibylConfig) -> SibylResult<Self> {
        config.validate()?;

        let strategy_clients = StrategyClients {
            index: Arc::clone(&clients.index),
            embedder: Arc::clone(&clients.embedder),
        };
        let deadline = Duration::from_millis(config.retrieval.strategy_deadline_ms);

        let fanout_strategies = vec![
            Arc::new(RetrievalStrategy::Vector(VectorStrategy::new(
                strategy_clients.clone(),
                deadline,
            ))),
            Arc::new(RetrievalStrategy::Lexical(LexicalStrategy::new(
                strategy_clients.clone(),
                deadline,
            ))),
            Arc::new(RetrievalStrategy::Pattern(PatternStrategy::new(
                strategy_clients.clone(),
                deadline,
            ))),
        ];

        let rerank = if config.retrieval.rerank_enabled {
            RerankStage::new(clients.rerank.clone(), config.retrieval.rerank_top_n)
        } else {
            RerankStage::disabled()
        };

        Ok(Self {
            retriever: MultiStrategyRetriever::new(fanout_strategies, deadline),
            pinned_vector: Arc::new(RetrievalStrategy::Vector(VectorStrategy::new(
                strategy_clients.clone(),
                deadline,
            ))),
            pinned_hybrid: Arc::new(RetrievalStrategy::Hybrid(HybridStrategy::new(
                strategy_clients.clone(),
                deadline,
                config.fusion.rrf_k,
            ))),
            fusion: FusionEngine::new(config.fusion.clone()),
            router: QueryRouter::new(config.router.clone()),
            rerank,
            content_files: ContentFileAggregator::new(
                VectorStrategy::new(strategy_clients.clone(), deadline),
                config.retrieval.clone(),
            ),
            metadata_files: MetadataFileAggregator::new(
                VectorStrategy::new(strategy_clients, deadline),
                Arc::clone(&clients.index),
                config.router.clone(),
                config.retrieval.clone(),
            ),
            understander: QueryUnderstander::new(
                Arc::clone(&clients.completion),
                config.understanding.clone(),
            ),
            condenser: HistoryCondenser::new(Arc::clone(&clients.completion)),
            policy: LowConfidencePolicy::new(
                Arc::clone(&clients.completion),
                config.engine.similarity_threshold,
            ),
            clients,
            config,
            pin: None,
        })
    }

    /// Pin retrieval to one strategy, bypassing the router.
    pub fn with_pin(mut self, pin: StrategyPin) -> Self {
        self.pin = Some(pin);
        self
    }

    /// Reject empty and oversized queries before any retrieval work.
    pub fn validate_query(text: &str) -> SibylResult<()> {
        if text.trim().is_empty() {
            return Err(SibylError::Validation("query is empty".to_string()));
        }
        if text.len() > MAX_QUERY_BYTES {
            return Err(SibylError::Validation(format!(
                "query exceeds {MAX_QUERY_BYTES} bytes"
            )));
        }
        Ok(())
    }

    /// Collapse history + new message into one query.
    pub async fn condense(&self, history: &[ChatMessage], new_message: &str) -> CondensedQuery {
        self.condenser.condense(history, new_message).await
    }

    /// One-shot query with no history.
    pub async fn query(&self, text: &str) -> SibylResult<EngineResult> {
        self.query_with_history(text, &[]).await
    }

    /// Full pipeline. Raises only `Validation` (bad input) or
    /// retrieval/LLM errors; the cascade handles those.
    pub async fn query_with_history(
        &self,
        text: &str,
        history: &[ChatMessage],
    ) -> SibylResult<EngineResult> {
        Self::validate_query(text)?;

        let condensed = self.condenser.condense(history, text).await;
        debug!(method = ?condensed.condensation_method, "history condensed");

        let understanding = self.understander.analyze(&condensed.final_query).await;
        let effective = understanding
            .effective_query(&condensed.final_query)
            .to_string();
        debug!(complexity = ?understanding.complexity, %effective, "query understood");

        let sources = self.retrieve(&effective).await?;
        info!(sources = sources.len(), "retrieval complete");

        let draft = self
            .clients
            .completion
            .complete(&prompts::answer_prompt(&effective, &sources))
            .await?;

        let (answer, reason) = self.policy.apply(&effective, draft, &sources).await;
        let mut fallback = FallbackRecord::none();
        if let Some(reason) = reason {
            fallback = fallback.with_policy_reason(reason);
        }
        Ok(EngineResult::new(answer, sources).with_fallback(fallback))
    }

    /// Retrieval stage: pinned strategy, or routed chunk/file retrieval.
    async fn retrieve(&self, query: &str) -> SibylResult<Vec<RetrievalCandidate>> {
        let top_k = self.config.retrieval.top_k;

        if let Some(pin) = self.pin {
            debug!(?pin, "router bypassed by pinned strategy");
            let fused = match pin {
                StrategyPin::Vector => {
                    let result = self.pinned_vector.retrieve(query, top_k).await?;
                    self.fusion.fuse(&[result], top_k)
                }
                StrategyPin::Hybrid => {
                    let result = self.pinned_hybrid.retrieve(query, top_k).await?;
                    self.fusion.fuse(&[result], top_k)
                }
                StrategyPin::MultiStrategy => {
                    let results = self.retriever.fan_out(query, top_k).await?;
                    self.fusion.fuse(&results, top_k)
                }
            };
            return Ok(self.rerank.apply(query, fused).await);
        }

        let decision = self.router.route(query);
        debug!(mode = ?decision.mode, rationale = %decision.rationale, "routed");
        match decision.mode {
            RoutingMode::Chunk => {
                let results = self.retriever.fan_out(query, top_k).await?;
                let fused = self.fusion.fuse(&results, top_k);
                Ok(self.rerank.apply(query, fused).await)
            }
            RoutingMode::FilesViaContent => self.content_files.retrieve(query).await,
            RoutingMode::FilesViaMetadata => self.metadata_files.retrieve(query).await,
        }
    }

    /// Streaming variant: an ordered event sequence on a bounded channel.
    ///
    /// Sources and reasoning are computed before the first token is
    /// emitted; event order is `Token* → Sources → Reasoning? → Done`,
    /// with `Error` substituting for `Done` on failure. The producer task
    /// owns cancellation: dropping the receiver stops it.
    pub async fn query_stream(
        self: Arc<Self>,
        text: String,
    ) -> SibylResult<mpsc::Receiver<StreamEvent>> {
        Self::validate_query(&text)?;

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            match self.stream_inner(&text, &tx).await {
                Ok(result) => {
                    let _ = tx.send(StreamEvent::Done(Box::new(result))).await;
                }
                Err(e) => {
                    warn!(error = %e, "stream failed, emitting error event");
                    let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                }
            }
        });
        Ok(rx)
    }

    async fn stream_inner(
        &self,
        text: &str,
        tx: &mpsc::Sender<StreamEvent>,
    ) -> SibylResult<EngineResult> {
        let understanding = self.understander.analyze(text).await;
        let effective = understanding.effective_query(text).to_string();
        let sources = self.retrieve(&effective).await?;

        // Evidence-side policy decision happens before the first token,
        // so the right prompt streams from the start.
        let trigger = self.policy.evidence_trigger(&sources);
        let prompt = match trigger {
            Some(_) => prompts::ungrounded_prompt(&effective),
            None => prompts::answer_prompt(&effective, &sources),
        };

        let mut answer = String::new();
        if trigger.is_some() {
            let disclaimer = format!("{}\n\n", prompts::PROVENANCE_DISCLAIMER);
            answer.push_str(&disclaimer);
            if tx.send(StreamEvent::Token(disclaimer)).await.is_err() {
                return Err(sibyl_core::errors::LlmError::Cancelled.into());
            }
        }

        let messages = vec![ChatMessage::user(prompt)];
        let mut chunks = self.clients.completion.stream(&messages).await?;
        let mut reasoning = String::new();
        while let Some(chunk) = chunks.recv().await {
            answer.push_str(&chunk.token);
            if let Some(r) = chunk.reasoning {
                reasoning.push_str(&r);
            }
            if tx.send(StreamEvent::Token(chunk.token)).await.is_err() {
                // Receiver gone: cancel promptly.
                return Err(sibyl_core::errors::LlmError::Cancelled.into());
            }
        }

        let mut reason = trigger;
        if answer.trim().is_empty() {
            reason = reason.or(Some(sibyl_core::models::FallbackReason::EmptyAnswer));
            answer = prompts::LOW_CONFIDENCE_MESSAGE.to_string();
            let _ = tx.send(StreamEvent::Token(answer.clone())).await;
        }

        let _ = tx.send(StreamEvent::Sources(sources.clone())).await;
        let reasoning = if reasoning.is_empty() {
            None
        } else {
            let _ = tx.send(StreamEvent::Reasoning(reasoning.clone())).await;
            Some(reasoning)
        };

        let mut fallback = FallbackRecord::none();
        if let Some(reason) = reason {
            fallback = fallback.with_policy_reason(reason);
        }
        Ok(EngineResult::new(answer, sources)
            .with_reasoning(reasoning)
            .with_fallback(fallback))
    }
}
