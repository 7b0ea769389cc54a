//! The fallback cascade. Level 0 is the planning agent; each level below
//! is strictly simpler and more reliable than the one above, down to a
//! static answer that cannot fail. Callers therefore always get an
//! `EngineResult`; the only error that escapes is input validation.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use sibyl_core::config::SibylConfig;
use sibyl_core::errors::{AgentError, SibylResult};
use sibyl_core::models::{
    ChatMessage, EngineResult, FallbackReason, FallbackRecord, SessionTurn,
};
use sibyl_core::traits::{ICompletionService, ISessionStore};
use sibyl_engine::prompts;
use sibyl_engine::{DeterministicEngine, EngineClients, LowConfidencePolicy, StrategyPin};

use crate::orchestrator::PlanningAgent;
use crate::tools::ToolSet;

/// Level-3 answer. Static by construction so the cascade can always
/// terminate with a result.
pub const STATIC_APOLOGY: &str =
    "I was unable to answer this question right now. Please try again, or \
     rephrase the question.";

pub struct CascadeController {
    agent: PlanningAgent,
    deterministic: Arc<DeterministicEngine>,
    policy: LowConfidencePolicy,
    completion: Arc<dyn ICompletionService>,
    sessions: Option<Arc<dyn ISessionStore>>,
}

impl CascadeController {
    pub fn new(clients: EngineClients, config: SibylConfig) -> SibylResult<Self> {
        let tools = ToolSet::new(clients.clone(), config.clone())?;
        let agent = PlanningAgent::new(
            Arc::clone(&clients.completion),
            tools,
            config.agent.clone(),
        );
        let policy = LowConfidencePolicy::new(
            Arc::clone(&clients.completion),
            config.engine.similarity_threshold,
        );
        let deterministic = Arc::new(
            DeterministicEngine::new(clients.clone(), config)?.with_pin(StrategyPin::Vector),
        );
        Ok(Self {
            agent,
            deterministic,
            policy,
            completion: clients.completion,
            sessions: None,
        })
    }

    pub fn with_session_store(mut self, store: Arc<dyn ISessionStore>) -> Self {
        self.sessions = Some(store);
        self
    }

    /// Answer a query, walking down the cascade as levels fail. Raises
    /// only `Validation`; every other failure degrades to the next level.
    pub async fn answer(
        &self,
        session_id: Option<&str>,
        query: &str,
        history: &[ChatMessage],
    ) -> SibylResult<EngineResult> {
        DeterministicEngine::validate_query(query)?;

        let condensed = self.deterministic.condense(history, query).await;
        let effective = condensed.final_query;

        let result = self.walk(&effective).await;
        if let Some(store) = &self.sessions {
            self.record_turn(store, session_id, query, &result).await;
        }
        Ok(result)
    }

    async fn walk(&self, query: &str) -> EngineResult {
        // Level 0: the planning agent. Its answer is still a draft and
        // passes through the low-confidence policy like any other.
        let reason = match self.agent.run(query).await {
            Ok(outcome) => {
                let (answer, policy_reason) = self
                    .policy
                    .apply(query, outcome.answer, &outcome.sources)
                    .await;
                let mut fallback = FallbackRecord::none();
                if let Some(policy_reason) = policy_reason {
                    fallback = fallback.with_policy_reason(policy_reason);
                }
                return EngineResult::new(answer, outcome.sources)
                    .with_reasoning(outcome.reasoning)
                    .with_fallback(fallback)
                    .with_trace(Some(outcome.trace));
            }
            Err(AgentError::Timeout { timeout_secs }) => {
                warn!(timeout_secs, "agent timed out, falling back");
                FallbackReason::AgentTimeout
            }
            Err(e) => {
                warn!(error = %e, "agent failed, falling back");
                FallbackReason::AgentError
            }
        };

        // Level 1: deterministic engine pinned to vector search.
        match self.deterministic.query(query).await {
            Ok(mut result) => {
                info!("cascade answered at level 1");
                result.fallback = FallbackRecord::at_level(1, reason);
                return result;
            }
            Err(e) => warn!(error = %e, "deterministic engine failed, falling back"),
        }

        // Level 2: one ungrounded completion, no retrieval at all.
        match self
            .completion
            .complete(&prompts::ungrounded_prompt(query))
            .await
        {
            Ok(answer) if !answer.trim().is_empty() => {
                info!("cascade answered at level 2");
                return EngineResult::new(answer.trim(), Vec::new()).with_fallback(
                    FallbackRecord::at_level(2, FallbackReason::DeterministicError),
                );
            }
            Ok(_) => warn!("ungrounded completion was empty, falling back"),
            Err(e) => warn!(error = %e, "ungrounded completion failed, falling back"),
        }

        // Level 3: static answer. Cannot fail.
        EngineResult::new(STATIC_APOLOGY, Vec::new()).with_fallback(FallbackRecord::at_level(
            3,
            FallbackReason::DeterministicError,
        ))
    }

    /// Session persistence is best-effort: a store failure is logged and
    /// never changes the result.
    async fn record_turn(
        &self,
        store: &Arc<dyn ISessionStore>,
        session_id: Option<&str>,
        question: &str,
        result: &EngineResult,
    ) {
        let Some(session_id) = session_id else {
            return;
        };
        let turn = SessionTurn {
            question: question.to_string(),
            answer: result.answer.clone(),
            source_ids: result.sources.iter().map(|s| s.id.clone()).collect(),
            reasoning: result.reasoning.clone(),
            recorded_at: Utc::now(),
        };
        if let Err(e) = store.append_turn(session_id, turn).await {
            warn!(session_id, error = %e, "failed to persist session turn");
        }
    }
}
