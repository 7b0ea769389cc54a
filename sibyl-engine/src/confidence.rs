//! Low-confidence fallback policy.
//!
//! Applied after any engine path produces a draft answer+sources. When
//! evidence is weak or absent the answer is regenerated context-free
//! with an explicit provenance disclaimer; regeneration failure returns
//! a canned message instead of propagating. Sets `fallback.reason` only;
//! the cascade level is owned by the cascade controller.

use std::sync::Arc;

use tracing::{info, warn};

use sibyl_core::models::{FallbackReason, RetrievalCandidate};
use sibyl_core::traits::ICompletionService;

use crate::prompts;

pub struct LowConfidencePolicy {
    completion: Arc<dyn ICompletionService>,
    similarity_threshold: f32,
}

impl LowConfidencePolicy {
    pub fn new(completion: Arc<dyn ICompletionService>, similarity_threshold: f32) -> Self {
        Self {
            completion,
            similarity_threshold,
        }
    }

    /// The evidence-side triggers, decidable before an answer exists.
    /// Used by the streaming path to pick the prompt up front.
    pub fn evidence_trigger(&self, sources: &[RetrievalCandidate]) -> Option<FallbackReason> {
        if sources.is_empty() {
            return Some(FallbackReason::NoSources);
        }
        let max_score = sources
            .iter()
            .filter_map(|s| s.similarity_score())
            .fold(None::<f32>, |acc, s| Some(acc.map_or(s, |a| a.max(s))));
        match max_score {
            Some(max) if max >= self.similarity_threshold => None,
            // Unscored sources count as weak evidence.
            _ => Some(FallbackReason::LowSimilarity),
        }
    }

    /// Full policy check over a draft answer. Returns the final answer
    /// and the triggered reason, if any.
    pub async fn apply(
        &self,
        query: &str,
        draft: String,
        sources: &[RetrievalCandidate],
    ) -> (String, Option<FallbackReason>) {
        let reason = self.evidence_trigger(sources).or_else(|| {
            if draft.trim().is_empty() {
                Some(FallbackReason::EmptyAnswer)
            } else {
                None
            }
        });

        let Some(reason) = reason else {
            return (draft, None);
        };
        info!(?reason, "low-confidence policy triggered, regenerating");

        match self.completion.complete(&prompts::ungrounded_prompt(query)).await {
            Ok(regenerated) if !regenerated.trim().is_empty() => (
                format!("{}\n\n{}", prompts::PROVENANCE_DISCLAIMER, regenerated.trim()),
                Some(reason),
            ),
            Ok(_) => (prompts::LOW_CONFIDENCE_MESSAGE.to_string(), Some(reason)),
            Err(e) => {
                warn!(error = %e, "regeneration failed, returning canned message");
                (prompts::LOW_CONFIDENCE_MESSAGE.to_string(), Some(reason))
            }
        }
    }
}
