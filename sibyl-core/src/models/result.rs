//! The sole return type of every core code path.

use serde::{Deserialize, Serialize};

use super::candidate::RetrievalCandidate;
use super::fallback::FallbackRecord;
use super::trace::AgentTrace;

/// Final answer plus provenance. Ownership transfers to the caller;
/// never shared or mutated after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResult {
    pub answer: String,
    pub sources: Vec<RetrievalCandidate>,
    pub reasoning: Option<String>,
    pub fallback: FallbackRecord,
    pub trace: Option<AgentTrace>,
}

impl EngineResult {
    pub fn new(answer: impl Into<String>, sources: Vec<RetrievalCandidate>) -> Self {
        Self {
            answer: answer.into(),
            sources,
            reasoning: None,
            fallback: FallbackRecord::none(),
            trace: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: Option<String>) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackRecord) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_trace(mut self, trace: Option<AgentTrace>) -> Self {
        self.trace = trace;
        self
    }

    /// Highest native score among the sources, if any carry one.
    pub fn max_source_score(&self) -> Option<f32> {
        self.sources
            .iter()
            .filter_map(|s| s.score)
            .fold(None, |acc, s| Some(acc.map_or(s, |a: f32| a.max(s))))
    }
}
