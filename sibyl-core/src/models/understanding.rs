//! Query-understanding and history-condensation outputs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Query complexity class. Simple queries skip the LLM understanding call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

/// Output of intent analysis, either from the local heuristic or from a
/// structured completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryUnderstanding {
    /// Free-form label produced by the analysis ("factual", "how-to", ...).
    pub query_type: String,
    pub complexity: Complexity,
    pub entities: BTreeSet<String>,
    pub intent_summary: String,
    /// Confidence in the analysis, clamped to [0, 1].
    pub confidence: f32,
    /// Rewritten queries (1..=3) when the analysis asked for a rewrite.
    pub rewritten_queries: Vec<String>,
}

impl QueryUnderstanding {
    /// The untouched-query fallback: used for heuristic-simple queries and
    /// whenever the structured LLM output cannot be parsed.
    pub fn passthrough(query: &str, complexity: Complexity, confidence: f32) -> Self {
        Self {
            query_type: "direct".to_string(),
            complexity,
            entities: BTreeSet::new(),
            intent_summary: query.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            rewritten_queries: Vec::new(),
        }
    }

    /// The query the retrieval stages should actually run.
    pub fn effective_query<'a>(&'a self, original: &'a str) -> &'a str {
        self.rewritten_queries
            .first()
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(original)
    }
}

/// How the conversation history was collapsed into one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CondensationMethod {
    /// No history: the new message is the query.
    None,
    /// ≤2 user turns: concatenation of the last 4 messages.
    ConcatShort,
    /// 3–4 user turns: concatenation of the last 6 messages.
    ConcatMedium,
    /// ≥5 user turns: one LLM call produced a self-contained query.
    LlmCompressed,
    /// The LLM call failed; degraded to the short concatenation shape.
    LlmFailedFallback,
}

/// A multi-turn history collapsed into one self-contained query.
/// Invariant: `final_query` is never empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondensedQuery {
    pub original: String,
    pub history_turns_used: usize,
    pub condensation_method: CondensationMethod,
    pub final_query: String,
}
