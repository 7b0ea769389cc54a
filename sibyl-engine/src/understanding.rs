//! Query understanding: intent analysis and rewrite.
//!
//! A cheap local heuristic classifies obviously simple queries and skips
//! the LLM entirely; the structured completion call is reserved for
//! medium/complex queries. Parse failures degrade to "use the original
//! query unchanged", never raise.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use sibyl_core::config::UnderstandingConfig;
use sibyl_core::models::{Complexity, QueryUnderstanding};
use sibyl_core::traits::ICompletionService;

use crate::prompts;

pub struct QueryUnderstander {
    completion: Arc<dyn ICompletionService>,
    config: UnderstandingConfig,
}

/// Shape of the structured LLM reply.
#[derive(Debug, Deserialize)]
struct LlmUnderstanding {
    query_type: String,
    complexity: String,
    #[serde(default)]
    entities: Vec<String>,
    #[serde(default)]
    intent_summary: String,
    #[serde(default)]
    needs_rewrite: bool,
    #[serde(default)]
    rewritten_queries: Vec<String>,
}

impl QueryUnderstander {
    pub fn new(completion: Arc<dyn ICompletionService>, config: UnderstandingConfig) -> Self {
        Self { completion, config }
    }

    /// Analyze a query. Never fails: every degradation path lands on the
    /// original query unchanged.
    pub async fn analyze(&self, query: &str) -> QueryUnderstanding {
        if self.is_heuristically_simple(query) {
            debug!("heuristic classified query as simple, skipping LLM");
            return QueryUnderstanding::passthrough(query, Complexity::Simple, 0.9);
        }

        let prompt = prompts::understanding_prompt(query);
        let raw = match self.completion.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "understanding call failed, using original query");
                return QueryUnderstanding::passthrough(query, Complexity::Medium, 0.5);
            }
        };

        match parse_structured(&raw) {
            Some(parsed) => {
                debug!(query_type = %parsed.query_type, "understanding parsed");
                to_understanding(query, parsed)
            }
            None => {
                warn!("understanding reply was malformed, using original query");
                QueryUnderstanding::passthrough(query, Complexity::Medium, 0.5)
            }
        }
    }

    /// Simple = short with few words, or an explicit file reference, and
    /// free of explanatory markers.
    fn is_heuristically_simple(&self, query: &str) -> bool {
        let lowered = query.to_lowercase();
        if self
            .config
            .explanatory_markers
            .iter()
            .any(|m| lowered.contains(m.as_str()))
        {
            return false;
        }
        if query
            .split_whitespace()
            .any(|t| t.rsplit_once('.').is_some_and(|(stem, ext)| {
                !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
            }))
        {
            return true;
        }
        query.chars().count() <= self.config.simple_max_chars
            && query.split_whitespace().count() <= self.config.simple_max_words
    }
}

/// Pull the first JSON object out of the reply and deserialize it.
fn parse_structured(raw: &str) -> Option<LlmUnderstanding> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

fn to_understanding(query: &str, parsed: LlmUnderstanding) -> QueryUnderstanding {
    let complexity = match parsed.complexity.as_str() {
        "simple" => Complexity::Simple,
        "complex" => Complexity::Complex,
        _ => Complexity::Medium,
    };
    let mut rewritten = if parsed.needs_rewrite {
        parsed.rewritten_queries
    } else {
        Vec::new()
    };
    rewritten.retain(|q| !q.trim().is_empty());
    rewritten.truncate(3);

    QueryUnderstanding {
        query_type: parsed.query_type,
        complexity,
        entities: parsed.entities.into_iter().collect::<BTreeSet<_>>(),
        intent_summary: if parsed.intent_summary.is_empty() {
            query.to_string()
        } else {
            parsed.intent_summary
        },
        confidence: 0.8,
        rewritten_queries: rewritten,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_extracted_from_noisy_reply() {
        let raw = "Sure! Here you go:\n{\"query_type\":\"factual\",\"complexity\":\"medium\"}\nDone.";
        let parsed = parse_structured(raw).unwrap();
        assert_eq!(parsed.query_type, "factual");
    }

    #[test]
    fn malformed_reply_yields_none() {
        assert!(parse_structured("no json here").is_none());
        assert!(parse_structured("{broken").is_none());
    }

    #[test]
    fn needs_rewrite_false_clears_rewrites() {
        let parsed = LlmUnderstanding {
            query_type: "factual".into(),
            complexity: "simple".into(),
            entities: vec![],
            intent_summary: String::new(),
            needs_rewrite: false,
            rewritten_queries: vec!["should be dropped".into()],
        };
        let u = to_understanding("q", parsed);
        assert!(u.rewritten_queries.is_empty());
        assert_eq!(u.effective_query("q"), "q");
    }
}
