//! The planning loop: a bounded ReAct-style iteration over the search
//! tools, driven by JSON directives from the completion service.
//!
//! Each round the model either calls a tool or finishes. Replies that do
//! not parse as a directive are taken verbatim as the final answer, so a
//! model that ignores the protocol still terminates. The whole loop runs
//! under one wall-clock timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, warn};

use sibyl_core::config::AgentConfig;
use sibyl_core::errors::AgentError;
use sibyl_core::models::{AgentTrace, EngineResult, RetrievalCandidate, ToolCallRecord};
use sibyl_core::traits::ICompletionService;

use crate::tools::ToolSet;

/// What the loop produced: a final answer plus the evidence and trace
/// behind it. Sources and reasoning come from the tool-call history and
/// may legitimately be absent.
pub struct AgentOutcome {
    pub answer: String,
    pub sources: Vec<RetrievalCandidate>,
    pub reasoning: Option<String>,
    pub trace: AgentTrace,
}

/// One directive from the model. `action` is "tool" or "final".
#[derive(Debug, Deserialize)]
struct Directive {
    action: String,
    #[serde(default)]
    tool: String,
    #[serde(default)]
    query: String,
    #[serde(default)]
    answer: String,
}

pub struct PlanningAgent {
    completion: Arc<dyn ICompletionService>,
    tools: ToolSet,
    config: AgentConfig,
}

impl PlanningAgent {
    pub fn new(
        completion: Arc<dyn ICompletionService>,
        tools: ToolSet,
        config: AgentConfig,
    ) -> Self {
        Self {
            completion,
            tools,
            config,
        }
    }

    /// Run the loop to completion under the configured timeout.
    pub async fn run(&self, query: &str) -> Result<AgentOutcome, AgentError> {
        let timeout_secs = self.config.timeout_secs;
        let started = Instant::now();
        let result = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            self.run_loop(query, started),
        )
        .await;
        match result {
            Ok(outcome) => outcome,
            Err(_) => Err(AgentError::Timeout { timeout_secs }),
        }
    }

    async fn run_loop(
        &self,
        query: &str,
        started: Instant,
    ) -> Result<AgentOutcome, AgentError> {
        let mut trace = AgentTrace::default();
        let mut sources: Vec<RetrievalCandidate> = Vec::new();
        let mut reasoning: Option<String> = None;
        let mut scratchpad = String::new();

        for iteration in 1..=self.config.max_iterations {
            trace.iterations = iteration;
            let prompt = planning_prompt(query, &scratchpad, self.config.max_iterations);
            let reply = self
                .completion
                .complete(&prompt)
                .await
                .map_err(|e| AgentError::Failed {
                    reason: e.to_string(),
                })?;

            match parse_directive(&reply) {
                Some(d) if d.action == "tool" => {
                    debug!(iteration, tool = %d.tool, "agent tool call");
                    let call_started = Instant::now();
                    let observation = match self.tools.run(&d.tool, &d.query).await {
                        Ok(result) => {
                            let obs = render_observation(&result);
                            sources = result.sources;
                            reasoning = result.reasoning.or(reasoning);
                            obs
                        }
                        Err(e) => {
                            warn!(iteration, tool = %d.tool, error = %e, "tool failed");
                            format!("tool error: {e}")
                        }
                    };
                    trace.tool_calls.push(ToolCallRecord {
                        tool: d.tool,
                        query: d.query,
                        duration: call_started.elapsed(),
                    });
                    scratchpad.push_str(&format!(
                        "Step {iteration} observation:\n{observation}\n\n"
                    ));
                }
                Some(d) if d.action == "final" => {
                    let answer = d.answer.trim();
                    if answer.is_empty() {
                        return Err(AgentError::Failed {
                            reason: "final directive carried an empty answer".to_string(),
                        });
                    }
                    trace.elapsed = started.elapsed();
                    return Ok(AgentOutcome {
                        answer: answer.to_string(),
                        sources,
                        reasoning,
                        trace,
                    });
                }
                // Off-protocol reply: take it verbatim as the answer.
                _ if !reply.trim().is_empty() => {
                    debug!(iteration, "reply was not a directive, treating as final");
                    trace.elapsed = started.elapsed();
                    return Ok(AgentOutcome {
                        answer: reply.trim().to_string(),
                        sources,
                        reasoning,
                        trace,
                    });
                }
                _ => {
                    return Err(AgentError::Failed {
                        reason: "model returned an empty reply".to_string(),
                    });
                }
            }
        }

        Err(AgentError::Failed {
            reason: format!(
                "no final answer within {} iterations",
                self.config.max_iterations
            ),
        })
    }
}

/// Extract a directive from a reply that may wrap the JSON in prose.
fn parse_directive(reply: &str) -> Option<Directive> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&reply[start..=end]).ok()
}

fn render_observation(result: &EngineResult) -> String {
    let mut out = format!("answer: {}\n", result.answer);
    if result.sources.is_empty() {
        out.push_str("no passages found\n");
        return out;
    }
    for (i, c) in result.sources.iter().enumerate() {
        out.push_str(&format!(
            "[{}] (score {:.3}) {}\n",
            i + 1,
            c.similarity_score().unwrap_or(0.0),
            c.text
        ));
    }
    out
}

fn planning_prompt(query: &str, scratchpad: &str, max_iterations: usize) -> String {
    let tools = ToolSet::names().join(", ");
    let history = if scratchpad.is_empty() {
        String::new()
    } else {
        format!("\nPrevious steps:\n{scratchpad}")
    };
    format!(
        "You answer questions over an indexed document corpus using search \
         tools. Available tools: {tools}. You have at most {max_iterations} \
         steps.\n\nReply with exactly one JSON object: either \
         {{\"action\": \"tool\", \"tool\": \"<name>\", \"query\": \"<search query>\"}} \
         to search, or {{\"action\": \"final\", \"answer\": \"<answer>\"}} \
         when you can answer.\n{history}\nQuestion: {query}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_parses_with_surrounding_prose() {
        let d = parse_directive(
            "Sure. {\"action\": \"tool\", \"tool\": \"vector-search\", \"query\": \"fusion\"}",
        )
        .unwrap();
        assert_eq!(d.action, "tool");
        assert_eq!(d.tool, "vector-search");
        assert_eq!(d.query, "fusion");
    }

    #[test]
    fn plain_prose_is_not_a_directive() {
        assert!(parse_directive("I think the answer is 42.").is_none());
    }

    #[test]
    fn observation_lists_the_answer_and_scored_sources() {
        let c = test_fixtures::candidate("fusion merges lists", 0.9, "sys.md");
        let result = EngineResult::new("fused", vec![c]);
        let obs = render_observation(&result);
        assert!(obs.starts_with("answer: fused"));
        assert!(obs.contains("[1]"));
        assert!(obs.contains("0.900"));
    }

    #[test]
    fn empty_sources_render_as_no_passages() {
        let result = EngineResult::new("nothing", Vec::new());
        assert!(render_observation(&result).contains("no passages found"));
    }
}
