//! Multi-turn history condensation, tiered by user-turn count.
//!
//! ≤2 user turns: textual concatenation of the last 4 messages (no LLM);
//! 3–4 turns: concatenation of the last 6; ≥5 turns: one completion call
//! producing a self-contained query, degrading to the short concatenation
//! on failure. `final_query` is never empty.

use std::sync::Arc;

use tracing::{debug, warn};

use sibyl_core::models::{ChatMessage, CondensationMethod, CondensedQuery, Role};
use sibyl_core::traits::ICompletionService;

use crate::prompts;

const SHORT_WINDOW: usize = 4;
const MEDIUM_WINDOW: usize = 6;

pub struct HistoryCondenser {
    completion: Arc<dyn ICompletionService>,
}

impl HistoryCondenser {
    pub fn new(completion: Arc<dyn ICompletionService>) -> Self {
        Self { completion }
    }

    pub async fn condense(&self, history: &[ChatMessage], new_message: &str) -> CondensedQuery {
        if history.is_empty() {
            return finished(
                new_message,
                0,
                CondensationMethod::None,
                new_message.to_string(),
            );
        }

        let user_turns = history.iter().filter(|m| m.role == Role::User).count();
        debug!(user_turns, "condensing history");

        match user_turns {
            0..=2 => {
                let (text, used) = concat_window(history, new_message, SHORT_WINDOW);
                finished(new_message, used, CondensationMethod::ConcatShort, text)
            }
            3..=4 => {
                let (text, used) = concat_window(history, new_message, MEDIUM_WINDOW);
                finished(new_message, used, CondensationMethod::ConcatMedium, text)
            }
            _ => self.llm_condense(history, new_message).await,
        }
    }

    async fn llm_condense(&self, history: &[ChatMessage], new_message: &str) -> CondensedQuery {
        let prompt = prompts::condense_prompt(history, new_message);
        match self.completion.complete(&prompt).await {
            Ok(compressed) if !compressed.trim().is_empty() => finished(
                new_message,
                history.len(),
                CondensationMethod::LlmCompressed,
                compressed.trim().to_string(),
            ),
            Ok(_) | Err(_) => {
                warn!("condensation call failed, degrading to short concatenation");
                let (text, used) = concat_window(history, new_message, SHORT_WINDOW);
                finished(
                    new_message,
                    used,
                    CondensationMethod::LlmFailedFallback,
                    text,
                )
            }
        }
    }
}

/// Concatenate the last `window` messages plus the new message, labeled
/// by role, one per line.
fn concat_window(history: &[ChatMessage], new_message: &str, window: usize) -> (String, usize) {
    let start = history.len().saturating_sub(window);
    let tail = &history[start..];
    let mut text = String::new();
    for m in tail {
        text.push_str(&format!("{}: {}\n", prompts::role_label(m), m.content));
    }
    text.push_str(&format!("user: {new_message}"));
    (text, tail.len())
}

fn finished(
    original: &str,
    history_turns_used: usize,
    condensation_method: CondensationMethod,
    final_query: String,
) -> CondensedQuery {
    // Invariant: final_query is never empty.
    let final_query = if final_query.trim().is_empty() {
        if original.trim().is_empty() {
            "(no question provided)".to_string()
        } else {
            original.to_string()
        }
    } else {
        final_query
    };
    CondensedQuery {
        original: original.to_string(),
        history_turns_used,
        condensation_method,
        final_query,
    }
}
