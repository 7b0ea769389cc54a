//! Prompt assembly for the completion service.

use sibyl_core::models::{ChatMessage, RetrievalCandidate};

/// Disclaimer prepended to any answer produced without grounding
/// evidence.
pub const PROVENANCE_DISCLAIMER: &str =
    "Note: no sufficiently relevant passages were found in the indexed corpus; \
     the following answer is based on general knowledge and is not grounded in \
     your documents.";

/// Canned reply when even the ungrounded regeneration fails.
pub const LOW_CONFIDENCE_MESSAGE: &str =
    "I could not find relevant material in the indexed corpus to answer this \
     question confidently. Please rephrase the question or check that the \
     relevant documents are indexed.";

/// Grounded answering prompt with retrieved context injected.
pub fn answer_prompt(query: &str, sources: &[RetrievalCandidate]) -> String {
    let mut context = String::new();
    for (i, s) in sources.iter().enumerate() {
        context.push_str(&format!("[{}] {}\n", i + 1, s.text));
    }
    format!(
        "Answer the question using only the numbered context passages below. \
         Cite passage numbers where relevant. If the context does not contain \
         the answer, say so.\n\nContext:\n{context}\nQuestion: {query}\n\nAnswer:"
    )
}

/// Context-free regeneration prompt used by the low-confidence policy.
pub fn ungrounded_prompt(query: &str) -> String {
    format!(
        "No relevant passages were retrieved for the question below. Answer \
         from general knowledge, briefly and carefully.\n\nQuestion: {query}\n\nAnswer:"
    )
}

/// Structured query-understanding prompt. The reply must be one JSON
/// object.
pub fn understanding_prompt(query: &str) -> String {
    format!(
        "Analyze the user query and reply with exactly one JSON object, no \
         other text, with fields: query_type (string), complexity (one of \
         \"simple\", \"medium\", \"complex\"), entities (array of strings), \
         intent_summary (string), needs_rewrite (boolean), rewritten_queries \
         (array of 1 to 3 strings, empty when needs_rewrite is false).\n\n\
         Query: {query}"
    )
}

/// History-condensation prompt: produce one self-contained query.
pub fn condense_prompt(history: &[ChatMessage], new_message: &str) -> String {
    let mut transcript = String::new();
    for m in history {
        transcript.push_str(&format!("{}: {}\n", role_label(m), m.content));
    }
    format!(
        "Given the conversation below, rewrite the user's new message as a \
         single self-contained question that carries all necessary context. \
         Reply with the question only.\n\nConversation:\n{transcript}\n\
         New message: {new_message}"
    )
}

pub(crate) fn role_label(message: &ChatMessage) -> &'static str {
    match message.role {
        sibyl_core::models::Role::System => "system",
        sibyl_core::models::Role::User => "user",
        sibyl_core::models::Role::Assistant => "assistant",
    }
}
