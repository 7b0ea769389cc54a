//! Tagged events of the streaming protocol exposed to callers.
//!
//! Ordering contract per query: `Token*` precede `Sources`/`Reasoning`/
//! `Done`; `Done` is always last and emitted exactly once. On the error
//! path an `Error` event substitutes for `Done`.

use serde::{Deserialize, Serialize};

use super::candidate::RetrievalCandidate;
use super::result::EngineResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    Token(String),
    Sources(Vec<RetrievalCandidate>),
    Reasoning(String),
    Done(Box<EngineResult>),
    Error(String),
}

impl StreamEvent {
    /// True for the two terminal events.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done(_) | StreamEvent::Error(_))
    }
}
