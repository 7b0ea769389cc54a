use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::SibylResult;
use crate::models::ChatMessage;

/// One streamed token, optionally accompanied by reasoning text.
#[derive(Debug, Clone)]
pub struct StreamChunk {
    pub token: String,
    pub reasoning: Option<String>,
}

/// The external completion/chat service. Both calls must support
/// cancellation: dropping the future (or the receiver) releases any
/// in-flight request promptly.
#[async_trait]
pub trait ICompletionService: Send + Sync {
    /// Single-shot completion of a prompt.
    async fn complete(&self, prompt: &str) -> SibylResult<String>;

    /// Streamed chat completion. The receiver yields tokens in order;
    /// the channel closing marks the end of the response.
    async fn stream(&self, messages: &[ChatMessage]) -> SibylResult<mpsc::Receiver<StreamChunk>>;
}
