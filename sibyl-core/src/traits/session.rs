use async_trait::async_trait;

use crate::errors::SibylResult;
use crate::models::SessionTurn;

/// Durable chat-session storage. Consumed, not owned: the core appends
/// turns and never reads them back.
#[async_trait]
pub trait ISessionStore: Send + Sync {
    async fn append_turn(&self, session_id: &str, turn: SessionTurn) -> SibylResult<()>;
}
