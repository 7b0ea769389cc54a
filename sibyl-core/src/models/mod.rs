//! Shared data model. All entities here are created and consumed within a
//! single query's execution; nothing persists beyond the call except
//! through the external session-store collaborator.

mod candidate;
mod events;
mod fallback;
mod result;
mod routing;
mod session;
mod trace;
mod understanding;

pub use candidate::{
    fingerprint, RetrievalCandidate, StrategyResult, META_NATIVE_SCORE, META_SOURCE_FILE,
    META_VECTOR_ID,
};
pub use events::StreamEvent;
pub use fallback::{FallbackReason, FallbackRecord};
pub use result::EngineResult;
pub use routing::{RoutingDecision, RoutingMode};
pub use session::{ChatMessage, Role, SessionTurn};
pub use trace::{AgentTrace, ToolCallRecord};
pub use understanding::{Complexity, CondensationMethod, CondensedQuery, QueryUnderstanding};
