//! # sibyl-engine
//!
//! The deterministic question-answering engine. Combines query
//! understanding, history condensation, the multi-strategy retrieval
//! pipeline from `sibyl-retrieval`, grounded answer generation, the
//! low-confidence policy, and the streaming surface.

pub mod condense;
pub mod confidence;
pub mod engine;
pub mod prompts;
pub mod understanding;

pub use condense::HistoryCondenser;
pub use confidence::LowConfidencePolicy;
pub use engine::{DeterministicEngine, EngineClients, StrategyPin};
pub use understanding::QueryUnderstander;
