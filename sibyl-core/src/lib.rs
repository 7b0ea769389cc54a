//! # sibyl-core
//!
//! Foundation crate for the Sibyl question-answering engine.
//! Defines all shared models, errors, config, constants, and the
//! collaborator traits (index, embedding, completion, rerank, session).
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::SibylConfig;
pub use errors::{SibylError, SibylResult};
pub use models::{EngineResult, FallbackReason, FallbackRecord, RetrievalCandidate};
