//! # sibyl-retrieval
//!
//! Multi-strategy retrieval over the external index: strategy fan-out,
//! candidate fusion (RRF / weighted score / concat), file-scope
//! aggregation, heuristic query routing, and the optional rerank stage.

pub mod fanout;
pub mod file_scope;
pub mod fusion;
pub mod rerank;
pub mod router;
pub mod strategy;

pub use fanout::MultiStrategyRetriever;
pub use fusion::FusionEngine;
pub use rerank::RerankStage;
pub use router::QueryRouter;
