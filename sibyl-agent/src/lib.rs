//! # sibyl-agent
//!
//! The planning-agent orchestrator and the fallback cascade. A bounded
//! tool-use loop drives the deterministic retrieval pipeline from
//! `sibyl-engine`; when any level fails, the cascade degrades through
//! pinned deterministic retrieval and a plain completion down to a
//! static answer.

pub mod cascade;
pub mod orchestrator;
pub mod tools;

pub use cascade::{CascadeController, STATIC_APOLOGY};
pub use orchestrator::{AgentOutcome, PlanningAgent};
pub use tools::ToolSet;
