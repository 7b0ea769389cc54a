//! Search tools exposed to the planning loop.
//!
//! Each tool is the full deterministic retrieval+answer pipeline pinned
//! to one strategy, so a tool call inherits fusion, rerank, deadline
//! handling, and answer generation for free. The loop reasons over the
//! tool's answer and scored sources.

use std::sync::Arc;

use sibyl_core::config::SibylConfig;
use sibyl_core::errors::SibylResult;
use sibyl_core::models::EngineResult;
use sibyl_engine::{DeterministicEngine, EngineClients, StrategyPin};

pub const TOOL_VECTOR: &str = "vector-search";
pub const TOOL_HYBRID: &str = "hybrid-search";
pub const TOOL_MULTI: &str = "multi-strategy-search";

pub struct ToolSet {
    vector: Arc<DeterministicEngine>,
    hybrid: Arc<DeterministicEngine>,
    multi: Arc<DeterministicEngine>,
}

impl ToolSet {
    pub fn new(clients: EngineClients, config: SibylConfig) -> SibylResult<Self> {
        Ok(Self {
            vector: Arc::new(
                DeterministicEngine::new(clients.clone(), config.clone())?
                    .with_pin(StrategyPin::Vector),
            ),
            hybrid: Arc::new(
                DeterministicEngine::new(clients.clone(), config.clone())?
                    .with_pin(StrategyPin::Hybrid),
            ),
            multi: Arc::new(
                DeterministicEngine::new(clients, config)?.with_pin(StrategyPin::MultiStrategy),
            ),
        })
    }

    pub fn names() -> [&'static str; 3] {
        [TOOL_VECTOR, TOOL_HYBRID, TOOL_MULTI]
    }

    /// Dispatch by tool name. Unknown names are reported back to the
    /// loop as an error string, not raised.
    pub async fn run(&self, tool: &str, query: &str) -> Result<EngineResult, String> {
        let engine = match tool {
            TOOL_VECTOR => &self.vector,
            TOOL_HYBRID => &self.hybrid,
            TOOL_MULTI => &self.multi,
            other => return Err(format!("unknown tool: {other}")),
        };
        engine.query(query).await.map_err(|e| e.to_string())
    }
}
