//! Configuration: one aggregate struct, per-subsystem sections, all
//! fields defaulted so a partial TOML file is enough.

mod agent_config;
pub mod defaults;
mod engine_config;
mod fusion_config;
mod retrieval_config;
mod router_config;

pub use agent_config::AgentConfig;
pub use engine_config::{EngineConfig, UnderstandingConfig};
pub use fusion_config::{FusionAlgorithm, FusionConfig};
pub use retrieval_config::RetrievalConfig;
pub use router_config::RouterConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{FusionError, SibylError, SibylResult};

/// Aggregate configuration for the whole engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SibylConfig {
    pub fusion: FusionConfig,
    pub retrieval: RetrievalConfig,
    pub router: RouterConfig,
    pub understanding: UnderstandingConfig,
    pub engine: EngineConfig,
    pub agent: AgentConfig,
}

impl SibylConfig {
    /// Parse a TOML document, then validate invariants.
    pub fn from_toml_str(raw: &str) -> SibylResult<Self> {
        let config: SibylConfig = toml::from_str(raw)
            .map_err(|e| SibylError::Validation(format!("config parse failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants. Called on every load path.
    pub fn validate(&self) -> SibylResult<()> {
        if self.fusion.rrf_k == 0 {
            return Err(FusionError::InvalidConfig {
                reason: "rrf_k must be > 0".to_string(),
            }
            .into());
        }
        if self.retrieval.top_k == 0 {
            return Err(SibylError::Validation("top_k must be > 0".to_string()));
        }
        if self.agent.max_iterations == 0 {
            return Err(SibylError::Validation(
                "agent.max_iterations must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.engine.similarity_threshold) {
            return Err(SibylError::Validation(
                "engine.similarity_threshold must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}
