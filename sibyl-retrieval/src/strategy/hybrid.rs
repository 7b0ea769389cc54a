//! Hybrid strategy: internal vector+lexical fan-out fused with RRF.

use std::time::Duration;

use tracing::warn;

use sibyl_core::config::FusionConfig;
use sibyl_core::errors::{RetrievalError, SibylResult};
use sibyl_core::models::StrategyResult;

use super::{LexicalStrategy, StrategyClients, VectorStrategy};
use crate::fusion::rrf;

pub struct HybridStrategy {
    vector: VectorStrategy,
    lexical: LexicalStrategy,
    rrf_k: u32,
}

impl HybridStrategy {
    pub fn new(clients: StrategyClients, deadline: Duration, rrf_k: u32) -> Self {
        Self {
            vector: VectorStrategy::new(clients.clone(), deadline),
            lexical: LexicalStrategy::new(clients, deadline),
            rrf_k,
        }
    }

    /// Run vector and lexical concurrently and fuse. A single failing leg
    /// is tolerated; both failing is a `RetrievalError`.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> SibylResult<StrategyResult> {
        let (vector_res, lexical_res) = tokio::join!(
            self.vector.retrieve(query, top_k),
            self.lexical.retrieve(query, top_k),
        );

        let mut legs = Vec::with_capacity(2);
        for (leg, result) in [("vector", vector_res), ("lexical", lexical_res)] {
            match result {
                Ok(r) => legs.push(r),
                Err(e) => warn!(leg, error = %e, "hybrid leg failed, continuing"),
            }
        }
        if legs.is_empty() {
            return Err(RetrievalError::AllStrategiesFailed { attempted: 2 }.into());
        }

        let config = FusionConfig {
            rrf_k: self.rrf_k,
            ..FusionConfig::default()
        };
        let mut fused = rrf::fuse(&legs, &config);
        fused.truncate(top_k);
        Ok(StrategyResult::new("hybrid", fused))
    }
}
