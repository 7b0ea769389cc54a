//! Optional post-fusion rerank stage.
//!
//! Calls the external scoring oracle on the fused top-N and re-sorts.
//! Oracle failure degrades to a pass-through of the pre-rerank list,
//! never failing the query.

use std::sync::Arc;

use tracing::{debug, warn};

use sibyl_core::models::RetrievalCandidate;
use sibyl_core::traits::IRerankOracle;

pub struct RerankStage {
    oracle: Option<Arc<dyn IRerankOracle>>,
    top_n: usize,
}

impl RerankStage {
    pub fn new(oracle: Option<Arc<dyn IRerankOracle>>, top_n: usize) -> Self {
        Self { oracle, top_n }
    }

    pub fn disabled() -> Self {
        Self {
            oracle: None,
            top_n: 0,
        }
    }

    pub async fn apply(
        &self,
        query: &str,
        fused: Vec<RetrievalCandidate>,
    ) -> Vec<RetrievalCandidate> {
        let Some(oracle) = &self.oracle else {
            return fused;
        };
        match oracle.rerank(query, &fused).await {
            Ok(mut rescored) => {
                rescored.sort_by(|a, b| {
                    b.score
                        .unwrap_or(0.0)
                        .partial_cmp(&a.score.unwrap_or(0.0))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                rescored.truncate(self.top_n);
                debug!(kept = rescored.len(), "rerank applied");
                rescored
            }
            Err(e) => {
                warn!(error = %e, "rerank oracle failed, passing fused list through");
                fused
            }
        }
    }
}
