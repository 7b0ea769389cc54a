//! Dense-vector similarity strategy.

use std::time::Duration;

use sibyl_core::errors::SibylResult;
use sibyl_core::models::StrategyResult;
use sibyl_core::traits::{IndexQuery, SearchFilter};

use super::{spans_to_candidates, StrategyClients};

pub struct VectorStrategy {
    clients: StrategyClients,
    deadline: Duration,
}

impl VectorStrategy {
    pub fn new(clients: StrategyClients, deadline: Duration) -> Self {
        Self { clients, deadline }
    }

    pub async fn retrieve(&self, query: &str, top_k: usize) -> SibylResult<StrategyResult> {
        self.retrieve_filtered(query, top_k, None).await
    }

    /// Vector retrieval narrowed by an index filter; used by the
    /// metadata file aggregator to pull chunks of one file.
    pub async fn retrieve_filtered(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<SearchFilter>,
    ) -> SibylResult<StrategyResult> {
        let embedding = self.clients.embedder.embed(query).await?;
        let spans = self
            .clients
            .index
            .search(IndexQuery::Vector(embedding), top_k, filter, self.deadline)
            .await?;
        Ok(StrategyResult::new("vector", spans_to_candidates(spans)))
    }
}
