//! Sparse lexical match strategy.

use std::time::Duration;

use sibyl_core::errors::SibylResult;
use sibyl_core::models::StrategyResult;
use sibyl_core::traits::IndexQuery;

use super::{spans_to_candidates, StrategyClients};

pub struct LexicalStrategy {
    clients: StrategyClients,
    deadline: Duration,
}

impl LexicalStrategy {
    pub fn new(clients: StrategyClients, deadline: Duration) -> Self {
        Self { clients, deadline }
    }

    pub async fn retrieve(&self, query: &str, top_k: usize) -> SibylResult<StrategyResult> {
        let spans = self
            .clients
            .index
            .search(
                IndexQuery::Terms(query.to_string()),
                top_k,
                None,
                self.deadline,
            )
            .await?;
        Ok(StrategyResult::new("lexical", spans_to_candidates(spans)))
    }
}
