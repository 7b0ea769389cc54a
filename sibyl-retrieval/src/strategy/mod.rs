//! Search strategies behind one `retrieve` contract.
//!
//! A closed set of variants (no runtime probing): dense-vector
//! similarity, sparse lexical match, literal pattern search, and a
//! hybrid that fans out to vector+lexical and fuses internally.

mod hybrid;
mod lexical;
mod pattern;
mod vector;

pub use hybrid::HybridStrategy;
pub use lexical::LexicalStrategy;
pub use pattern::PatternStrategy;
pub use vector::VectorStrategy;

use std::sync::Arc;

use sibyl_core::errors::SibylResult;
use sibyl_core::models::{RetrievalCandidate, StrategyResult};
use sibyl_core::traits::{IEmbeddingProvider, IIndexSearch, ScoredSpan};

/// Shared collaborator handles every strategy needs.
#[derive(Clone)]
pub struct StrategyClients {
    pub index: Arc<dyn IIndexSearch>,
    pub embedder: Arc<dyn IEmbeddingProvider>,
}

/// The closed strategy set. Dispatch is by variant; every variant
/// honors the same `retrieve(query, top_k)` contract.
pub enum RetrievalStrategy {
    Vector(VectorStrategy),
    Lexical(LexicalStrategy),
    Pattern(PatternStrategy),
    Hybrid(HybridStrategy),
}

impl RetrievalStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            RetrievalStrategy::Vector(_) => "vector",
            RetrievalStrategy::Lexical(_) => "lexical",
            RetrievalStrategy::Pattern(_) => "pattern",
            RetrievalStrategy::Hybrid(_) => "hybrid",
        }
    }

    /// Run this strategy. A blank query returns an empty result without
    /// touching the index.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> SibylResult<StrategyResult> {
        if query.trim().is_empty() {
            return Ok(StrategyResult::new(self.name(), Vec::new()));
        }
        match self {
            RetrievalStrategy::Vector(s) => s.retrieve(query, top_k).await,
            RetrievalStrategy::Lexical(s) => s.retrieve(query, top_k).await,
            RetrievalStrategy::Pattern(s) => s.retrieve(query, top_k).await,
            RetrievalStrategy::Hybrid(s) => s.retrieve(query, top_k).await,
        }
    }
}

/// Convert raw index spans into candidates, assigning 1-based ranks.
pub(crate) fn spans_to_candidates(spans: Vec<ScoredSpan>) -> Vec<RetrievalCandidate> {
    spans
        .into_iter()
        .enumerate()
        .map(|(i, span)| {
            let mut candidate = RetrievalCandidate::new(span.text, Some(span.score), i + 1);
            candidate.source_metadata = span.metadata;
            candidate
        })
        .collect()
}
