use async_trait::async_trait;

use crate::errors::SibylResult;
use crate::models::RetrievalCandidate;

/// Cross-encoder rerank oracle: rescoring of (query, candidates).
#[async_trait]
pub trait IRerankOracle: Send + Sync {
    /// Return the candidates with updated scores. Order of the returned
    /// list is not significant; the caller re-sorts.
    async fn rerank(
        &self,
        query: &str,
        candidates: &[RetrievalCandidate],
    ) -> SibylResult<Vec<RetrievalCandidate>>;
}
