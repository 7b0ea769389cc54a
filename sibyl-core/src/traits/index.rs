use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::SibylResult;

/// What a search executes against the index.
#[derive(Debug, Clone)]
pub enum IndexQuery {
    /// Dense-vector similarity over a query embedding.
    Vector(Vec<f32>),
    /// Sparse lexical match over query terms.
    Terms(String),
    /// Literal pattern / substring search.
    Pattern(String),
}

/// Optional narrowing of a search.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Restrict hits to spans whose vector id is in this set.
    pub vector_ids: Option<Vec<String>>,
    /// Restrict hits to one source file.
    pub source_file: Option<String>,
}

/// One scored span returned by the index.
#[derive(Debug, Clone)]
pub struct ScoredSpan {
    pub text: String,
    pub score: f32,
    pub metadata: HashMap<String, String>,
}

/// Metadata for one indexed file, used by metadata-based file retrieval.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub file_name: String,
    pub vector_ids: Vec<String>,
}

/// The external vector/lexical index. Long-lived, thread-safe,
/// connection-pooled; the core never mutates it.
#[async_trait]
pub trait IIndexSearch: Send + Sync {
    /// Run one search, returning within `deadline` or raising a
    /// cancellable error.
    async fn search(
        &self,
        query: IndexQuery,
        k: usize,
        filter: Option<SearchFilter>,
        deadline: Duration,
    ) -> SibylResult<Vec<ScoredSpan>>;

    /// Enumerate indexed file metadata.
    async fn file_metadata(&self) -> SibylResult<Vec<FileMetadata>>;
}
