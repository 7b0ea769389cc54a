//! Collaborator contracts. All clients are long-lived, thread-safe
//! singletons injected at construction and shared read-only by every
//! query (`Arc<dyn ...>`); the core never mutates them.

mod completion;
mod embedding;
mod index;
mod rerank;
mod session;

pub use completion::{ICompletionService, StreamChunk};
pub use embedding::IEmbeddingProvider;
pub use index::{FileMetadata, IIndexSearch, IndexQuery, ScoredSpan, SearchFilter};
pub use rerank::IRerankOracle;
pub use session::ISessionStore;
