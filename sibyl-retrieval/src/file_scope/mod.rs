//! File-scope aggregation: turn chunk-level hits into file-level answers.
//!
//! Two variants, picked by the router: content-based (wide vector pull,
//! group-and-score by file) and metadata-based (filename keyword match,
//! per-file chunk pull).

mod content;
mod metadata;

pub use content::ContentFileAggregator;
pub use metadata::MetadataFileAggregator;
pub(crate) use metadata::metadata_keywords_present;

use sibyl_core::constants::TEXT_PREFIX_KEY_LEN;

/// Dedup key for near-identical chunks: leading characters of the text,
/// lowercased with whitespace collapsed.
pub(crate) fn text_prefix_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .chars()
        .take(TEXT_PREFIX_KEY_LEN)
        .collect()
}
