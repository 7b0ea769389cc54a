//! Metadata-based file aggregation.
//!
//! Extracts filename-like keywords from the query, matches them against
//! indexed file metadata, and pulls the matched files' chunks via
//! filtered vector search. No match is an empty list, not an error.

use std::sync::Arc;

use tracing::debug;

use sibyl_core::config::{RetrievalConfig, RouterConfig};
use sibyl_core::errors::SibylResult;
use sibyl_core::models::RetrievalCandidate;
use sibyl_core::traits::{IIndexSearch, SearchFilter};

use crate::strategy::VectorStrategy;

pub struct MetadataFileAggregator {
    vector: VectorStrategy,
    index: Arc<dyn IIndexSearch>,
    router: RouterConfig,
    config: RetrievalConfig,
}

impl MetadataFileAggregator {
    pub fn new(
        vector: VectorStrategy,
        index: Arc<dyn IIndexSearch>,
        router: RouterConfig,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            vector,
            index,
            router,
            config,
        }
    }

    pub async fn retrieve(&self, query: &str) -> SibylResult<Vec<RetrievalCandidate>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let keywords = extract_filename_keywords(query, &self.router);
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        debug!(?keywords, "extracted filename keywords");

        let files = self.index.file_metadata().await?;
        let mut matched: Vec<_> = files
            .into_iter()
            .filter(|f| {
                let name = f.file_name.to_lowercase();
                keywords.iter().any(|kw| name == *kw || name.contains(kw.as_str()))
            })
            .collect();
        matched.truncate(self.config.top_k_files);

        if matched.is_empty() {
            debug!("no file metadata matched, returning empty");
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for file in matched {
            let filter = SearchFilter {
                vector_ids: Some(file.vector_ids.clone()),
                source_file: Some(file.file_name.clone()),
            };
            let mut result = self
                .vector
                .retrieve_filtered(query, self.config.top_k_per_file, Some(filter))
                .await?;
            result.candidates.sort_by(|a, b| {
                b.score
                    .unwrap_or(0.0)
                    .partial_cmp(&a.score.unwrap_or(0.0))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            result.candidates.truncate(self.config.top_k_per_file);
            out.extend(result.candidates);
        }
        Ok(out)
    }
}

/// Filename-like keywords: extension tokens, then "<token> file/document"
/// patterns, else content tokens minus stop-words. All lowercased.
pub(crate) fn extract_filename_keywords(query: &str, config: &RouterConfig) -> Vec<String> {
    let tokens: Vec<String> = query
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| c.is_ascii_punctuation() && c != '.' && c != '_'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();

    // 1. Tokens carrying a known file extension.
    let mut keywords: Vec<String> = tokens
        .iter()
        .filter(|t| has_known_extension(t, config))
        .cloned()
        .collect();
    if !keywords.is_empty() {
        return keywords;
    }

    // 2. "<token> file/document" patterns, including the concatenated
    //    CJK form ("X文件").
    for marker in &config.file_markers {
        for (i, token) in tokens.iter().enumerate() {
            if token == marker && i > 0 {
                keywords.push(tokens[i - 1].clone());
            } else if let Some(prefix) = token.strip_suffix(marker.as_str()) {
                if !prefix.is_empty() {
                    keywords.push(prefix.to_string());
                }
            }
        }
    }
    if !keywords.is_empty() {
        keywords.dedup();
        return keywords;
    }

    // 3. Fallback: content tokens minus stop-words.
    tokens
        .into_iter()
        .filter(|t| !config.stop_words.iter().any(|sw| sw == t))
        .collect()
}

/// True when the query references a file by marker word, spaced
/// ("budget file") or concatenated CJK ("需求文档").
pub(crate) fn metadata_keywords_present(lowered: &str, config: &RouterConfig) -> bool {
    config.file_markers.iter().any(|marker| {
        lowered
            .find(marker.as_str())
            .map(|idx| idx > 0)
            .unwrap_or(false)
    })
}

fn has_known_extension(token: &str, config: &RouterConfig) -> bool {
    token
        .rsplit_once('.')
        .map(|(stem, ext)| !stem.is_empty() && config.known_extensions.iter().any(|e| e == ext))
        .unwrap_or(false)
}
