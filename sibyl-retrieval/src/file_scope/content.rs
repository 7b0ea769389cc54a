//! Content-based file aggregation.
//!
//! Pulls a wide chunk set via the vector strategy, groups by source
//! file, scores each file as the mean of its top chunk scores, and
//! returns the top files' chunks.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use sibyl_core::config::RetrievalConfig;
use sibyl_core::errors::SibylResult;
use sibyl_core::models::RetrievalCandidate;

use super::text_prefix_key;
use crate::strategy::VectorStrategy;

pub struct ContentFileAggregator {
    vector: VectorStrategy,
    config: RetrievalConfig,
}

struct FileGroup {
    file: String,
    score: f32,
    chunks: Vec<RetrievalCandidate>,
}

impl ContentFileAggregator {
    pub fn new(vector: VectorStrategy, config: RetrievalConfig) -> Self {
        Self { vector, config }
    }

    /// Returns the union of the top files' top chunks, ordered by file
    /// score then chunk score. Blank queries return empty without
    /// touching the index.
    pub async fn retrieve(&self, query: &str) -> SibylResult<Vec<RetrievalCandidate>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let wide = self
            .vector
            .retrieve(query, self.config.similarity_top_k)
            .await?;

        // Group chunks by source file; chunks without one cannot be
        // aggregated at file scope.
        let mut by_file: HashMap<String, Vec<RetrievalCandidate>> = HashMap::new();
        for candidate in wide.candidates {
            if let Some(file) = candidate.source_file().map(str::to_string) {
                by_file.entry(file).or_default().push(candidate);
            }
        }

        let mut groups: Vec<FileGroup> = by_file
            .into_iter()
            .map(|(file, mut chunks)| {
                chunks.sort_by(|a, b| cmp_score(b, a));
                chunks.truncate(self.config.top_k_per_file);
                let score = mean_score(&chunks).min(1.0);
                FileGroup {
                    file,
                    score,
                    chunks,
                }
            })
            .collect();

        // Order files by score; name as deterministic tie-break.
        groups.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.file.cmp(&b.file))
        });
        groups.truncate(self.config.top_k_files);

        debug!(
            files = groups.len(),
            "content aggregation selected files: {:?}",
            groups.iter().map(|g| (&g.file, g.score)).collect::<Vec<_>>()
        );

        let mut seen_prefixes = HashSet::new();
        let mut out = Vec::new();
        for group in groups {
            for chunk in group.chunks {
                if seen_prefixes.insert(text_prefix_key(&chunk.text)) {
                    out.push(chunk);
                }
            }
        }
        Ok(out)
    }
}

fn cmp_score(a: &RetrievalCandidate, b: &RetrievalCandidate) -> std::cmp::Ordering {
    a.score
        .unwrap_or(0.0)
        .partial_cmp(&b.score.unwrap_or(0.0))
        .unwrap_or(std::cmp::Ordering::Equal)
}

fn mean_score(chunks: &[RetrievalCandidate]) -> f32 {
    if chunks.is_empty() {
        return 0.0;
    }
    chunks.iter().filter_map(|c| c.score).sum::<f32>() / chunks.len() as f32
}
