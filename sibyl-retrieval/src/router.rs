//! Rule-based query router: chunk-level vs file-level retrieval.
//!
//! Classification is deterministic for a fixed rule set. The keyword
//! lists live in `RouterConfig`; the classifier itself never changes.

use tracing::debug;

use sibyl_core::config::RouterConfig;
use sibyl_core::models::{RoutingDecision, RoutingMode};

use crate::file_scope::metadata_keywords_present;

pub struct QueryRouter {
    config: RouterConfig,
}

impl QueryRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    /// Classify a query into a retrieval mode. Callers that pin a fixed
    /// strategy bypass this entirely.
    pub fn route(&self, query: &str) -> RoutingDecision {
        let lowered = query.to_lowercase();

        if let Some(token) = self.filename_token(&lowered) {
            let decision = RoutingDecision::new(
                RoutingMode::FilesViaMetadata,
                format!("query names a file-like token '{token}'"),
            );
            debug!(mode = ?decision.mode, rationale = %decision.rationale, "routed");
            return decision;
        }

        if let Some(marker) = self
            .config
            .broad_markers
            .iter()
            .find(|m| lowered.contains(m.as_str()))
        {
            let decision = RoutingDecision::new(
                RoutingMode::FilesViaContent,
                format!("broad explanatory phrasing '{marker}'"),
            );
            debug!(mode = ?decision.mode, rationale = %decision.rationale, "routed");
            return decision;
        }

        let decision = RoutingDecision::new(
            RoutingMode::Chunk,
            "no file or broad markers, defaulting to chunk retrieval",
        );
        debug!(mode = ?decision.mode, "routed");
        decision
    }

    /// First filename-like token: a known extension, or a
    /// "<token> file/document" pattern (spaced or concatenated).
    fn filename_token(&self, lowered: &str) -> Option<String> {
        for token in lowered.split_whitespace() {
            let token = token.trim_matches(|c: char| c.is_ascii_punctuation() && c != '.');
            if let Some((stem, ext)) = token.rsplit_once('.') {
                if !stem.is_empty() && self.config.known_extensions.iter().any(|e| e == ext) {
                    return Some(token.to_string());
                }
            }
        }
        if metadata_keywords_present(lowered, &self.config) {
            return Some(
                self.config
                    .file_markers
                    .iter()
                    .find(|m| lowered.contains(m.as_str()))
                    .cloned()
                    .unwrap_or_default(),
            );
        }
        None
    }
}
