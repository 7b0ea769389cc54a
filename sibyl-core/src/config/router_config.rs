use serde::{Deserialize, Serialize};

/// Query-router keyword lists. The specific markers are tuned for the
/// corpus language mix and are deliberately configuration, not code:
/// deployments swap the lists without touching the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Words that mark a "<token> file/document" reference.
    pub file_markers: Vec<String>,
    /// Phrasing that marks a broad/explanatory question.
    pub broad_markers: Vec<String>,
    /// File extensions recognized in filename-like tokens.
    pub known_extensions: Vec<String>,
    /// Tokens ignored when extracting content keywords.
    pub stop_words: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            file_markers: to_owned(&["file", "document", "文件", "文档"]),
            broad_markers: to_owned(&[
                "what is",
                "what are",
                "how to",
                "how do",
                "introduce",
                "explain",
                "overview",
                "什么是",
                "是什么",
                "如何",
                "怎么",
                "介绍",
            ]),
            known_extensions: to_owned(&[
                "pdf", "txt", "md", "doc", "docx", "csv", "xlsx", "pptx", "html", "json",
            ]),
            stop_words: to_owned(&[
                "the", "a", "an", "is", "are", "of", "in", "on", "for", "to", "and", "or",
                "what", "how", "why", "which", "do", "does", "about", "with",
                "的", "了", "是", "吗", "呢", "有", "哪些", "什么",
            ]),
        }
    }
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}
