//! In-memory mock collaborators for Sibyl test suites.
//!
//! Every external contract (`IIndexSearch`, `IEmbeddingProvider`,
//! `ICompletionService`, `IRerankOracle`, `ISessionStore`) has a
//! deterministic in-memory implementation here, with failure and latency
//! injection so tests can exercise the degraded paths.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::mpsc;

use sibyl_core::errors::{LlmError, RetrievalError, SibylResult};
use sibyl_core::models::{
    ChatMessage, RetrievalCandidate, SessionTurn, META_SOURCE_FILE, META_VECTOR_ID,
};
use sibyl_core::traits::{
    FileMetadata, ICompletionService, IEmbeddingProvider, IIndexSearch, IRerankOracle,
    ISessionStore, IndexQuery, ScoredSpan, SearchFilter, StreamChunk,
};

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// One chunk seeded into the mock index.
#[derive(Debug, Clone)]
pub struct SeededChunk {
    pub text: String,
    pub score: f32,
    pub file: String,
    pub vector_id: String,
}

impl SeededChunk {
    pub fn new(text: &str, score: f32, file: &str, vector_id: &str) -> Self {
        Self {
            text: text.to_string(),
            score,
            file: file.to_string(),
            vector_id: vector_id.to_string(),
        }
    }
}

/// In-memory index. Vector searches return seeded chunks by descending
/// score; term searches match chunks containing any query token; pattern
/// searches match literal substrings.
#[derive(Default)]
pub struct MockIndex {
    chunks: Vec<SeededChunk>,
    fail_vector: AtomicBool,
    fail_terms: AtomicBool,
    fail_pattern: AtomicBool,
    /// Artificial latency applied to every search, for deadline tests.
    delay: Mutex<Option<Duration>>,
    search_calls: AtomicUsize,
}

impl MockIndex {
    pub fn new(chunks: Vec<SeededChunk>) -> Self {
        Self {
            chunks,
            ..Default::default()
        }
    }

    pub fn fail_vector(&self, fail: bool) {
        self.fail_vector.store(fail, Ordering::SeqCst);
    }

    pub fn fail_terms(&self, fail: bool) {
        self.fail_terms.store(fail, Ordering::SeqCst);
    }

    pub fn fail_pattern(&self, fail: bool) {
        self.fail_pattern.store(fail, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn span_for(chunk: &SeededChunk, score: f32) -> ScoredSpan {
        let mut metadata = HashMap::new();
        metadata.insert(META_SOURCE_FILE.to_string(), chunk.file.clone());
        metadata.insert(META_VECTOR_ID.to_string(), chunk.vector_id.clone());
        ScoredSpan {
            text: chunk.text.clone(),
            score,
            metadata,
        }
    }

    fn passes(chunk: &SeededChunk, filter: &Option<SearchFilter>) -> bool {
        let Some(filter) = filter else { return true };
        if let Some(ids) = &filter.vector_ids {
            if !ids.iter().any(|id| id == &chunk.vector_id) {
                return false;
            }
        }
        if let Some(file) = &filter.source_file {
            if file != &chunk.file {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl IIndexSearch for MockIndex {
    async fn search(
        &self,
        query: IndexQuery,
        k: usize,
        filter: Option<SearchFilter>,
        deadline: Duration,
    ) -> SibylResult<Vec<ScoredSpan>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
            if delay > deadline {
                return Err(RetrievalError::IndexFailed {
                    reason: "deadline exceeded".to_string(),
                }
                .into());
            }
        }

        let failed = match &query {
            IndexQuery::Vector(_) => self.fail_vector.load(Ordering::SeqCst),
            IndexQuery::Terms(_) => self.fail_terms.load(Ordering::SeqCst),
            IndexQuery::Pattern(_) => self.fail_pattern.load(Ordering::SeqCst),
        };
        if failed {
            return Err(RetrievalError::IndexFailed {
                reason: "injected failure".to_string(),
            }
            .into());
        }

        let mut spans: Vec<ScoredSpan> = match query {
            IndexQuery::Vector(_) => self
                .chunks
                .iter()
                .filter(|c| Self::passes(c, &filter))
                .map(|c| Self::span_for(c, c.score))
                .collect(),
            IndexQuery::Terms(terms) => {
                let needles: Vec<String> = terms
                    .split_whitespace()
                    .map(|t| t.to_lowercase())
                    .collect();
                self.chunks
                    .iter()
                    .filter(|c| Self::passes(c, &filter))
                    .filter(|c| {
                        let hay = c.text.to_lowercase();
                        needles.iter().any(|n| hay.contains(n))
                    })
                    .map(|c| Self::span_for(c, c.score))
                    .collect()
            }
            IndexQuery::Pattern(pattern) => self
                .chunks
                .iter()
                .filter(|c| Self::passes(c, &filter))
                .filter(|c| c.text.contains(&pattern))
                .map(|c| Self::span_for(c, 1.0))
                .collect(),
        };

        spans.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        spans.truncate(k);
        Ok(spans)
    }

    async fn file_metadata(&self) -> SibylResult<Vec<FileMetadata>> {
        let mut by_file: HashMap<String, Vec<String>> = HashMap::new();
        for chunk in &self.chunks {
            by_file
                .entry(chunk.file.clone())
                .or_default()
                .push(chunk.vector_id.clone());
        }
        let mut files: Vec<FileMetadata> = by_file
            .into_iter()
            .map(|(file_name, vector_ids)| FileMetadata {
                file_name,
                vector_ids,
            })
            .collect();
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(files)
    }
}

// ---------------------------------------------------------------------------
// Embedding
// ---------------------------------------------------------------------------

/// Deterministic embedder: folds text bytes into a small fixed vector.
pub struct MockEmbedder;

#[async_trait]
impl IEmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> SibylResult<Vec<f32>> {
        let mut v = vec![0.0f32; 8];
        for (i, b) in text.bytes().enumerate() {
            v[i % 8] += f32::from(b) / 255.0;
        }
        Ok(v)
    }

    async fn embed_batch(&self, texts: &[String]) -> SibylResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for t in texts {
            out.push(self.embed(t).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        8
    }
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// A scripted completion reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail,
}

impl Reply {
    pub fn text(s: &str) -> Self {
        Reply::Text(s.to_string())
    }
}

/// Completion service driven by a script. Each call consumes the next
/// reply; when the script runs dry it echoes a canned answer so
/// open-ended tests keep working. Call counts are observable.
pub struct MockCompletion {
    script: Mutex<VecDeque<Reply>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockCompletion {
    pub fn scripted(replies: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always_ok() -> Self {
        Self::scripted(Vec::new())
    }

    pub fn always_failing() -> Self {
        // A long run of failures; enough for any cascade walk.
        Self::scripted(vec![Reply::Fail; 32])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next_reply(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.script.lock().unwrap().pop_front() {
            Some(Reply::Text(t)) => Ok(t),
            Some(Reply::Fail) => Err(LlmError::CallFailed {
                reason: "injected failure".to_string(),
            }),
            None => Ok("canned answer".to_string()),
        }
    }
}

#[async_trait]
impl ICompletionService for MockCompletion {
    async fn complete(&self, prompt: &str) -> SibylResult<String> {
        Ok(self.next_reply(prompt)?)
    }

    async fn stream(&self, messages: &[ChatMessage]) -> SibylResult<mpsc::Receiver<StreamChunk>> {
        let prompt = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let reply = self.next_reply(&prompt)?;
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            for word in reply.split_inclusive(' ') {
                if tx
                    .send(StreamChunk {
                        token: word.to_string(),
                        reasoning: None,
                    })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });
        Ok(rx)
    }
}

// ---------------------------------------------------------------------------
// Rerank
// ---------------------------------------------------------------------------

/// Rerank oracle with per-text score overrides and failure injection.
#[derive(Default)]
pub struct MockRerank {
    overrides: HashMap<String, f32>,
    fail: AtomicBool,
}

impl MockRerank {
    pub fn with_overrides(overrides: HashMap<String, f32>) -> Self {
        Self {
            overrides,
            fail: AtomicBool::new(false),
        }
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl IRerankOracle for MockRerank {
    async fn rerank(
        &self,
        _query: &str,
        candidates: &[RetrievalCandidate],
    ) -> SibylResult<Vec<RetrievalCandidate>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(LlmError::CallFailed {
                reason: "rerank oracle down".to_string(),
            }
            .into());
        }
        Ok(candidates
            .iter()
            .map(|c| {
                let mut c = c.clone();
                if let Some(score) = self.overrides.get(&c.text) {
                    c.score = Some(*score);
                }
                c
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

/// Concurrent in-memory session store.
#[derive(Default)]
pub struct MemorySessionStore {
    turns: DashMap<String, Vec<SessionTurn>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self, session_id: &str) -> Vec<SessionTurn> {
        self.turns
            .get(session_id)
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ISessionStore for MemorySessionStore {
    async fn append_turn(&self, session_id: &str, turn: SessionTurn) -> SibylResult<()> {
        self.turns.entry(session_id.to_string()).or_default().push(turn);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a candidate with a score and source file, rank 1.
pub fn candidate(text: &str, score: f32, file: &str) -> RetrievalCandidate {
    RetrievalCandidate::new(text, Some(score), 1).with_metadata(META_SOURCE_FILE, file)
}

/// Build a session turn for fixture seeding.
pub fn turn(question: &str, answer: &str) -> SessionTurn {
    SessionTurn {
        question: question.to_string(),
        answer: answer.to_string(),
        source_ids: Vec::new(),
        reasoning: None,
        recorded_at: Utc::now(),
    }
}
