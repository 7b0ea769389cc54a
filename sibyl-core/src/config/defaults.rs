// Single source of truth for all default values.

// --- Fusion ---
pub const DEFAULT_RRF_K: u32 = 60;
pub const DEFAULT_DEDUP: bool = true;

// --- Retrieval ---
pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_STRATEGY_DEADLINE_MS: u64 = 5_000;
pub const DEFAULT_SIMILARITY_TOP_K: usize = 50;
pub const DEFAULT_TOP_K_FILES: usize = 3;
pub const DEFAULT_TOP_K_PER_FILE: usize = 3;
pub const DEFAULT_RERANK_ENABLED: bool = false;
pub const DEFAULT_RERANK_TOP_N: usize = 5;

// --- Understanding ---
pub const DEFAULT_SIMPLE_MAX_CHARS: usize = 24;
pub const DEFAULT_SIMPLE_MAX_WORDS: usize = 6;

// --- Engine ---
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.35;

// --- Agent ---
pub const DEFAULT_MAX_ITERATIONS: usize = 5;
pub const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 60;
