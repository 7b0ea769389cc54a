//! Fallback bookkeeping attached to every `EngineResult`.

use serde::{Deserialize, Serialize};

/// Why a fallback fired. Cascade reasons (`AgentTimeout`, `AgentError`,
/// `DeterministicError`) describe engine failure; policy reasons
/// (`NoSources`, `LowSimilarity`, `EmptyAnswer`) describe a low-quality
/// success. The two mechanisms are orthogonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoSources,
    LowSimilarity,
    EmptyAnswer,
    AgentTimeout,
    AgentError,
    DeterministicError,
}

/// Record of which degraded path produced the result.
/// Level 0 = the preferred path succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRecord {
    pub reason: Option<FallbackReason>,
    /// Cascade level that produced the answer: 0 agent, 1 deterministic,
    /// 2 pure completion, 3 static error answer.
    pub level: u8,
}

impl FallbackRecord {
    /// The no-fallback record stamped on a level-0 success.
    pub fn none() -> Self {
        Self {
            reason: None,
            level: 0,
        }
    }

    pub fn at_level(level: u8, reason: FallbackReason) -> Self {
        debug_assert!(level <= 3);
        Self {
            reason: Some(reason),
            level,
        }
    }

    /// Stamp a low-confidence policy reason without touching the cascade
    /// level. The policy handles low-quality success; the level records
    /// engine failure.
    pub fn with_policy_reason(mut self, reason: FallbackReason) -> Self {
        self.reason = Some(reason);
        self
    }
}

impl Default for FallbackRecord {
    fn default() -> Self {
        Self::none()
    }
}
