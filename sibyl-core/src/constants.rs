//! Workspace-wide constants that are not user-configurable.

/// Upper bound on concurrent strategy calls in one fan-out batch.
pub const MAX_FANOUT_CONCURRENCY: usize = 8;

/// Maximum accepted query size in bytes. Larger inputs are rejected
/// with a validation error before any retrieval work starts.
pub const MAX_QUERY_BYTES: usize = 8 * 1024;

/// Number of characters of chunk text used as the dedup key when
/// collapsing near-identical chunks in file-scope aggregation.
pub const TEXT_PREFIX_KEY_LEN: usize = 80;

/// Capacity of the bounded channel carrying stream events to the caller.
pub const STREAM_CHANNEL_CAPACITY: usize = 64;
