/// Completion-service errors. Recovered by the next fallback cascade
/// level, or surfaced as the canned error answer at the terminal level.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("completion call failed: {reason}")]
    CallFailed { reason: String },

    #[error("completion stream broke mid-response: {reason}")]
    StreamBroken { reason: String },

    #[error("structured output could not be parsed: {reason}")]
    MalformedOutput { reason: String },

    #[error("completion call cancelled")]
    Cancelled,
}
