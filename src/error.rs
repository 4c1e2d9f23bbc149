//! Domain-specific error types for BOXSIGHT.
//!
//! Every failure the completion client or the two features can produce is
//! one of these variants. The HTTP layer surfaces the `Display` message of
//! the error verbatim in the `{"error": ...}` response body, so messages
//! are written for API consumers, not just logs.

/// Errors raised by the completion client and the score/analysis features.
#[derive(Debug, thiserror::Error)]
pub enum BoxsightError {
    /// Upstream completion API unreachable, or it returned a non-success
    /// status. Carries the transport detail (status line plus body, or the
    /// underlying request error).
    #[error("Completion API error: {0}")]
    Transport(String),

    /// Upstream returned text that was blank after cleanup.
    #[error("Completion API returned an empty response")]
    EmptyResponse,

    /// A score sample was not parseable as a number, or fell outside the
    /// 1–5 satisfaction scale. Carries the offending response text.
    #[error("Invalid score format: {0}")]
    InvalidScoreFormat(String),

    /// Zero samples were collected. Unreachable under the abort-on-first-
    /// invalid policy, kept as a guard.
    #[error("No valid scores collected")]
    NoValidScores,

    /// Invalid or missing configuration, e.g. the API credential env var
    /// is unset. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),
}
