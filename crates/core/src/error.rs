//! Unified error types for pagetext.
//!
//! Every failure an extraction run can end in is one of these variants; the
//! binary maps them onto process exit codes through [`ExitStatus`].

use crate::config::ConfigError;

/// Unified error types for an extraction run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed URL (not `https://`).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The rendering environment could not load the target.
    #[error("NAVIGATION_FAILED: {0}")]
    NavigationFailed(String),

    /// Browser launch or protocol failure outside of navigation.
    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),

    /// A strategy could not find or extract its expected content.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// Raw bytes could not be decoded into text.
    #[error("DECODE_FAILED: {0}")]
    DecodeFailed(String),

    /// HTTP error while fetching raw bytes.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// The page never became reader-ready within the total timeout.
    #[error("TIMEOUT_EXHAUSTED: content not reader-ready after {0}ms")]
    TimeoutExhausted(u64),

    /// A strategy's own deadline fired before its content appeared.
    #[error("STRATEGY_DEADLINE: {strategy} gave up after {timeout_ms}ms")]
    StrategyDeadline { strategy: String, timeout_ms: u64 },

    /// Configuration could not be loaded or is invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether this error is a normal operational outcome rather than a fault.
    ///
    /// Exhaustion is reported through its exit code alone, without a diagnostic.
    pub fn is_expected(&self) -> bool {
        matches!(self, Error::TimeoutExhausted(_))
    }
}

/// Terminal status of one invocation, mapped 1:1 to a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    InvalidInput,
    Failure,
    Exhausted,
    StrategyDeadline,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::InvalidInput => 1,
            ExitStatus::Failure => 2,
            ExitStatus::Exhausted => 3,
            ExitStatus::StrategyDeadline => 4,
        }
    }
}

impl From<&Error> for ExitStatus {
    fn from(err: &Error) -> Self {
        match err {
            Error::InvalidInput(_) => ExitStatus::InvalidInput,
            Error::TimeoutExhausted(_) => ExitStatus::Exhausted,
            Error::StrategyDeadline { .. } => ExitStatus::StrategyDeadline,
            Error::NavigationFailed(_)
            | Error::RenderFailed(_)
            | Error::ExtractFailed(_)
            | Error::DecodeFailed(_)
            | Error::HttpError(_)
            | Error::Config(_) => ExitStatus::Failure,
        }
    }
}
