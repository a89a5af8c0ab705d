//! Error types for the assistant pipeline.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Failures of the generation provider.
///
/// None of these reach the transcript; the orchestrator replaces them with a
/// fixed fallback reply and reports the cause through `tracing`.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Generation provider not configured. Set {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Provider API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Prompt blocked by provider: {0}")]
    Blocked(String),

    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    #[error("No reply within {0:?}")]
    Timeout(Duration),
}

/// Reasons a submission is refused without touching the log.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    #[error("Submission is empty")]
    EmptyInput,

    #[error("An exchange is already in flight")]
    AlreadyInFlight,
}

/// Errors that can occur when loading settings from disk.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
