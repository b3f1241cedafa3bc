//! Core error types for notion-timer-core.
//!
//! Every failure the timer can produce is classified here so front-ends can
//! tell "already running" from "not running" from "submission failed" without
//! string matching.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::integrations::RemoteRecordId;
use crate::timer::CompletedInterval;

/// Core error type for notion-timer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A timer is already persisted; the existing one is left untouched.
    #[error(
        "A session is already running ('{project}' / '{task}' since {started_at}). Use 'stop' before starting a new one."
    )]
    AlreadyRunning {
        project: String,
        task: String,
        started_at: DateTime<FixedOffset>,
    },

    /// No timer is persisted.
    #[error("No active session found. Use 'start' first.")]
    NotRunning,

    /// The state file exists but cannot be decoded.
    #[error("State file {path} is corrupt: {message}. Run 'discard' or delete the file to reset.")]
    CorruptState { path: PathBuf, message: String },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote write failed; local state is still intact.
    #[error("Submission failed: {0}")]
    Submission(#[from] SubmissionError),

    /// The remote record exists but the local state could not be removed.
    /// Running `stop` again would record the interval a second time.
    #[error(
        "Entry {record_id} was stored in Notion, but the local state could not be cleared: {source}. Do not run 'stop' again; run 'discard' or delete the state file."
    )]
    ClearFailed {
        record_id: RemoteRecordId,
        interval: CompletedInterval,
        source: Box<CoreError>,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required label is empty after trimming whitespace.
    #[error("'{field}' must not be empty")]
    EmptyField { field: &'static str },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting was given neither explicitly nor via the environment.
    #[error("Missing required {what}. Provide it via the {env_var} environment variable or CLI flag.")]
    Missing {
        what: &'static str,
        env_var: &'static str,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home directory could not be determined
    #[error("Could not determine the home directory")]
    NoHomeDir,
}

/// Classified failure of the single create-record call.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// Transport failure, timeout, rate limiting, or a server-side error.
    #[error("network failure calling {endpoint}{}: {message}", fmt_status(.status))]
    Network {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// The credential was rejected.
    #[error("Notion rejected the credential (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// The database refused the record shape, or is not shared with the integration.
    #[error(
        "Notion API error {status}: {message}. Verify database permissions and property names."
    )]
    SchemaMismatch { status: u16, message: String },
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl SubmissionError {
    /// HTTP status returned by the remote, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            SubmissionError::Network { status, .. } => *status,
            SubmissionError::Auth { status, .. } | SubmissionError::SchemaMismatch { status, .. } => {
                Some(*status)
            }
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
