//! Core error types for protocolo7d-core.
//!
//! This module defines the error hierarchy using thiserror. Every failure
//! ends up as either a dialog message or a silent fallback; nothing here is
//! fatal to the process.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for protocolo7d-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Backend request errors
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Failure of a single backend request.
///
/// The client never retries; whoever issued the request decides what to
/// tell the user.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// No response within the configured timeout
    #[error("request to {path} timed out")]
    Timeout { path: String },

    /// Connection refused, DNS failure, TLS failure and the like
    #[error("transport failure on {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status
    #[error("backend returned HTTP {status} for {path}: {detail}")]
    Status {
        path: String,
        status: u16,
        detail: String,
    },

    /// The response body did not match the expected shape
    #[error("could not decode response from {path}: {message}")]
    Decode { path: String, message: String },
}

impl NetworkError {
    /// Classify a reqwest error raised while talking to `path`.
    pub(crate) fn from_reqwest(path: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout {
                path: path.to_string(),
            }
        } else if err.is_decode() {
            NetworkError::Decode {
                path: path.to_string(),
                message: err.to_string(),
            }
        } else {
            NetworkError::Transport {
                path: path.to_string(),
                source: err,
            }
        }
    }

    /// HTTP status code, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Device-local key-value storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to read the backing file
    #[error("Failed to read session store at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the backing file
    #[error("Failed to write session store at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file exists but is not a JSON object of strings
    #[error("Session store at {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Storage not reachable (used by in-memory doubles)
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// No usable data directory
    #[error("Could not determine data directory: {0}")]
    DataDir(String),
}

/// Input rejected before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Login input is empty or has no '@'
    #[error("invalid email address: '{0}'")]
    InvalidEmail(String),

    /// Onboarding target behavior shorter than the minimum
    #[error("target behavior must have at least {min_len} characters")]
    TargetTooShort { min_len: usize },

    /// Onboarding target behavior longer than the maximum
    #[error("target behavior must have at most {max_len} characters")]
    TargetTooLong { max_len: usize },

    /// Required tool fields left blank
    #[error("step {step}: required fields are empty: {}", missing.join(", "))]
    MissingAnswers { step: u32, missing: Vec<String> },
}
