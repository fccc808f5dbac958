//! Error types
//!
//! The scene pipeline itself never returns errors; these cover configuration,
//! collaborators and caller misuse of the choice protocol.

use std::time::Duration;
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

impl ConfigError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// Failure reported by an external collaborator (asset lookup, classifier)
///
/// Callers degrade these to a safe default; they never reach the host loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: String, reason: String },

    #[error("{service} failed: {reason}")]
    Failed { service: String, reason: String },

    #[error("{service} timed out after {after:?}")]
    TimedOut { service: String, after: Duration },
}

impl CollaboratorError {
    pub fn unavailable(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            service: service.into(),
            reason: reason.into(),
        }
    }

    pub fn failed(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            service: service.into(),
            reason: reason.into(),
        }
    }

    pub fn timed_out(service: impl Into<String>, after: Duration) -> Self {
        Self::TimedOut {
            service: service.into(),
            after,
        }
    }
}

/// Caller errors of the choice protocol
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChoiceError {
    #[error("a choice session is already awaiting input")]
    AlreadyAwaiting,

    #[error("no choice session is awaiting input")]
    NotAwaiting,

    #[error("choice {index} is out of range ({len} offered)")]
    InvalidIndex { index: usize, len: usize },

    #[error("custom choice text is empty")]
    EmptyText,
}
