//! Result and error types for Settle.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for Settle operations
pub type SettleResult<T> = Result<T, SettleError>;

/// A previously located element reference is no longer valid.
///
/// Raised by [`Observable`](crate::Observable) and
/// [`Clickable`](crate::Clickable) implementations when the DOM was
/// re-rendered between locating and using an element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stale element reference to {element}: {reason}")]
pub struct Staleness {
    /// Element that went stale
    pub element: String,
    /// Driver-supplied reason
    pub reason: String,
}

impl Staleness {
    /// Create a new staleness error
    #[must_use]
    pub fn new(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur in Settle
#[derive(Debug, Error)]
pub enum SettleError {
    /// Click-until-condition budget spent without observing the condition
    #[error(
        "clicking {actor} {attempts} time(s) never made {observed} {expected}{}",
        diagnostic_suffix(.diagnostic)
    )]
    RetryExhausted {
        /// Element that was clicked
        actor: String,
        /// Description of the expected condition
        expected: String,
        /// Element whose state was observed
        observed: String,
        /// Attempts performed
        attempts: u32,
        /// Screenshot captured at exhaustion, if any
        diagnostic: Option<PathBuf>,
    },

    /// Click precondition never held
    #[error("{target} did not become {condition} within {ms}ms")]
    PreconditionTimeout {
        /// Element that was to be clicked
        target: String,
        /// Description of the precondition
        condition: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Blocking wait timed out
    #[error("timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// What was waited for
        waited_for: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Element went stale during a single, non-retried click
    #[error(transparent)]
    Stale(#[from] Staleness),

    /// Browser session query failed
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl SettleError {
    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error gates a required state transition
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::RetryExhausted { .. } | Self::PreconditionTimeout { .. } | Self::Timeout { .. }
        )
    }

    /// Diagnostic artifact attached to this error
    #[must_use]
    pub fn diagnostic(&self) -> Option<&PathBuf> {
        match self {
            Self::RetryExhausted { diagnostic, .. } => diagnostic.as_ref(),
            _ => None,
        }
    }
}

fn diagnostic_suffix(diagnostic: &Option<PathBuf>) -> String {
    diagnostic
        .as_ref()
        .map(|p| format!(" (screenshot: {})", p.display()))
        .unwrap_or_default()
}
