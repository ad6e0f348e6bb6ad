//! Huginn error types

use std::time::Duration;

/// A failure reported by an external collaborator (forum API, summariser).
///
/// Collaborators normalise whatever went wrong into one of these three
/// shapes before returning, so [`classify`](crate::classify::classify) is a
/// total match over a closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        /// Server-provided `Retry-After`, if any.
        retry_after: Option<Duration>,
    },

    /// A local failure with a message (connection refused, parse error, ...).
    #[error("{message}")]
    Native { message: String },

    /// Nothing usable was reported.
    #[error("unknown upstream failure")]
    Unknown,
}

impl UpstreamError {
    /// HTTP failure without a retry hint.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    /// HTTP 429 carrying the upstream `Retry-After` value.
    pub fn rate_limited(message: impl Into<String>, retry_after: Duration) -> Self {
        Self::Http {
            status: 429,
            message: message.into(),
            retry_after: Some(retry_after),
        }
    }

    pub fn native(message: impl Into<String>) -> Self {
        Self::Native {
            message: message.into(),
        }
    }

    /// HTTP status, when the failure came from an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw upstream message. Empty for [`UpstreamError::Unknown`].
    pub fn message(&self) -> &str {
        match self {
            Self::Http { message, .. } | Self::Native { message } => message,
            Self::Unknown => "",
        }
    }

    /// Upstream-supplied retry hint.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Http { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Huginn error types
#[derive(Debug, thiserror::Error)]
pub enum HuginnError {
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;
