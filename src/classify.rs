//! Error classification.
//!
//! [`classify`] maps any collaborator failure onto a fixed
//! [`ErrorCategory`], decides whether it is worth retrying, and attaches a
//! user-facing message. Classification is total: every input, including no
//! error value at all, yields a [`ProcessedError`].
//!
//! Rules are checked in order, first match wins. Message checks are
//! case-insensitive substring matches on the upstream message.
//!
//! | # | trigger                                              | category       | retry |
//! |---|------------------------------------------------------|----------------|-------|
//! | 1 | 401, "authentication", "invalid api key"             | Authentication | no    |
//! | 2 | 404, "not found"                                     | NotFound       | no    |
//! | 3 | 429, "rate limit"                                    | RateLimit      | yes   |
//! | 4 | "network error", "unable to connect"                 | Network        | yes   |
//! | 5 | "timeout", "did not respond in time"                 | Timeout        | yes   |
//! | 6 | raised during [`Phase::AiGeneration`]                | AIProcessing   | yes   |
//! | 7 | raised during [`Phase::Validation`]                  | Validation     | no    |
//! | 8 | anything else                                        | Unknown        | yes   |
//!
//! A missing error value, or [`UpstreamError::Unknown`], is always
//! `Unknown` whatever the phase: there is no message to attribute.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::UpstreamError;
use crate::telemetry;

/// Retry hint for rate limits when the upstream gives none.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Upstream text kept in debug logs is cut to this many characters.
const LOG_DETAIL_MAX_CHARS: usize = 200;

/// Where in the request a failure was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Checking caller input before any upstream call.
    Validation,
    /// Fetching the thread and its posts from the forum.
    ForumFetch,
    /// Producing the summary with the AI summariser.
    AiGeneration,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Validation => "validation",
            Phase::ForumFetch => "forum_fetch",
            Phase::AiGeneration => "ai_generation",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Authentication,
    NotFound,
    RateLimit,
    Network,
    Timeout,
    #[serde(rename = "ai_processing")]
    AIProcessing,
    Validation,
    Unknown,
}

impl ErrorCategory {
    /// Whether a failure of this category may succeed on a later attempt.
    pub fn is_retryable(self) -> bool {
        !matches!(
            self,
            ErrorCategory::Authentication | ErrorCategory::NotFound | ErrorCategory::Validation
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::RateLimit => "rate_limit",
            ErrorCategory::Network => "network",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::AIProcessing => "ai_processing",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Unknown => "unknown",
        }
    }

    /// User-facing message for the category.
    fn message(self, retry_after_secs: Option<u64>) -> String {
        match self {
            ErrorCategory::Authentication => {
                "Authentication failed. Please check your credentials.".to_string()
            }
            ErrorCategory::NotFound => "The requested thread could not be found.".to_string(),
            ErrorCategory::RateLimit => format!(
                "Too many requests. Please try again in {} seconds.",
                retry_after_secs.unwrap_or(DEFAULT_RETRY_AFTER_SECS)
            ),
            ErrorCategory::Network => {
                "Unable to connect to the forum service. Please check your connection.".to_string()
            }
            ErrorCategory::Timeout => {
                "The service did not respond in time. Please try again.".to_string()
            }
            ErrorCategory::AIProcessing => {
                "AI summary generation failed. Please try again.".to_string()
            }
            ErrorCategory::Validation => {
                "The request was invalid. Please check the thread and try again.".to_string()
            }
            ErrorCategory::Unknown => {
                "An unexpected error occurred. Please try again later.".to_string()
            }
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure, ready to show to a user or drive a retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedError {
    pub category: ErrorCategory,
    /// Templated user-facing text; never contains upstream detail.
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

impl ProcessedError {
    /// Build the processed form of a category.
    ///
    /// `retry_after_seconds` is only kept for [`ErrorCategory::RateLimit`],
    /// which always carries one.
    pub fn new(category: ErrorCategory, retry_after_seconds: Option<u64>) -> Self {
        let retry_after_seconds = match category {
            ErrorCategory::RateLimit => {
                Some(retry_after_seconds.unwrap_or(DEFAULT_RETRY_AFTER_SECS))
            }
            _ => None,
        };
        Self {
            category,
            message: category.message(retry_after_seconds),
            retryable: category.is_retryable(),
            retry_after_seconds,
        }
    }

    /// Retry hint as a duration.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after_seconds.map(Duration::from_secs)
    }
}

impl fmt::Display for ProcessedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

impl std::error::Error for ProcessedError {}

/// Classify a collaborator failure raised during `phase`.
///
/// `None` stands for "the call failed but produced no error value" and
/// classifies as [`ErrorCategory::Unknown`].
pub fn classify(raw: Option<&UpstreamError>, phase: Phase) -> ProcessedError {
    let category = categorize(raw, phase);
    let retry_after_seconds = raw
        .and_then(UpstreamError::retry_after)
        .map(|d| d.as_secs().max(1));

    debug!(
        %phase,
        %category,
        status = raw.and_then(UpstreamError::status),
        detail = %raw.map(|e| truncate(e.message(), LOG_DETAIL_MAX_CHARS)).unwrap_or_default(),
        "classified upstream failure"
    );
    metrics::counter!(telemetry::ERRORS_TOTAL, "category" => category.as_str()).increment(1);

    ProcessedError::new(category, retry_after_seconds)
}

fn categorize(raw: Option<&UpstreamError>, phase: Phase) -> ErrorCategory {
    let (status, message) = match raw {
        Some(UpstreamError::Unknown) | None => return ErrorCategory::Unknown,
        Some(err) => (err.status(), err.message().to_lowercase()),
    };
    let mentions = |needles: &[&str]| needles.iter().any(|n| message.contains(n));

    if status == Some(401) || mentions(&["authentication", "invalid api key"]) {
        ErrorCategory::Authentication
    } else if status == Some(404) || mentions(&["not found"]) {
        ErrorCategory::NotFound
    } else if status == Some(429) || mentions(&["rate limit"]) {
        ErrorCategory::RateLimit
    } else if mentions(&["network error", "unable to connect"]) {
        ErrorCategory::Network
    } else if mentions(&["timeout", "did not respond in time"]) {
        ErrorCategory::Timeout
    } else {
        match phase {
            Phase::AiGeneration => ErrorCategory::AIProcessing,
            Phase::Validation => ErrorCategory::Validation,
            Phase::ForumFetch => ErrorCategory::Unknown,
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
