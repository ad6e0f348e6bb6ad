//! Summary payload types.
//!
//! [`SummaryData`] is what the cache stores and what callers serialise to
//! their transport. Field names serialise in camelCase to match the JSON
//! shape the front-end consumes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{HuginnError, Result};

/// Overall tone of a discussion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Mixed,
    Negative,
    /// Nobody has replied yet.
    #[serde(rename = "No Discussion")]
    NoDiscussion,
}

/// Categorical companion to [`HealthScore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthLabel {
    Healthy,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
    #[serde(rename = "Heated Discussion")]
    HeatedDiscussion,
    #[serde(rename = "New Thread")]
    NewThread,
}

/// Discussion health on a 1–10 scale.
///
/// Construction validates the range, so a `HealthScore` in hand is always
/// within bounds. Deserialisation goes through the same check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HealthScore(u8);

impl HealthScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Score used by every fallback payload.
    pub const NEUTRAL: HealthScore = HealthScore(5);

    /// Create a score, rejecting values outside `1..=10`.
    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(HuginnError::InvalidInput(format!(
                "health score {value} outside {}..={}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for HealthScore {
    type Error = HuginnError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<HealthScore> for u8 {
    fn from(score: HealthScore) -> u8 {
        score.0
    }
}

impl fmt::Display for HealthScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

/// A participant and what they brought to the discussion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub username: String,
    pub contribution: String,
}

impl Contributor {
    pub fn new(username: impl Into<String>, contribution: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            contribution: contribution.into(),
        }
    }
}

/// A complete thread summary, as produced by a
/// [`Summarizer`](crate::Summarizer) or a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryData {
    pub summary: Vec<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
    pub sentiment: Sentiment,
    pub health_score: HealthScore,
    pub health_label: HealthLabel,
}

/// Side statistics returned alongside a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadStats {
    pub post_count: usize,
    pub contributor_count: usize,
    pub created_at: DateTime<Utc>,
}
