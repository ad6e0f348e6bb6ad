//! Forum thread and post data as supplied by a [`ThreadDataProvider`](crate::ThreadDataProvider).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A forum thread (the opening post plus its metadata).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Username of the thread author, when the forum exposes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Thread {
    /// Create a thread with an empty title and no author.
    pub fn new(id: impl Into<String>, body: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            body: body.into(),
            author: None,
            created_at,
        }
    }

    /// Set the thread title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the thread author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// A reply within a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(id: impl Into<String>, body: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            author: None,
            created_at,
        }
    }

    /// Set the post author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// A thread together with all of its posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadData {
    pub thread: Thread,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl ThreadData {
    pub fn new(thread: Thread, posts: Vec<Post>) -> Self {
        Self { thread, posts }
    }
}
