//! Post table rows, comments, and the nested thread view

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of the flattened, time-ordered post table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRow {
    /// `P1..Pn` in `scheduled_at` order across the whole campaign
    pub post_id: String,
    pub persona: String,
    pub channel: String,
    pub title: String,
    pub body: Option<String>,
    pub keyword_ids: Vec<String>,
    pub scheduled_at: NaiveDateTime,
}

/// A synthetic comment attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// `C1..` incrementing across the whole run
    pub comment_id: String,
    pub post_id: String,
    /// None for top-level comments
    pub parent_comment_id: Option<String>,
    pub username: String,
    pub timestamp: NaiveDateTime,
    pub title: String,
    pub channel: String,
}

/// A post with its comments attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    #[serde(flatten)]
    pub post: PostRow,
    /// Ordered by (timestamp, comment id)
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadCounts {
    pub posts: usize,
    pub comments: usize,
}

/// Nested export: every post with its comment thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadView {
    pub posts: Vec<Thread>,
    pub counts: ThreadCounts,
    pub fingerprint: String,
}
