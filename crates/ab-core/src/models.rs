//! # Domain Models
//!
//! Records as they are persisted, and the redacted views handed to readers.
//! We use UUID v7 so identifier order follows creation order.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::traits::DeleteKeyHasher;

/// Body of a reply after its author deleted it.
pub const TOMBSTONE: &str = "[deleted]";

/// A named collection of threads (e.g., "general").
/// Boards come into existence with their first thread.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Board {
    /// Case-sensitive, unique
    pub name: String,
    pub created_on: DateTime<Utc>,
    pub thread_count: i64,
}

/// A top-level anonymous post.
#[derive(Debug, Clone)]
pub struct Thread {
    pub id: Uuid,
    pub board: String,
    pub text: String,
    pub created_on: DateTime<Utc>,
    /// The timestamp used for sorting threads by activity
    pub bumped_on: DateTime<Utc>,
    /// PHC string produced by a `DeleteKeyHasher`; never leaves the core
    pub delete_key_hash: String,
    pub reported: bool,
}

impl Thread {
    /// Builds a new thread with `created_on == bumped_on == now`.
    pub fn create(
        board: &str,
        text: &str,
        delete_key: &str,
        keys: &dyn DeleteKeyHasher,
    ) -> Result<Self> {
        require("board", board)?;
        require("text", text)?;
        require("delete_password", delete_key)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(),
            board: board.to_owned(),
            text: text.to_owned(),
            created_on: now,
            bumped_on: now,
            delete_key_hash: hash_key(keys, delete_key)?,
            reported: false,
        })
    }
}

/// A response nested under exactly one thread.
#[derive(Debug, Clone)]
pub struct Reply {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub delete_key_hash: String,
    pub reported: bool,
}

impl Reply {
    /// Builds a reply for `thread_id`. Whether the thread exists is decided
    /// by the repository when the reply is stored, and so is the final
    /// `created_on`.
    pub fn create(
        thread_id: Uuid,
        text: &str,
        delete_key: &str,
        keys: &dyn DeleteKeyHasher,
    ) -> Result<Self> {
        require("text", text)?;
        require("delete_password", delete_key)?;

        Ok(Self {
            id: Uuid::now_v7(),
            thread_id,
            text: text.to_owned(),
            created_on: Utc::now(),
            delete_key_hash: hash_key(keys, delete_key)?,
            reported: false,
        })
    }
}

/// A thread as shown on a board page: its newest replies plus the total count.
#[derive(Debug, Clone)]
pub struct ThreadPreview {
    pub thread: Thread,
    /// Chronological order
    pub replies: Vec<Reply>,
    pub reply_count: usize,
}

/// Public shape of a reply. Delete key and reported flag are stripped.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReplyView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
}

impl From<&Reply> for ReplyView {
    fn from(reply: &Reply) -> Self {
        Self {
            id: reply.id,
            text: reply.text.clone(),
            created_on: reply.created_on,
        }
    }
}

/// Public shape of a thread, used both for board listings (truncated
/// replies) and for the full thread view.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ThreadView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub board: String,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub bumped_on: DateTime<Utc>,
    pub replies: Vec<ReplyView>,
    pub replycount: usize,
}

impl ThreadView {
    pub fn new(thread: &Thread, replies: &[Reply], replycount: usize) -> Self {
        Self {
            id: thread.id,
            board: thread.board.clone(),
            text: thread.text.clone(),
            created_on: thread.created_on,
            bumped_on: thread.bumped_on,
            replies: replies.iter().map(ReplyView::from).collect(),
            replycount,
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(())
}

fn hash_key(keys: &dyn DeleteKeyHasher, delete_key: &str) -> Result<String> {
    keys.hash_key(delete_key)
        .map_err(|e| AppError::Internal(format!("delete key hashing failed: {e:#}")))
}
