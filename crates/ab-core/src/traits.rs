//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Board, Reply, Thread, ThreadPreview};

/// Data persistence contract for boards, threads, and replies.
///
/// Methods that target a single thread or reply report a missing target with
/// `Ok(None)` / `Ok(false)`; `Err` is reserved for storage failures.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BoardRepo: Send + Sync {
    // Board Operations
    async fn list_boards(&self) -> anyhow::Result<Vec<Board>>;

    // Thread Operations
    /// Stores a thread, creating its board on first use.
    async fn create_thread(&self, thread: &Thread) -> anyhow::Result<()>;
    /// The thread record alone, without replies.
    async fn find_thread(&self, id: Uuid) -> anyhow::Result<Option<Thread>>;
    /// The thread with every reply in chronological order.
    async fn get_thread(&self, id: Uuid) -> anyhow::Result<Option<(Thread, Vec<Reply>)>>;
    /// The `thread_limit` most recently bumped threads of `board` (ties by id
    /// ascending), each with its `reply_limit` newest replies in
    /// chronological order.
    async fn list_recent_threads(
        &self,
        board: &str,
        thread_limit: u32,
        reply_limit: u32,
    ) -> anyhow::Result<Vec<ThreadPreview>>;
    /// Removes the thread and all of its replies.
    async fn delete_thread(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn report_thread(&self, id: Uuid) -> anyhow::Result<bool>;

    // Reply Operations
    /// Stores the reply and bumps its thread in one transaction. The reply is
    /// stamped under the write lock, never before the thread's current bump,
    /// and that instant becomes both its `created_on` and the new
    /// `bumped_on`. `None` if the thread does not exist.
    async fn create_reply(&self, reply: &Reply) -> anyhow::Result<Option<DateTime<Utc>>>;
    async fn find_reply(&self, thread_id: Uuid, reply_id: Uuid) -> anyhow::Result<Option<Reply>>;
    /// Replaces the reply text with `marker`, keeping the record in place.
    async fn tombstone_reply(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
        marker: &str,
    ) -> anyhow::Result<bool>;
    async fn report_reply(&self, thread_id: Uuid, reply_id: Uuid) -> anyhow::Result<bool>;
}

/// Delete-key contract. Keys are only ever stored as hashes.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait DeleteKeyHasher: Send + Sync {
    /// Produces a self-describing hash (salt included) for storage.
    fn hash_key(&self, key: &str) -> anyhow::Result<String>;

    /// Checks a candidate key against a stored hash.
    fn verify_key(&self, key: &str, hash: &str) -> bool;
}
