//! # Thread Lifecycle
//!
//! Every write path of a board: posting threads and replies, delete-key
//! checked deletes and anonymous reports. Each operation touches a single
//! thread (and its replies) and round-trips to the repository.

use std::sync::Arc;

use log::{info, warn};
use tokio::task;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Reply, ReplyView, Thread, ThreadView, TOMBSTONE};
use crate::traits::{BoardRepo, DeleteKeyHasher};

pub struct ThreadLifecycle {
    repo: Arc<dyn BoardRepo>,
    keys: Arc<dyn DeleteKeyHasher>,
}

/// Runs Argon2 work on the blocking pool so it never stalls an async worker.
async fn off_worker<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("delete key task failed: {e}")))?
}

impl ThreadLifecycle {
    pub fn new(repo: Arc<dyn BoardRepo>, keys: Arc<dyn DeleteKeyHasher>) -> Self {
        Self { repo, keys }
    }

    async fn key_matches(&self, delete_key: &str, hash: String) -> Result<bool> {
        let keys = Arc::clone(&self.keys);
        let delete_key = delete_key.to_owned();
        off_worker(move || Ok(keys.verify_key(&delete_key, &hash))).await
    }

    /// Opens a thread on `board`. The returned view has no replies yet.
    pub async fn post_thread(&self, board: &str, text: &str, delete_key: &str) -> Result<ThreadView> {
        let keys = Arc::clone(&self.keys);
        let (board, text, delete_key) = (board.to_owned(), text.to_owned(), delete_key.to_owned());
        let thread =
            off_worker(move || Thread::create(&board, &text, &delete_key, keys.as_ref())).await?;
        self.repo.create_thread(&thread).await?;

        info!("thread {} posted on /{}/", thread.id, thread.board);
        Ok(ThreadView::new(&thread, &[], 0))
    }

    /// Adds a reply and bumps the thread to the reply's creation time.
    pub async fn post_reply(&self, thread_id: Uuid, text: &str, delete_key: &str) -> Result<ReplyView> {
        let keys = Arc::clone(&self.keys);
        let (text, delete_key) = (text.to_owned(), delete_key.to_owned());
        let mut reply =
            off_worker(move || Reply::create(thread_id, &text, &delete_key, keys.as_ref())).await?;

        reply.created_on = self
            .repo
            .create_reply(&reply)
            .await?
            .ok_or_else(|| AppError::thread_not_found(thread_id))?;

        info!("reply {} posted to thread {}", reply.id, thread_id);
        Ok(ReplyView::from(&reply))
    }

    /// Removes a thread and its replies if `delete_key` matches.
    pub async fn delete_thread(&self, thread_id: Uuid, delete_key: &str) -> Result<()> {
        let thread = self
            .repo
            .find_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::thread_not_found(thread_id))?;

        if !self.key_matches(delete_key, thread.delete_key_hash.clone()).await? {
            warn!("refused delete of thread {thread_id}: key mismatch");
            return Err(AppError::Unauthorized("delete key mismatch".into()));
        }

        // A concurrent delete may have won the race since the lookup.
        if !self.repo.delete_thread(thread_id).await? {
            return Err(AppError::thread_not_found(thread_id));
        }

        info!("thread {} deleted from /{}/", thread_id, thread.board);
        Ok(())
    }

    /// Tombstones a reply if `delete_key` matches. The reply keeps its place
    /// in the thread.
    pub async fn delete_reply(&self, thread_id: Uuid, reply_id: Uuid, delete_key: &str) -> Result<()> {
        let reply = self
            .repo
            .find_reply(thread_id, reply_id)
            .await?
            .ok_or_else(|| AppError::reply_not_found(reply_id))?;

        if !self.key_matches(delete_key, reply.delete_key_hash.clone()).await? {
            warn!("refused delete of reply {reply_id}: key mismatch");
            return Err(AppError::Unauthorized("delete key mismatch".into()));
        }

        if !self.repo.tombstone_reply(thread_id, reply_id, TOMBSTONE).await? {
            return Err(AppError::reply_not_found(reply_id));
        }

        info!("reply {reply_id} in thread {thread_id} deleted");
        Ok(())
    }

    /// Flags a thread for moderators. Reporting twice is not an error.
    pub async fn report_thread(&self, thread_id: Uuid) -> Result<()> {
        if !self.repo.report_thread(thread_id).await? {
            return Err(AppError::thread_not_found(thread_id));
        }
        info!("thread {thread_id} reported");
        Ok(())
    }

    pub async fn report_reply(&self, thread_id: Uuid, reply_id: Uuid) -> Result<()> {
        if !self.repo.report_reply(thread_id, reply_id).await? {
            return Err(AppError::reply_not_found(reply_id));
        }
        info!("reply {reply_id} in thread {thread_id} reported");
        Ok(())
    }
}
