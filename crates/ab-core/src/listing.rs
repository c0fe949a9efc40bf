//! # Board Listing
//!
//! Read-only views over boards and threads. Nothing here mutates storage,
//! and every record is converted to its redacted view before it leaves.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Board, ThreadView};
use crate::traits::BoardRepo;

/// Threads shown on a board page.
pub const DEFAULT_THREAD_LIMIT: u32 = 10;
/// Replies previewed under each thread on a board page.
pub const DEFAULT_REPLY_LIMIT: u32 = 3;

pub struct BoardListing {
    repo: Arc<dyn BoardRepo>,
}

impl BoardListing {
    pub fn new(repo: Arc<dyn BoardRepo>) -> Self {
        Self { repo }
    }

    /// Most recently bumped threads of `board`, newest first, each with its
    /// latest replies in chronological order. Unknown boards are empty.
    pub async fn list_recent_threads(
        &self,
        board: &str,
        thread_limit: u32,
        reply_limit: u32,
    ) -> Result<Vec<ThreadView>> {
        let previews = self
            .repo
            .list_recent_threads(board, thread_limit, reply_limit)
            .await?;

        Ok(previews
            .iter()
            .map(|p| ThreadView::new(&p.thread, &p.replies, p.reply_count))
            .collect())
    }

    /// `list_recent_threads` with the board page limits.
    pub async fn recent_threads(&self, board: &str) -> Result<Vec<ThreadView>> {
        self.list_recent_threads(board, DEFAULT_THREAD_LIMIT, DEFAULT_REPLY_LIMIT)
            .await
    }

    /// A thread with all of its replies.
    pub async fn get_thread(&self, thread_id: Uuid) -> Result<ThreadView> {
        let (thread, replies) = self
            .repo
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::thread_not_found(thread_id))?;

        Ok(ThreadView::new(&thread, &replies, replies.len()))
    }

    /// `get_thread`, but a thread that lives on another board is not found.
    pub async fn get_board_thread(&self, board: &str, thread_id: Uuid) -> Result<ThreadView> {
        let thread = self.get_thread(thread_id).await?;
        if thread.board != board {
            return Err(AppError::thread_not_found(thread_id));
        }
        Ok(thread)
    }

    pub async fn list_boards(&self) -> Result<Vec<Board>> {
        Ok(self.repo.list_boards().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Reply, Thread, ThreadPreview};
    use crate::traits::{MockBoardRepo, MockDeleteKeyHasher};
    use mockall::predicate::eq;

    fn keys() -> MockDeleteKeyHasher {
        let mut keys = MockDeleteKeyHasher::new();
        keys.expect_hash_key().returning(|_: &str| Ok("hash".into()));
        keys
    }

    #[tokio::test]
    async fn recent_threads_uses_board_page_limits() {
        let mut repo = MockBoardRepo::new();
        repo.expect_list_recent_threads()
            .withf(|board: &str, threads: &u32, replies: &u32| {
                board == "general" && *threads == 10 && *replies == 3
            })
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));
        let listing = BoardListing::new(Arc::new(repo));

        assert!(listing.recent_threads("general").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn preview_keeps_total_reply_count() {
        let keys = keys();
        let thread = Thread::create("general", "hello world", "k", &keys).unwrap();
        let reply = Reply::create(thread.id, "latest", "k", &keys).unwrap();
        let preview = ThreadPreview {
            thread,
            replies: vec![reply],
            reply_count: 7,
        };

        let mut repo = MockBoardRepo::new();
        repo.expect_list_recent_threads()
            .returning(move |_, _, _| Ok(vec![preview.clone()]));
        let listing = BoardListing::new(Arc::new(repo));

        let views = listing.list_recent_threads("general", 10, 1).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].replies.len(), 1);
        assert_eq!(views[0].replies[0].text, "latest");
        assert_eq!(views[0].replycount, 7);
    }

    #[tokio::test]
    async fn missing_thread_is_not_found() {
        let id = Uuid::now_v7();
        let mut repo = MockBoardRepo::new();
        repo.expect_get_thread()
            .with(eq(id))
            .returning(|_| Ok(None));
        let listing = BoardListing::new(Arc::new(repo));

        let err = listing.get_thread(id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("thread", _)));
    }

    #[tokio::test]
    async fn board_thread_must_match_its_board() {
        let thread = Thread::create("general", "hello world", "k", &keys()).unwrap();
        let id = thread.id;
        let mut repo = MockBoardRepo::new();
        repo.expect_get_thread()
            .returning(move |_| Ok(Some((thread.clone(), Vec::new()))));
        let listing = BoardListing::new(Arc::new(repo));

        assert_eq!(listing.get_board_thread("general", id).await.unwrap().id, id);
        let err = listing.get_board_thread("other", id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("thread", _)));
    }
}
