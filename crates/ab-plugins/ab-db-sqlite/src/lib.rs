//! # ab-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `ab-core` domain models. Replies reference their thread by foreign
//! key; threads reference their board by name.

use std::str::FromStr;
use std::time::Duration;

use ab_core::models::{Board, Reply, Thread, ThreadPreview};
use ab_core::traits::BoardRepo;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

#[derive(Clone)]
pub struct SqliteBoardRepo {
    pool: SqlitePool,
}

// Helper for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> sqlx::Result<Uuid> {
    Uuid::from_slice(blob).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn thread_from_row(row: &SqliteRow) -> sqlx::Result<Thread> {
    Ok(Thread {
        id: blob_to_uuid(&row.try_get::<Vec<u8>, _>("id")?)?,
        board: row.try_get("board")?,
        text: row.try_get("text")?,
        created_on: row.try_get("created_on")?,
        bumped_on: row.try_get("bumped_on")?,
        delete_key_hash: row.try_get("delete_key_hash")?,
        reported: row.try_get("reported")?,
    })
}

fn reply_from_row(row: &SqliteRow) -> sqlx::Result<Reply> {
    Ok(Reply {
        id: blob_to_uuid(&row.try_get::<Vec<u8>, _>("id")?)?,
        thread_id: blob_to_uuid(&row.try_get::<Vec<u8>, _>("thread_id")?)?,
        text: row.try_get("text")?,
        created_on: row.try_get("created_on")?,
        delete_key_hash: row.try_get("delete_key_hash")?,
        reported: row.try_get("reported")?,
    })
}

impl SqliteBoardRepo {
    /// Opens the database with default pool settings.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        Self::connect(url, 5, Duration::from_secs(5)).await
    }

    /// Opens (creating if missing) the database at `url` and applies the
    /// embedded migrations.
    pub async fn connect(url: &str, max_connections: u32, acquire_timeout: Duration) -> anyhow::Result<Self> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_options = SqlitePoolOptions::new().acquire_timeout(acquire_timeout);
        let pool_options = if in_memory {
            // Every connection to `:memory:` is a separate database, so keep
            // exactly one alive for the lifetime of the pool.
            pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("SQLite board repository ready at {url}");
        Ok(Self { pool })
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("SQLite board repository closed");
    }
}

#[async_trait]
impl BoardRepo for SqliteBoardRepo {
    async fn list_boards(&self) -> anyhow::Result<Vec<Board>> {
        let rows = sqlx::query(
            "SELECT b.name, b.created_on, COUNT(t.id) AS thread_count
             FROM boards b LEFT JOIN threads t ON t.board = b.name
             GROUP BY b.name, b.created_on
             ORDER BY b.name",
        )
        .fetch_all(&self.pool)
        .await?;

        let boards = rows
            .iter()
            .map(|row| -> sqlx::Result<Board> {
                Ok(Board {
                    name: row.try_get("name")?,
                    created_on: row.try_get("created_on")?,
                    thread_count: row.try_get("thread_count")?,
                })
            })
            .collect::<sqlx::Result<Vec<_>>>()?;
        Ok(boards)
    }

    /// Registers the board on first use, then inserts the thread.
    async fn create_thread(&self, thread: &Thread) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO boards (name, created_on) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(&thread.board)
            .bind(thread.created_on)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO threads (id, board, text, created_on, bumped_on, delete_key_hash, reported)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(thread.id))
        .bind(&thread.board)
        .bind(&thread.text)
        .bind(thread.created_on)
        .bind(thread.bumped_on)
        .bind(&thread.delete_key_hash)
        .bind(thread.reported)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("inserted thread {}", thread.id);
        Ok(())
    }

    async fn find_thread(&self, id: Uuid) -> anyhow::Result<Option<Thread>> {
        let row = sqlx::query("SELECT * FROM threads WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(thread_from_row).transpose()?)
    }

    /// Retrieves a thread and all its replies from one read snapshot.
    async fn get_thread(&self, id: Uuid) -> anyhow::Result<Option<(Thread, Vec<Reply>)>> {
        let mut tx = self.pool.begin().await?;

        let thread = match sqlx::query("SELECT * FROM threads WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&mut *tx)
            .await?
        {
            Some(row) => thread_from_row(&row)?,
            None => return Ok(None),
        };

        let replies = sqlx::query(
            "SELECT * FROM replies WHERE thread_id = ? ORDER BY created_on ASC, id ASC",
        )
        .bind(uuid_to_blob(id))
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(reply_from_row)
        .collect::<sqlx::Result<Vec<_>>>()?;

        tx.commit().await?;
        Ok(Some((thread, replies)))
    }

    async fn list_recent_threads(
        &self,
        board: &str,
        thread_limit: u32,
        reply_limit: u32,
    ) -> anyhow::Result<Vec<ThreadPreview>> {
        let mut tx = self.pool.begin().await?;

        let threads = sqlx::query(
            "SELECT * FROM threads WHERE board = ? ORDER BY bumped_on DESC, id ASC LIMIT ?",
        )
        .bind(board)
        .bind(i64::from(thread_limit))
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(thread_from_row)
        .collect::<sqlx::Result<Vec<_>>>()?;

        let mut previews = Vec::with_capacity(threads.len());
        for thread in threads {
            let reply_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM replies WHERE thread_id = ?")
                .bind(uuid_to_blob(thread.id))
                .fetch_one(&mut *tx)
                .await?;

            // Newest first from SQL, flipped back to reading order.
            let mut replies = sqlx::query(
                "SELECT * FROM replies WHERE thread_id = ? ORDER BY created_on DESC, id DESC LIMIT ?",
            )
            .bind(uuid_to_blob(thread.id))
            .bind(i64::from(reply_limit))
            .fetch_all(&mut *tx)
            .await?
            .iter()
            .map(reply_from_row)
            .collect::<sqlx::Result<Vec<_>>>()?;
            replies.reverse();

            previews.push(ThreadPreview {
                thread,
                replies,
                reply_count: usize::try_from(reply_count).unwrap_or_default(),
            });
        }

        tx.commit().await?;
        Ok(previews)
    }

    /// Cascades explicitly so the result does not depend on the
    /// connection's foreign-key pragma.
    async fn delete_thread(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM replies WHERE thread_id = ?")
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM threads WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        debug!("deleted thread {id}: {deleted} row(s)");
        Ok(deleted > 0)
    }

    async fn report_thread(&self, id: Uuid) -> anyhow::Result<bool> {
        let updated = sqlx::query("UPDATE threads SET reported = ? WHERE id = ?")
            .bind(true)
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(updated > 0)
    }

    /// The no-op bump takes the write lock before the clock is read, so
    /// replies to one thread are stamped in commit order. A missing thread
    /// aborts the transaction without touching `replies`.
    async fn create_reply(&self, reply: &Reply) -> anyhow::Result<Option<DateTime<Utc>>> {
        let mut tx = self.pool.begin().await?;

        let last_bump = sqlx::query_scalar::<_, DateTime<Utc>>(
            "UPDATE threads SET bumped_on = bumped_on WHERE id = ? RETURNING bumped_on",
        )
        .bind(uuid_to_blob(reply.thread_id))
        .fetch_optional(&mut *tx)
        .await?;
        let Some(last_bump) = last_bump else {
            tx.rollback().await?;
            return Ok(None);
        };

        let stamped_on = Utc::now().max(last_bump);

        sqlx::query("UPDATE threads SET bumped_on = ? WHERE id = ?")
            .bind(stamped_on)
            .bind(uuid_to_blob(reply.thread_id))
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO replies (id, thread_id, text, created_on, delete_key_hash, reported)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(reply.id))
        .bind(uuid_to_blob(reply.thread_id))
        .bind(&reply.text)
        .bind(stamped_on)
        .bind(&reply.delete_key_hash)
        .bind(reply.reported)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("inserted reply {} into thread {} at {stamped_on}", reply.id, reply.thread_id);
        Ok(Some(stamped_on))
    }

    async fn find_reply(&self, thread_id: Uuid, reply_id: Uuid) -> anyhow::Result<Option<Reply>> {
        let row = sqlx::query("SELECT * FROM replies WHERE id = ? AND thread_id = ?")
            .bind(uuid_to_blob(reply_id))
            .bind(uuid_to_blob(thread_id))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(reply_from_row).transpose()?)
    }

    async fn tombstone_reply(&self, thread_id: Uuid, reply_id: Uuid, marker: &str) -> anyhow::Result<bool> {
        let updated = sqlx::query("UPDATE replies SET text = ? WHERE id = ? AND thread_id = ?")
            .bind(marker)
            .bind(uuid_to_blob(reply_id))
            .bind(uuid_to_blob(thread_id))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(updated > 0)
    }

    async fn report_reply(&self, thread_id: Uuid, reply_id: Uuid) -> anyhow::Result<bool> {
        let updated = sqlx::query("UPDATE replies SET reported = ? WHERE id = ? AND thread_id = ?")
            .bind(true)
            .bind(uuid_to_blob(reply_id))
            .bind(uuid_to_blob(thread_id))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(updated > 0)
    }
}
