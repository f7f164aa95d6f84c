use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sportwire_common::types::{ItemType, QueueStatus};

use crate::error::Result;

#[derive(Clone)]
pub struct PublishMapStore {
    pool: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PublishMapRow {
    pub item_type: String,
    pub item_id: i64,
    pub message_id: i64,
    pub text: String,
    pub mode: String,
    pub sent_at: DateTime<Utc>,
}

impl PublishMapStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, item_type: ItemType, item_id: i64) -> Result<Option<PublishMapRow>> {
        let row = sqlx::query_as::<_, PublishMapRow>(
            "SELECT * FROM publish_map WHERE item_type = $1 AND item_id = $2",
        )
        .bind(item_type.to_string())
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// First publish of an item. Overwritten in place on edit (spec.md §3:
    /// edits never change `message_id`).
    pub async fn upsert(
        &self,
        item_type: ItemType,
        item_id: i64,
        message_id: i64,
        text: &str,
        mode: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO publish_map (item_type, item_id, message_id, text, mode)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (item_type, item_id) DO UPDATE SET
                text = EXCLUDED.text,
                mode = EXCLUDED.mode
            "#,
        )
        .bind(item_type.to_string())
        .bind(item_id)
        .bind(message_id)
        .bind(text)
        .bind(mode)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Overwrite stored text/mode only, never `message_id` (edit path).
    pub async fn update_text(&self, item_type: ItemType, item_id: i64, text: &str, mode: &str) -> Result<()> {
        sqlx::query(
            "UPDATE publish_map SET text = $3, mode = $4 WHERE item_type = $1 AND item_id = $2",
        )
        .bind(item_type.to_string())
        .bind(item_id)
        .bind(text)
        .bind(mode)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PublishQueueStore {
    pool: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PublishQueueRow {
    pub id: i64,
    pub item_type: String,
    pub item_id: i64,
    pub priority: i32,
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub enqueued_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub message_id: Option<i64>,
    pub error: Option<String>,
    pub dedup_key: String,
}

impl PublishQueueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// True if a queue row with `dedup_key` was last active (sent or
    /// enqueued) within `since` (spec.md §4.9 `enqueue_recent_stories`).
    pub async fn has_recent_dedup_match(&self, dedup_key: &str, since: DateTime<Utc>) -> Result<bool> {
        let hit = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM publish_queue
                WHERE dedup_key = $1
                  AND COALESCE(sent_at, enqueued_at) >= $2
            )
            "#,
        )
        .bind(dedup_key)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(hit)
    }

    pub async fn insert(
        &self,
        item_type: ItemType,
        item_id: i64,
        priority: i32,
        scheduled_at: Option<DateTime<Utc>>,
        dedup_key: &str,
    ) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO publish_queue (item_type, item_id, priority, status, scheduled_at, dedup_key)
            VALUES ($1, $2, $3, 'queued', $4, $5)
            RETURNING id
            "#,
        )
        .bind(item_type.to_string())
        .bind(item_id)
        .bind(priority)
        .bind(scheduled_at)
        .bind(dedup_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Next ready row: queued, due, ordered by priority desc then FIFO.
    pub async fn select_next_ready(&self, now: DateTime<Utc>) -> Result<Option<PublishQueueRow>> {
        let row = sqlx::query_as::<_, PublishQueueRow>(
            r#"
            SELECT * FROM publish_queue
            WHERE status = 'queued'
              AND (scheduled_at IS NULL OR scheduled_at <= $1)
            ORDER BY priority DESC, enqueued_at ASC
            LIMIT 1
            "#,
        )
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Count of rows that reached `sent` with `sent_at >= since` (rate-limit
    /// gate; only successfully sent rows count, per spec.md §3 invariant).
    pub async fn count_sent_since(&self, since: DateTime<Utc>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT count(*) FROM publish_queue WHERE status = 'sent' AND sent_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn last_sent_at(&self) -> Result<Option<DateTime<Utc>>> {
        let ts = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            "SELECT max(sent_at) FROM publish_queue WHERE status = 'sent'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(ts)
    }

    pub async fn mark_sent(&self, id: i64, message_id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE publish_queue SET status = 'sent', sent_at = now(), message_id = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(message_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn mark_error(&self, id: i64, error: &str) -> Result<()> {
        sqlx::query("UPDATE publish_queue SET status = 'error', error = $2 WHERE id = $1")
            .bind(id)
            .bind(error)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Most recent successfully-sent row's `message_id` for an item, used as
    /// the edit/append protocol's fallback when `publish_map` has no row
    /// for it yet (supplement per original `bot/edit.py`'s two-path lookup).
    pub async fn latest_sent_message_id(&self, item_type: ItemType, item_id: i64) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, Option<i64>>(
            r#"
            SELECT message_id FROM publish_queue
            WHERE item_type = $1 AND item_id = $2 AND status = 'sent'
            ORDER BY sent_at DESC
            LIMIT 1
            "#,
        )
        .bind(item_type.to_string())
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?
        .flatten();
        Ok(id)
    }

    pub async fn depth(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT count(*) FROM publish_queue WHERE status = 'queued'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

impl PublishQueueRow {
    pub fn status(&self) -> QueueStatus {
        self.status.parse().unwrap_or(QueueStatus::Queued)
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type.parse().unwrap_or(ItemType::Story)
    }
}

#[derive(Clone)]
pub struct PublishEditStore {
    pool: PgPool,
}

impl PublishEditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `reply_message_id` is the message id of the reply-thread post created
    /// by a successful `append` (spec.md §4.11: "record the new reply-message
    /// id in `publish_edits`"); `None` for the `edit` action and for any
    /// action that failed before a message was sent.
    #[allow(clippy::too_many_arguments)]
    pub async fn append(
        &self,
        item_type: ItemType,
        item_id: i64,
        action: &str,
        old_text: Option<&str>,
        new_text: Option<&str>,
        mode: Option<&str>,
        error: Option<&str>,
        reply_message_id: Option<i64>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO publish_edits (item_type, item_id, action, old_text, new_text, mode, error, reply_message_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(item_type.to_string())
        .bind(item_id)
        .bind(action)
        .bind(old_text)
        .bind(new_text)
        .bind(mode)
        .bind(error)
        .bind(reply_message_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent `append` text for an item, used to warn on a no-op append.
    pub async fn latest_append_text(&self, item_type: ItemType, item_id: i64) -> Result<Option<String>> {
        let text = sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT new_text FROM publish_edits
            WHERE item_type = $1 AND item_id = $2 AND action = 'append' AND error IS NULL
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(item_type.to_string())
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?
        .flatten();
        Ok(text)
    }
}
