use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::Result;

#[derive(Clone)]
pub struct DigestStore {
    pool: PgPool,
}

pub struct DigestItem {
    pub rank: i32,
    pub story_id: i64,
    pub score: f64,
}

impl DigestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a digest and its ranked items in one transaction.
    pub async fn save(
        &self,
        period: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        items: &[DigestItem],
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let digest_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO digests (period, window_start, window_end)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(period)
        .bind(window_start)
        .bind(window_end)
        .fetch_one(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO digest_items (digest_id, rank, story_id, score)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(digest_id)
            .bind(item.rank)
            .bind(item.story_id)
            .bind(item.score)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(digest_id)
    }
}
