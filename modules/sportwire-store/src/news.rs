use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::Result;

#[derive(Clone)]
pub struct NewsStore {
    pool: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NewsRow {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub ingested_at: DateTime<Utc>,
    pub source: String,
    pub lang: String,
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
}

/// Fields accepted on first ingest or re-crawl of an already-known URL.
pub struct NewsUpsert {
    pub url: String,
    pub title: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
    pub lang: String,
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
}

impl NewsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new article, or on a re-crawl of the same canonical URL,
    /// refresh title/body/published_at in place (spec.md §3: articles are
    /// never deleted and created exactly once per URL).
    pub async fn upsert_by_url(&self, a: NewsUpsert) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO news (url, title, body, published_at, source, lang, image_urls, video_urls)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (url) DO UPDATE SET
                title = EXCLUDED.title,
                body = EXCLUDED.body,
                published_at = EXCLUDED.published_at
            RETURNING id
            "#,
        )
        .bind(&a.url)
        .bind(&a.title)
        .bind(&a.body)
        .bind(a.published_at)
        .bind(&a.source)
        .bind(&a.lang)
        .bind(&a.image_urls)
        .bind(&a.video_urls)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn get(&self, id: i64) -> Result<Option<NewsRow>> {
        let row = sqlx::query_as::<_, NewsRow>("SELECT * FROM news WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_by_url(&self, url: &str) -> Result<Option<NewsRow>> {
        let row = sqlx::query_as::<_, NewsRow>("SELECT * FROM news WHERE url = $1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Articles with event time at or after `cutoff`, newest first, capped
    /// at `limit` (clustering engine input, spec.md §4.6 step 1).
    pub async fn recent_since(&self, cutoff: DateTime<Utc>, limit: i64) -> Result<Vec<NewsRow>> {
        let rows = sqlx::query_as::<_, NewsRow>(
            r#"
            SELECT * FROM news
            WHERE published_at >= $1
            ORDER BY published_at DESC
            LIMIT $2
            "#,
        )
        .bind(cutoff)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Count of articles ingested since `since` (admin metric).
    pub async fn count_ingested_since(&self, since: DateTime<Utc>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT count(*) FROM news WHERE ingested_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
