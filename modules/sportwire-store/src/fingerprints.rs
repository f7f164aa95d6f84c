use sqlx::PgPool;

use crate::error::Result;

#[derive(Clone)]
pub struct FingerprintStore {
    pool: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FingerprintRow {
    pub news_id: i64,
    pub title_sig: String,
    pub entity_sig: Option<String>,
}

impl FingerprintStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserted, never deleted (spec.md §3).
    pub async fn upsert(&self, news_id: i64, title_sig: &str, entity_sig: Option<&str>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO content_fingerprints (news_id, title_sig, entity_sig)
            VALUES ($1, $2, $3)
            ON CONFLICT (news_id) DO UPDATE SET
                title_sig = EXCLUDED.title_sig,
                entity_sig = EXCLUDED.entity_sig
            "#,
        )
        .bind(news_id)
        .bind(title_sig)
        .bind(entity_sig)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, news_id: i64) -> Result<Option<FingerprintRow>> {
        let row = sqlx::query_as::<_, FingerprintRow>(
            "SELECT * FROM content_fingerprints WHERE news_id = $1",
        )
        .bind(news_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn for_news_ids(&self, news_ids: &[i64]) -> Result<Vec<FingerprintRow>> {
        let rows = sqlx::query_as::<_, FingerprintRow>(
            "SELECT * FROM content_fingerprints WHERE news_id = ANY($1)",
        )
        .bind(news_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
