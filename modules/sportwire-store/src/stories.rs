use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::Result;
use crate::fingerprints::FingerprintRow;

#[derive(Clone)]
pub struct StoryStore {
    pool: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoryRow {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DigestCandidateRow {
    pub story_id: i64,
    pub title: String,
    pub article_count: i64,
    pub max_published_at: Option<DateTime<Utc>>,
    pub has_tournament: bool,
    pub team_count: i64,
    pub has_player: bool,
}

impl StoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, title: &str) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO stories (title) VALUES ($1) RETURNING id",
        )
        .bind(title)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> Result<Option<StoryRow>> {
        let row = sqlx::query_as::<_, StoryRow>("SELECT * FROM stories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn updated_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<StoryRow>> {
        let rows = sqlx::query_as::<_, StoryRow>(
            "SELECT * FROM stories WHERE updated_at >= $1 ORDER BY updated_at DESC",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// `(story_id, news_id)` membership, ignoring the uniqueness conflict.
    /// Returns `true` if this link is new, in which case `updated_at` is
    /// bumped (spec.md §4.6).
    pub async fn attach_article(&self, story_id: i64, news_id: i64) -> Result<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO story_articles (story_id, news_id)
            VALUES ($1, $2)
            ON CONFLICT (story_id, news_id) DO NOTHING
            "#,
        )
        .bind(story_id)
        .bind(news_id)
        .execute(&self.pool)
        .await?
        .rows_affected()
            > 0;

        if inserted {
            sqlx::query("UPDATE stories SET updated_at = now() WHERE id = $1")
                .bind(story_id)
                .execute(&self.pool)
                .await?;
        }

        Ok(inserted)
    }

    pub async fn members(&self, story_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT news_id FROM story_articles WHERE story_id = $1 ORDER BY news_id ASC",
        )
        .bind(story_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Existing story membership for a batch of articles, as `(news_id, story_id)`.
    pub async fn story_ids_for_articles(&self, news_ids: &[i64]) -> Result<Vec<(i64, i64)>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT news_id, story_id FROM story_articles WHERE news_id = ANY($1)",
        )
        .bind(news_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Per-story aggregates feeding the digest scorer (spec.md §4.12):
    /// article count, most recent `published_at`, and the entity-weight
    /// inputs (tournament presence, distinct team count, player presence).
    pub async fn digest_candidates(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<DigestCandidateRow>> {
        let rows = sqlx::query_as::<_, DigestCandidateRow>(
            r#"
            SELECT
                s.id AS story_id,
                s.title AS title,
                count(DISTINCT sa.news_id) AS article_count,
                max(n.published_at) AS max_published_at,
                bool_or(nea.tournament_id IS NOT NULL) AS has_tournament,
                count(DISTINCT nea.team_id) FILTER (WHERE nea.team_id IS NOT NULL) AS team_count,
                bool_or(nea.player_id IS NOT NULL) AS has_player
            FROM stories s
            JOIN story_articles sa ON sa.story_id = s.id
            JOIN news n ON n.id = sa.news_id
            LEFT JOIN news_entity_assignments nea ON nea.news_id = sa.news_id
            WHERE s.updated_at >= $1 AND s.updated_at < $2
            GROUP BY s.id, s.title
            "#,
        )
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Fingerprints of every article belonging to stories updated since
    /// `cutoff`, for the near-dup-story index (spec.md §4.6).
    pub async fn fingerprints_for_stories_updated_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<(i64, FingerprintRow)>> {
        let rows: Vec<(i64, i64, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT sa.story_id, cf.news_id, cf.title_sig, cf.entity_sig
            FROM story_articles sa
            JOIN stories s ON s.id = sa.story_id
            JOIN content_fingerprints cf ON cf.news_id = sa.news_id
            WHERE s.updated_at >= $1
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(story_id, news_id, title_sig, entity_sig)| {
                (
                    story_id,
                    FingerprintRow {
                        news_id,
                        title_sig,
                        entity_sig,
                    },
                )
            })
            .collect())
    }
}
