use sqlx::PgPool;
use sportwire_common::types::TagType;
use tracing::warn;

use crate::error::Result;

#[derive(Clone)]
pub struct TagStore {
    pool: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TagRow {
    pub id: i64,
    pub name: String,
    pub name_normalized: String,
    pub url: Option<String>,
    pub tag_type: String,
}

pub struct UpsertedTag {
    pub id: i64,
    pub created: bool,
}

impl TagStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<TagRow>> {
        let row = sqlx::query_as::<_, TagRow>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn by_url(&self, url: &str) -> Result<Option<TagRow>> {
        let row = sqlx::query_as::<_, TagRow>("SELECT * FROM tags WHERE url = $1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn by_name_normalized(&self, name_normalized: &str) -> Result<Option<TagRow>> {
        let row = sqlx::query_as::<_, TagRow>(
            "SELECT * FROM tags WHERE name_normalized = $1 LIMIT 1",
        )
        .bind(name_normalized)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, name: &str, name_normalized: &str, url: Option<&str>, ty: TagType) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO tags (name, name_normalized, url, tag_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(name_normalized)
        .bind(url)
        .bind(ty.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn fill_and_upgrade(
        &self,
        existing: &TagRow,
        name: &str,
        ty: TagType,
    ) -> Result<()> {
        let existing_ty: TagType = existing.tag_type.parse().unwrap_or(TagType::Unknown);
        let should_upgrade = existing_ty == TagType::Unknown && ty != TagType::Unknown;
        let should_fill_name = existing.name.trim().is_empty() && !name.trim().is_empty();

        if !should_upgrade && !should_fill_name {
            return Ok(());
        }

        if should_upgrade {
            warn!(tag_id = existing.id, from = %existing_ty, to = %ty, "upgrading tag type");
        }

        sqlx::query(
            r#"
            UPDATE tags SET
                name = CASE WHEN $2 THEN $3 ELSE name END,
                tag_type = CASE WHEN $4 THEN $5 ELSE tag_type END
            WHERE id = $1
            "#,
        )
        .bind(existing.id)
        .bind(should_fill_name)
        .bind(name)
        .bind(should_upgrade)
        .bind(ty.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Tag identity resolution per spec.md §4.3: URL match first, then
    /// case-insensitive normalized-name match, else insert. Type upgrades
    /// only ever move away from `unknown`; a typed tag keeps its type.
    pub async fn upsert_tag(
        &self,
        name: &str,
        url: Option<&str>,
        name_normalized: &str,
        ty: TagType,
    ) -> Result<UpsertedTag> {
        if let Some(u) = url {
            if let Some(existing) = self.by_url(u).await? {
                self.fill_and_upgrade(&existing, name, ty).await?;
                return Ok(UpsertedTag {
                    id: existing.id,
                    created: false,
                });
            }
        }

        if let Some(existing) = self.by_name_normalized(name_normalized).await? {
            self.fill_and_upgrade(&existing, name, ty).await?;
            return Ok(UpsertedTag {
                id: existing.id,
                created: false,
            });
        }

        let id = self.insert(name, name_normalized, url, ty).await?;
        Ok(UpsertedTag { id, created: true })
    }

    pub async fn link_article(&self, news_id: i64, tag_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO news_article_tags (news_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT (news_id, tag_id) DO NOTHING
            "#,
        )
        .bind(news_id)
        .bind(tag_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn tags_for_article(&self, news_id: i64) -> Result<Vec<TagRow>> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT t.* FROM tags t
            JOIN news_article_tags nat ON nat.tag_id = t.id
            WHERE nat.news_id = $1
            "#,
        )
        .bind(news_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_type_parses_back_from_stored_string() {
        let row = TagRow {
            id: 1,
            name: "Spartak".into(),
            name_normalized: "spartak".into(),
            url: None,
            tag_type: "team".into(),
        };
        assert_eq!(row.tag_type.parse::<TagType>().unwrap(), TagType::Team);
    }
}
