use sqlx::PgPool;
use sportwire_common::types::TagType;
use tracing::{info, warn};

use crate::error::Result;

#[derive(Clone)]
pub struct EntityStore {
    pool: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntityRow {
    pub id: i64,
    pub name_normalized: String,
    pub entity_type: String,
    pub lang: String,
}

#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct EntityAssignmentRow {
    pub news_id: i64,
    pub sport_id: Option<i64>,
    pub tournament_id: Option<i64>,
    pub team_id: Option<i64>,
    pub player_id: Option<i64>,
}

/// Result of resolving an article's tags into typed entity slots
/// (spec.md §4.3 `assign_entities_for_article`).
#[derive(Debug, Default)]
pub struct AssignmentOutcome {
    pub assignment: EntityAssignmentRow,
    pub unknown: Vec<i64>,
    pub conflicts: Vec<(TagType, Vec<i64>)>,
}

impl EntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_entity(&self, name_normalized: &str, ty: TagType, lang: &str) -> Result<i64> {
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM entities WHERE name_normalized = $1 AND entity_type = $2",
        )
        .bind(name_normalized)
        .bind(ty.to_string())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO entities (name_normalized, entity_type, lang)
            VALUES ($1, $2, $3)
            ON CONFLICT (name_normalized, entity_type) DO UPDATE SET lang = entities.lang
            RETURNING id
            "#,
        )
        .bind(name_normalized)
        .bind(ty.to_string())
        .bind(lang)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Ensures an `entities` row exists and records an alias pointing to it.
    /// Empty normalized aliases are rejected; conflicting aliases back-fill
    /// missing fields on the existing row (spec.md §4.3).
    pub async fn upsert_alias_from_tag(
        &self,
        alias: &str,
        alias_normalized: &str,
        ty: TagType,
        source: &str,
        lang: &str,
    ) -> Result<bool> {
        if alias_normalized.trim().is_empty() {
            return Ok(false);
        }

        let entity_id = self.ensure_entity(alias_normalized, ty, lang).await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO entity_aliases (alias, alias_normalized, entity_type, entity_id, source, lang)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (alias_normalized, entity_type) DO NOTHING
            "#,
        )
        .bind(alias)
        .bind(alias_normalized)
        .bind(ty.to_string())
        .bind(entity_id)
        .bind(source)
        .bind(lang)
        .execute(&self.pool)
        .await?
        .rows_affected()
            > 0;

        if !inserted {
            sqlx::query(
                r#"
                UPDATE entity_aliases SET
                    entity_id = COALESCE(entity_id, $3),
                    source = CASE WHEN source = '' THEN $4 ELSE source END,
                    lang = CASE WHEN lang = '' THEN $5 ELSE lang END
                WHERE alias_normalized = $1 AND entity_type = $2
                "#,
            )
            .bind(alias_normalized)
            .bind(ty.to_string())
            .bind(entity_id)
            .bind(source)
            .bind(lang)
            .execute(&self.pool)
            .await?;
        }

        Ok(inserted)
    }

    async fn resolve_alias(&self, alias_normalized: &str, ty: TagType) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT entity_id FROM entity_aliases WHERE alias_normalized = $1 AND entity_type = $2",
        )
        .bind(alias_normalized)
        .bind(ty.to_string())
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn existing_assignment(&self, news_id: i64) -> Result<EntityAssignmentRow> {
        let row = sqlx::query_as::<_, EntityAssignmentRow>(
            "SELECT * FROM news_entity_assignments WHERE news_id = $1",
        )
        .bind(news_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.unwrap_or(EntityAssignmentRow {
            news_id,
            ..Default::default()
        }))
    }

    /// Resolve an article's tags into at most one entity id per slot.
    /// `tag_candidates` is `(tag_type, name_normalized)` for every
    /// allowed-type tag linked to the article.
    pub async fn assign_entities_for_article(
        &self,
        news_id: i64,
        tag_candidates: &[(TagType, String)],
        prefer_existing: bool,
    ) -> Result<AssignmentOutcome> {
        let prior = self.existing_assignment(news_id).await?;

        let mut by_slot: std::collections::HashMap<TagType, Vec<i64>> =
            std::collections::HashMap::new();
        let mut unknown = Vec::new();

        for (ty, name_normalized) in tag_candidates {
            match self.resolve_alias(name_normalized, *ty).await? {
                Some(entity_id) => {
                    let slot = by_slot.entry(*ty).or_default();
                    if !slot.contains(&entity_id) {
                        slot.push(entity_id);
                    }
                }
                None => {
                    info!(news_id, tag_type = %ty, name = %name_normalized, "unknown tag, no alias hit");
                }
            }
        }

        let mut conflicts = Vec::new();
        let pick = |ty: TagType, prior_val: Option<i64>, unknown: &mut Vec<i64>| -> Option<i64> {
            let _ = unknown;
            let candidates = by_slot.get(&ty).cloned().unwrap_or_default();
            match candidates.len() {
                0 => prior_val,
                1 => Some(candidates[0]),
                _ => {
                    if prefer_existing {
                        if let Some(p) = prior_val {
                            if candidates.contains(&p) {
                                return Some(p);
                            }
                        }
                    }
                    Some(candidates[0])
                }
            }
        };

        for ty in [
            TagType::Sport,
            TagType::Tournament,
            TagType::Team,
            TagType::Player,
        ] {
            if let Some(candidates) = by_slot.get(&ty) {
                if candidates.len() > 1 {
                    warn!(news_id, tag_type = %ty, candidates = ?candidates, "entity assignment conflict");
                    conflicts.push((ty, candidates.clone()));
                }
            }
        }

        let assignment = EntityAssignmentRow {
            news_id,
            sport_id: pick(TagType::Sport, prior.sport_id, &mut unknown),
            tournament_id: pick(TagType::Tournament, prior.tournament_id, &mut unknown),
            team_id: pick(TagType::Team, prior.team_id, &mut unknown),
            player_id: pick(TagType::Player, prior.player_id, &mut unknown),
        };

        sqlx::query(
            r#"
            INSERT INTO news_entity_assignments (news_id, sport_id, tournament_id, team_id, player_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (news_id) DO UPDATE SET
                sport_id = EXCLUDED.sport_id,
                tournament_id = EXCLUDED.tournament_id,
                team_id = EXCLUDED.team_id,
                player_id = EXCLUDED.player_id
            "#,
        )
        .bind(assignment.news_id)
        .bind(assignment.sport_id)
        .bind(assignment.tournament_id)
        .bind(assignment.team_id)
        .bind(assignment.player_id)
        .execute(&self.pool)
        .await?;

        Ok(AssignmentOutcome {
            assignment,
            unknown,
            conflicts,
        })
    }

    pub async fn get_assignment(&self, news_id: i64) -> Result<Option<EntityAssignmentRow>> {
        let row = sqlx::query_as::<_, EntityAssignmentRow>(
            "SELECT * FROM news_entity_assignments WHERE news_id = $1",
        )
        .bind(news_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
