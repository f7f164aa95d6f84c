//! Tag/alias canonicalizer (spec.md §4.3): wires `sportwire-normalize`'s
//! heuristic classifier and `sportwire-store`'s repositories into the three
//! operations the ingest pipeline calls per article — `upsert_tag`,
//! `upsert_alias_from_tag`, `assign_entities_for_article`.

use sportwire_common::types::TagType;
use sportwire_normalize::{guess_tag_type_with_context, normalize_token};
use sportwire_store::entities::{AssignmentOutcome, EntityStore};
use sportwire_store::error::Result;
use sportwire_store::tags::{TagStore, UpsertedTag};

/// Allowed entity-bearing tag types; `Unknown` tags never resolve to an
/// alias (spec.md §4.3 "for each tag with an allowed type").
const ALLOWED_ENTITY_TYPES: [TagType; 4] = [
    TagType::Sport,
    TagType::Tournament,
    TagType::Team,
    TagType::Player,
];

#[derive(Clone)]
pub struct TagCanonicalizer {
    tags: TagStore,
    entities: EntityStore,
}

impl TagCanonicalizer {
    pub fn new(tags: TagStore, entities: EntityStore) -> Self {
        Self { tags, entities }
    }

    /// `upsert_tag` per spec.md §4.3: infer a type when `raw` is absent
    /// (`Unknown`), normalize the name, then defer identity resolution
    /// (URL, then case-insensitive name, then insert) to `TagStore`.
    pub async fn upsert_tag(
        &self,
        name: &str,
        url: Option<&str>,
        raw: Option<TagType>,
        context: Option<&str>,
    ) -> Result<UpsertedTag> {
        let ty = match raw {
            Some(t) if t != TagType::Unknown => t,
            _ => guess_tag_type_with_context(Some(name), url, context),
        };
        let name_normalized = normalize_token(name);
        self.tags.upsert_tag(name, url, &name_normalized, ty).await
    }

    /// Links a tag to an article and, for allowed types, ensures an alias
    /// exists pointing at a canonical entity (spec.md §4.3
    /// `upsert_alias_from_tag`).
    pub async fn link_tag_to_article(
        &self,
        news_id: i64,
        tag_id: i64,
        tag_name: &str,
        tag_type: TagType,
        source: &str,
        lang: &str,
    ) -> Result<bool> {
        self.tags.link_article(news_id, tag_id).await?;

        if !ALLOWED_ENTITY_TYPES.contains(&tag_type) {
            return Ok(false);
        }

        let alias_normalized = normalize_token(tag_name);
        self.entities
            .upsert_alias_from_tag(tag_name, &alias_normalized, tag_type, source, lang)
            .await
    }

    /// `assign_entities_for_article` per spec.md §4.3: reads every
    /// allowed-type tag linked to the article and resolves each through
    /// `entity_aliases`.
    pub async fn assign_entities_for_article(
        &self,
        news_id: i64,
        prefer_existing: bool,
    ) -> Result<AssignmentOutcome> {
        let tags = self.tags.tags_for_article(news_id).await?;

        let candidates: Vec<(TagType, String)> = tags
            .into_iter()
            .filter_map(|t| {
                let ty: TagType = t.tag_type.parse().ok()?;
                if ALLOWED_ENTITY_TYPES.contains(&ty) {
                    Some((ty, t.name_normalized))
                } else {
                    None
                }
            })
            .collect();

        self.entities
            .assign_entities_for_article(news_id, &candidates, prefer_existing)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_entity_types_excludes_unknown() {
        assert!(!ALLOWED_ENTITY_TYPES.contains(&TagType::Unknown));
        assert_eq!(ALLOWED_ENTITY_TYPES.len(), 4);
    }
}
