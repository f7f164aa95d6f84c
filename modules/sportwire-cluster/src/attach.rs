use std::collections::{HashMap, HashSet};

use chrono::{Duration, Utc};
use sportwire_fingerprint::is_near_duplicate;
use sportwire_store::error::Result as StoreResult;
use sportwire_store::fingerprints::FingerprintStore;
use sportwire_store::stories::StoryStore;
use tracing::{debug, info, warn};

use crate::engine::Cluster;
use crate::title_refiner::{compute_story_title, ArticleForTitle};

const NEAR_DUP_STORY_LOOKBACK_HOURS: i64 = 72;

/// Which branch of the attachment policy a cluster took (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachReason {
    NearDuplicateStory,
    AlreadyFullyLinked,
    ExistingMemberStory,
    NewStory,
}

#[derive(Debug, Clone)]
pub struct AttachOutcome {
    pub story_id: i64,
    pub created: bool,
    pub reason: AttachReason,
    pub links_created: usize,
    pub links_skipped: usize,
}

/// Decides which story a cluster belongs to, then links every member.
///
/// Order of preference, grounded in `ensure_story_exists`/`link_cluster`:
/// 1. the cluster's newest member is a near-duplicate (by title/entity
///    signature) of an article already in a story updated within the last
///    72 hours — join that story.
/// 2. every member is already linked to some common story — keep it
///    (lowest shared id if more than one).
/// 3. any member is already linked to an existing story — attach the whole
///    cluster to the lowest such story id.
/// 4. otherwise create a new story, titled via `compute_story_title`.
pub async fn attach_cluster(
    story_store: &StoryStore,
    fingerprint_store: &FingerprintStore,
    cluster: &Cluster,
    titles: &[ArticleForTitle],
) -> StoreResult<AttachOutcome> {
    let member_ids = cluster.news_ids();

    let existing: HashMap<i64, HashSet<i64>> = {
        let pairs = story_store.story_ids_for_articles(&member_ids).await?;
        let mut map: HashMap<i64, HashSet<i64>> = HashMap::new();
        for (news_id, story_id) in pairs {
            map.entry(news_id).or_default().insert(story_id);
        }
        map
    };

    let (story_id, created, reason) =
        if let Some(story_id) = find_near_duplicate_story(story_store, fingerprint_store, cluster.newest().news_id).await? {
            (story_id, false, AttachReason::NearDuplicateStory)
        } else if let Some(story_id) = shared_story_id(&member_ids, &existing) {
            debug!(story_id, "cluster already fully linked to one story");
            (story_id, false, AttachReason::AlreadyFullyLinked)
        } else if let Some(story_id) = first_existing_story(&member_ids, &existing) {
            debug!(story_id, "attaching cluster to existing member story");
            (story_id, false, AttachReason::ExistingMemberStory)
        } else {
            let title = compute_story_title(titles);
            let story_id = story_store.create(&title).await?;
            info!(story_id, title, "created new story");
            (story_id, true, AttachReason::NewStory)
        };

    let mut links_created = 0;
    let mut links_skipped = 0;
    for news_id in &member_ids {
        let already = existing.get(news_id).map(|s| s.contains(&story_id)).unwrap_or(false);
        if already {
            links_skipped += 1;
            continue;
        }
        if let Some(others) = existing.get(news_id) {
            if !others.is_empty() {
                warn!(news_id, story_id, existing = ?others, "article already linked to another story; attaching here too");
            }
        }
        let inserted = story_store.attach_article(story_id, *news_id).await?;
        if inserted {
            links_created += 1;
        } else {
            links_skipped += 1;
        }
    }

    Ok(AttachOutcome {
        story_id,
        created,
        reason,
        links_created,
        links_skipped,
    })
}

/// Articles already in a story touched within the lookback window, excluding
/// `news_id` itself, checked with `sportwire_fingerprint::is_near_duplicate`.
async fn find_near_duplicate_story(
    story_store: &StoryStore,
    fingerprint_store: &FingerprintStore,
    news_id: i64,
) -> StoreResult<Option<i64>> {
    let fingerprint = match fingerprint_store.get(news_id).await? {
        Some(f) if !f.title_sig.is_empty() => f,
        _ => return Ok(None),
    };

    let cutoff = Utc::now() - Duration::hours(NEAR_DUP_STORY_LOOKBACK_HOURS);
    let rows = story_store.fingerprints_for_stories_updated_since(cutoff).await?;

    let mut story_of: HashMap<i64, i64> = HashMap::new();
    let mut candidates: Vec<(i64, String, Option<String>)> = Vec::new();
    for (story_id, row) in rows {
        if row.news_id == news_id || row.title_sig.is_empty() {
            continue;
        }
        story_of.insert(row.news_id, story_id);
        candidates.push((row.news_id, row.title_sig, row.entity_sig));
    }

    let refs: Vec<(i64, &str, Option<&str>)> = candidates
        .iter()
        .map(|(id, sig, ent)| (*id, sig.as_str(), ent.as_deref()))
        .collect();

    let found = is_near_duplicate(&fingerprint.title_sig, fingerprint.entity_sig.as_deref(), refs);
    Ok(found.and_then(|m| {
        let story_id = story_of.get(&m.duplicate_of).copied();
        if let Some(story_id) = story_id {
            info!(
                story_id,
                duplicate_of = m.duplicate_of,
                jaccard = m.jaccard,
                entity_match = m.entity_match,
                "joined existing story by near-duplicate"
            );
        }
        story_id
    }))
}

/// A story id linked to every member, lowest wins if more than one.
fn shared_story_id(member_ids: &[i64], existing: &HashMap<i64, HashSet<i64>>) -> Option<i64> {
    let mut shared: Option<HashSet<i64>> = None;
    for id in member_ids {
        let ids = existing.get(id).cloned().unwrap_or_default();
        shared = Some(match shared {
            None => ids,
            Some(acc) => acc.intersection(&ids).copied().collect(),
        });
    }
    shared.and_then(|s| s.into_iter().min())
}

/// Lowest existing story id among any member, in cluster order.
fn first_existing_story(member_ids: &[i64], existing: &HashMap<i64, HashSet<i64>>) -> Option<i64> {
    member_ids.iter().find_map(|id| existing.get(id).and_then(|s| s.iter().min().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_story_picks_lowest_common_id() {
        let mut existing = HashMap::new();
        existing.insert(1, HashSet::from([5, 9]));
        existing.insert(2, HashSet::from([9]));
        assert_eq!(shared_story_id(&[1, 2], &existing), Some(9));
    }

    #[test]
    fn shared_story_none_when_no_overlap() {
        let mut existing = HashMap::new();
        existing.insert(1, HashSet::from([5]));
        existing.insert(2, HashSet::from([9]));
        assert_eq!(shared_story_id(&[1, 2], &existing), None);
    }

    #[test]
    fn first_existing_story_prefers_cluster_order_then_lowest() {
        let mut existing = HashMap::new();
        existing.insert(2, HashSet::from([30, 10]));
        existing.insert(1, HashSet::new());
        assert_eq!(first_existing_story(&[1, 2], &existing), Some(10));
    }
}
