use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::unionfind::UnionFind;

pub const TITLE_JACCARD_THRESHOLD: f64 = 0.6;
pub const TIME_DELTA_HOURS: i64 = 6;
const REQUIRED_SIGNALS: u32 = 2;

/// One candidate article as seen by the clustering engine. Distinct from
/// `sportwire-fingerprint`'s signature rows: this carries raw title tokens
/// and the full tag-id set a pair can intersect on, not a compressed
/// 8-token signature (spec.md §4.6).
#[derive(Debug, Clone)]
pub struct ClusterCandidate {
    pub news_id: i64,
    pub sport_tag_ids: HashSet<i64>,
    pub tournament_tag_ids: HashSet<i64>,
    pub title_tokens: HashSet<String>,
    pub entity_tag_ids: HashSet<i64>,
    pub published_at: Option<DateTime<Utc>>,
}

/// A non-singleton group of candidates, newest article first.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub members: Vec<ClusterCandidate>,
}

impl Cluster {
    pub fn newest(&self) -> &ClusterCandidate {
        &self.members[0]
    }

    pub fn news_ids(&self) -> Vec<i64> {
        self.members.iter().map(|m| m.news_id).collect()
    }
}

/// |A∩B|/|A∪B| over title token sets; both-empty and one-empty are 0.0 —
/// a cluster-local convention distinct from the 1.0-for-both-empty rule
/// `sportwire-fingerprint::jaccard` uses for near-dup-story comparisons
/// (spec.md §4.6 vs §4.4/§4.5).
pub fn title_jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// The three clustering predicates; a pair unions once at least two hold
/// (spec.md §4.6).
fn evaluate_pair(a: &ClusterCandidate, b: &ClusterCandidate) -> bool {
    let mut signals = 0;

    if title_jaccard(&a.title_tokens, &b.title_tokens) >= TITLE_JACCARD_THRESHOLD {
        signals += 1;
    }
    if !a.entity_tag_ids.is_empty() && a.entity_tag_ids.intersection(&b.entity_tag_ids).next().is_some() {
        signals += 1;
    }
    if let (Some(ta), Some(tb)) = (a.published_at, b.published_at) {
        let delta = (ta - tb).num_hours().abs();
        if delta <= TIME_DELTA_HOURS {
            signals += 1;
        }
    }

    signals >= REQUIRED_SIGNALS
}

/// Every sport/tournament tag id an article carries is its own bucket key;
/// an article with more than one such tag lands in more than one bucket.
/// Articles with neither all fall into a shared `None` bucket (spec.md
/// §4.6, mirroring the original's `sports | tournaments` grouping).
fn bucket_keys(c: &ClusterCandidate) -> Vec<Option<i64>> {
    let keys: Vec<Option<i64>> = c
        .sport_tag_ids
        .iter()
        .chain(c.tournament_tag_ids.iter())
        .copied()
        .map(Some)
        .collect();
    if keys.is_empty() {
        vec![None]
    } else {
        keys
    }
}

fn union_clusters(candidates: &[ClusterCandidate]) -> UnionFind {
    let mut buckets: HashMap<Option<i64>, Vec<usize>> = HashMap::new();
    for (i, c) in candidates.iter().enumerate() {
        for key in bucket_keys(c) {
            buckets.entry(key).or_default().push(i);
        }
    }

    let mut uf = UnionFind::new();
    for c in candidates {
        uf.ensure(c.news_id);
    }

    let mut seen_pairs: HashSet<(i64, i64)> = HashSet::new();
    for indices in buckets.values() {
        for i in 0..indices.len() {
            for j in (i + 1)..indices.len() {
                let a = &candidates[indices[i]];
                let b = &candidates[indices[j]];
                let pair = if a.news_id < b.news_id {
                    (a.news_id, b.news_id)
                } else {
                    (b.news_id, a.news_id)
                };
                if !seen_pairs.insert(pair) {
                    continue;
                }
                if evaluate_pair(a, b) {
                    uf.union(a.news_id, b.news_id);
                }
            }
        }
    }

    uf
}

/// Component extraction: singletons dropped, members sorted newest-first,
/// clusters sorted by size descending (spec.md §4.6).
pub fn build_clusters(candidates: Vec<ClusterCandidate>) -> Vec<Cluster> {
    let mut uf = union_clusters(&candidates);
    let by_id: HashMap<i64, ClusterCandidate> =
        candidates.into_iter().map(|c| (c.news_id, c)).collect();

    let groups = uf.groups();
    let mut clusters: Vec<Cluster> = groups
        .into_values()
        .filter(|ids| ids.len() >= 2)
        .map(|ids| {
            let mut members: Vec<ClusterCandidate> =
                ids.into_iter().map(|id| by_id[&id].clone()).collect();
            members.sort_by(|a, b| match (b.published_at, a.published_at) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => b.news_id.cmp(&a.news_id),
            });
            Cluster { members }
        })
        .collect();

    clusters.sort_by(|a, b| b.members.len().cmp(&a.members.len()));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(
        id: i64,
        sport: Option<i64>,
        tournament: Option<i64>,
        title: &[&str],
        entities: &[i64],
        hours_ago: i64,
    ) -> ClusterCandidate {
        ClusterCandidate {
            news_id: id,
            sport_tag_ids: sport.into_iter().collect(),
            tournament_tag_ids: tournament.into_iter().collect(),
            title_tokens: title.iter().map(|s| s.to_string()).collect(),
            entity_tag_ids: entities.iter().copied().collect(),
            published_at: Some(Utc::now() - chrono::Duration::hours(hours_ago)),
        }
    }

    #[test]
    fn title_jaccard_both_empty_is_zero() {
        assert_eq!(title_jaccard(&HashSet::new(), &HashSet::new()), 0.0);
    }

    #[test]
    fn title_and_time_together_cluster_a_pair() {
        // {зенит,победа} vs {зенит,победа,игра}: intersection=2, union=3,
        // jaccard=0.667 >= TITLE_JACCARD_THRESHOLD, plus the time predicate —
        // two of three signals hold.
        let a = candidate(1, Some(1), None, &["зенит", "победа"], &[], 0);
        let b = candidate(2, Some(1), None, &["зенит", "победа", "игра"], &[], 1);
        let clusters = build_clusters(vec![a, b]);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 2);
    }

    #[test]
    fn single_signal_does_not_cluster() {
        // only the time-delta signal holds; title and entities disagree.
        let a = candidate(1, Some(1), None, &["зенит", "победа"], &[10], 0);
        let b = candidate(2, Some(1), None, &["спартак", "поражение"], &[20], 1);
        let clusters = build_clusters(vec![a, b]);
        assert!(clusters.is_empty());
    }

    #[test]
    fn different_buckets_never_compared() {
        let a = candidate(1, Some(1), None, &["зенит", "победа", "матч"], &[], 0);
        let b = candidate(2, Some(2), None, &["зенит", "победа", "матч"], &[], 0);
        let clusters = build_clusters(vec![a, b]);
        assert!(clusters.is_empty());
    }

    #[test]
    fn entity_overlap_plus_time_clusters_without_title_match() {
        let a = candidate(1, None, Some(7), &["alpha", "beta"], &[99], 0);
        let b = candidate(2, None, Some(7), &["gamma", "delta"], &[99], 2);
        let clusters = build_clusters(vec![a, b]);
        assert_eq!(clusters.len(), 1);
    }

    #[test]
    fn clusters_sorted_by_size_descending() {
        let pair_a = vec![
            candidate(1, Some(1), None, &["один", "два", "три"], &[], 0),
            candidate(2, Some(1), None, &["один", "два", "четыре"], &[], 1),
        ];
        let trio = vec![
            candidate(3, Some(2), None, &["пять", "шесть", "семь"], &[], 0),
            candidate(4, Some(2), None, &["пять", "шесть", "восемь"], &[], 1),
            candidate(5, Some(2), None, &["пять", "шесть", "девять"], &[], 2),
        ];
        let mut all = pair_a;
        all.extend(trio);
        let clusters = build_clusters(all);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members.len(), 3);
        assert_eq!(clusters[1].members.len(), 2);
    }

    #[test]
    fn newest_first_within_cluster() {
        let a = candidate(1, Some(1), None, &["а", "б", "в"], &[], 5);
        let b = candidate(2, Some(1), None, &["а", "б", "г"], &[], 0);
        let clusters = build_clusters(vec![a, b]);
        assert_eq!(clusters[0].newest().news_id, 2);
    }
}
