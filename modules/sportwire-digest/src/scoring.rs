use chrono::{DateTime, Duration, Utc};
use sportwire_store::stories::DigestCandidateRow;

/// Scored digest candidate, ready to rank and persist.
#[derive(Debug, Clone)]
pub struct ScoredStory {
    pub story_id: i64,
    pub title: String,
    pub article_count: i64,
    pub score: f64,
}

fn size_factor(article_count: i64) -> f64 {
    (article_count as f64 / 3.0).min(10.0)
}

fn freshness(max_published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(max_pub) = max_published_at else {
        return 0.0;
    };
    let age = now - max_pub;
    if age <= Duration::hours(6) {
        3.0
    } else if age <= Duration::hours(24) {
        2.0
    } else if age <= Duration::hours(72) {
        1.0
    } else {
        0.0
    }
}

fn entity_weight(has_tournament: bool, team_count: i64, has_player: bool) -> f64 {
    let tournament_or_teams = if has_tournament || team_count >= 2 { 2.0 } else { 0.0 };
    let player = if has_player { 1.0 } else { 0.0 };
    tournament_or_teams + player
}

/// `size_factor + freshness + entity_weight`, per spec.md §4.12.
pub fn score(candidate: &DigestCandidateRow, now: DateTime<Utc>) -> f64 {
    size_factor(candidate.article_count)
        + freshness(candidate.max_published_at, now)
        + entity_weight(candidate.has_tournament, candidate.team_count, candidate.has_player)
}

/// Scores every candidate and returns the top `limit`, ranked descending by
/// score then by `story_id` ascending for stable ordering among ties.
pub fn top_n(candidates: &[DigestCandidateRow], limit: usize, now: DateTime<Utc>) -> Vec<ScoredStory> {
    let mut scored: Vec<ScoredStory> = candidates
        .iter()
        .map(|c| ScoredStory {
            story_id: c.story_id,
            title: c.title.clone(),
            article_count: c.article_count,
            score: score(c, now),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap().then(a.story_id.cmp(&b.story_id)));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(article_count: i64, hours_ago: i64, has_tournament: bool, team_count: i64, has_player: bool) -> DigestCandidateRow {
        DigestCandidateRow {
            story_id: 1,
            title: "Story".to_string(),
            article_count,
            max_published_at: Some(Utc::now() - Duration::hours(hours_ago)),
            has_tournament,
            team_count,
            has_player,
        }
    }

    #[test]
    fn size_factor_caps_at_ten() {
        let c = candidate(100, 1, false, 0, false);
        assert_eq!(size_factor(c.article_count), 10.0);
    }

    #[test]
    fn freshness_buckets_by_age() {
        let now = Utc::now();
        assert_eq!(freshness(Some(now - Duration::hours(1)), now), 3.0);
        assert_eq!(freshness(Some(now - Duration::hours(12)), now), 2.0);
        assert_eq!(freshness(Some(now - Duration::hours(48)), now), 1.0);
        assert_eq!(freshness(Some(now - Duration::hours(200)), now), 0.0);
        assert_eq!(freshness(None, now), 0.0);
    }

    #[test]
    fn entity_weight_counts_tournament_or_two_teams_plus_player() {
        assert_eq!(entity_weight(true, 0, true), 3.0);
        assert_eq!(entity_weight(false, 2, false), 2.0);
        assert_eq!(entity_weight(false, 1, false), 0.0);
        assert_eq!(entity_weight(false, 1, true), 1.0);
    }

    #[test]
    fn top_n_orders_by_score_descending() {
        let now = Utc::now();
        let mut low = candidate(3, 100, false, 0, false);
        low.story_id = 1;
        let mut high = candidate(30, 1, true, 3, true);
        high.story_id = 2;
        let ranked = top_n(&[low, high], 10, now);
        assert_eq!(ranked[0].story_id, 2);
        assert_eq!(ranked[1].story_id, 1);
    }

    #[test]
    fn top_n_truncates_to_limit() {
        let now = Utc::now();
        let candidates: Vec<_> = (0..5)
            .map(|i| {
                let mut c = candidate(3, 1, false, 0, false);
                c.story_id = i;
                c
            })
            .collect();
        assert_eq!(top_n(&candidates, 2, now).len(), 2);
    }
}
