//! `sportwire cluster` (spec.md §6, §4.6-§4.7): group recent articles into
//! clusters, decide which story each belongs to, and link the members.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use clap::Args;
use sportwire_cluster::{attach_cluster, build_clusters, ArticleForTitle, ClusterCandidate};
use sportwire_common::config::Config;
use sportwire_common::types::TagType;
use sportwire_fingerprint::tokenize;
use sportwire_store::fingerprints::FingerprintStore;
use sportwire_store::news::NewsStore;
use sportwire_store::stories::StoryStore;
use sportwire_store::tags::{TagRow, TagStore};

#[derive(Args, Debug)]
pub struct ClusterArgs {
    /// Only consider articles published in the last N hours (spec.md §4.6).
    #[arg(long, default_value_t = 72)]
    pub lookback_hours: i64,
    /// Cap on candidate articles pulled into the clustering pass.
    #[arg(long, default_value_t = 500)]
    pub limit: i64,
}

fn names_of(tags: &[TagRow], ty: TagType) -> Vec<String> {
    tags.iter()
        .filter(|t| t.tag_type.parse::<TagType>().ok() == Some(ty))
        .map(|t| t.name.clone())
        .collect()
}

fn ids_of(tags: &[TagRow], ty: TagType) -> HashSet<i64> {
    tags.iter()
        .filter(|t| t.tag_type.parse::<TagType>().ok() == Some(ty))
        .map(|t| t.id)
        .collect()
}

pub async fn run(config: &Config, args: ClusterArgs) -> anyhow::Result<()> {
    let pool = crate::cmd::open_store(config).await?;
    let news = NewsStore::new(pool.clone());
    let tags = TagStore::new(pool.clone());
    let stories = StoryStore::new(pool.clone());
    let fingerprints = FingerprintStore::new(pool.clone());

    let cutoff = Utc::now() - Duration::hours(args.lookback_hours);
    let rows = news.recent_since(cutoff, args.limit).await?;

    let mut candidates = Vec::with_capacity(rows.len());
    let mut tags_by_news = std::collections::HashMap::new();
    for row in &rows {
        let row_tags = tags.tags_for_article(row.id).await?;
        let title_tokens: HashSet<String> = tokenize(&row.title).into_iter().collect();

        let mut entity_tag_ids = ids_of(&row_tags, TagType::Team);
        entity_tag_ids.extend(ids_of(&row_tags, TagType::Player));

        candidates.push(ClusterCandidate {
            news_id: row.id,
            sport_tag_ids: ids_of(&row_tags, TagType::Sport),
            tournament_tag_ids: ids_of(&row_tags, TagType::Tournament),
            title_tokens,
            entity_tag_ids,
            published_at: row.published_at,
        });
        tags_by_news.insert(row.id, row_tags);
    }

    let rows_by_id: std::collections::HashMap<i64, &sportwire_store::news::NewsRow> =
        rows.iter().map(|r| (r.id, r)).collect();

    let clusters = build_clusters(candidates);

    let mut created = 0u64;
    let mut reused = 0u64;
    let mut links_created = 0u64;
    let mut links_skipped = 0u64;

    for cluster in &clusters {
        let titles: Vec<ArticleForTitle> = cluster
            .members
            .iter()
            .map(|m| {
                let row_tags = tags_by_news.get(&m.news_id).cloned().unwrap_or_default();
                let title = rows_by_id
                    .get(&m.news_id)
                    .map(|r| r.title.clone())
                    .unwrap_or_default();
                ArticleForTitle {
                    title,
                    published: m.published_at,
                    sports: names_of(&row_tags, TagType::Sport),
                    tournaments: names_of(&row_tags, TagType::Tournament),
                    teams: names_of(&row_tags, TagType::Team),
                    players: names_of(&row_tags, TagType::Player),
                }
            })
            .collect();

        let outcome = attach_cluster(&stories, &fingerprints, cluster, &titles).await?;
        if outcome.created {
            created += 1;
        } else {
            reused += 1;
        }
        links_created += outcome.links_created as u64;
        links_skipped += outcome.links_skipped as u64;

        println!(
            "story={} reason={:?} members={} links_created={} links_skipped={}",
            outcome.story_id,
            outcome.reason,
            cluster.members.len(),
            outcome.links_created,
            outcome.links_skipped
        );
    }

    println!(
        "clusters={} stories_created={created} stories_reused={reused} links_created={links_created} links_skipped={links_skipped}",
        clusters.len()
    );
    Ok(())
}
