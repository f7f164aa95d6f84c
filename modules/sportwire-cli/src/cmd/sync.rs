//! `sportwire sync` (spec.md §6, §4.1-§4.3): incremental crawl, tag
//! canonicalization, entity assignment, and fingerprinting for each newly
//! seen article.

use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use clap::Args;
use sportwire_common::config::Config;
use sportwire_common::types::TagType;
use sportwire_fetch::{ArticleSelectors, FetchError, Fetcher, HttpFetcher, ListingSelectors, SessionPool};
use sportwire_fingerprint::{compute_signatures, EntitySlots};
use sportwire_normalize::{normalize_url, to_iso};
use sportwire_store::entities::EntityStore;
use sportwire_store::fingerprints::FingerprintStore;
use sportwire_store::news::{NewsStore, NewsUpsert};
use sportwire_store::tags::TagStore;
use sportwire_taxonomy::TagCanonicalizer;
use tracing::warn;

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Walk at most this many listing pages (spec.md §4.1).
    #[arg(long, default_value_t = 5)]
    pub max_pages: u32,
    /// Stop once this relative/absolute URL is seen (incremental anchor).
    #[arg(long)]
    pub anchor_url: Option<String>,
    /// Print what would be fetched without writing to the store.
    #[arg(long)]
    pub dry_run: bool,
    /// Fetch a single page only, for a fast connectivity check.
    #[arg(long)]
    pub smoke: bool,
}

fn join_url(root: &str, relative: &str) -> String {
    if relative.starts_with("http://") || relative.starts_with("https://") {
        return relative.to_string();
    }
    match url::Url::parse(root).and_then(|base| base.join(relative)) {
        Ok(u) => u.to_string(),
        Err(_) => format!("{}/{}", root.trim_end_matches('/'), relative.trim_start_matches('/')),
    }
}

fn parse_published_at(date_label: &str, time_label: &str) -> Option<chrono::DateTime<Utc>> {
    let iso = to_iso(date_label, Some(time_label))?;
    let naive = NaiveDateTime::parse_from_str(&iso, "%Y-%m-%dT%H:%M:%S").ok()?;
    Some(naive.and_utc())
}

pub async fn run(config: &Config, args: SyncArgs) -> anyhow::Result<()> {
    let pool = crate::cmd::open_store(config).await?;
    let news = NewsStore::new(pool.clone());
    let tags = TagStore::new(pool.clone());
    let entities = EntityStore::new(pool.clone());
    let fingerprints = FingerprintStore::new(pool.clone());
    let canon = TagCanonicalizer::new(tags.clone(), entities.clone());

    let listing = ListingSelectors {
        date_group: config.source.listing_date_group.clone(),
        item_class: config.source.listing_item_class.clone(),
        time: config.source.listing_time.clone(),
        article_link: config.source.listing_article_link.clone(),
    };
    let article_sel = ArticleSelectors {
        title: config.source.article_title.clone(),
        body_container: config.source.article_body_container.clone(),
        tags: config.source.article_tags.clone(),
        images: config.source.article_images.clone(),
        videos: config.source.article_videos.clone(),
    };
    let session = SessionPool::new(1, Duration::from_millis(250));
    let fetcher = HttpFetcher::new(session, listing, article_sel)?;

    let max_pages = if args.smoke { 1 } else { args.max_pages };
    let items = sportwire_fetch::crawl_incremental(
        &fetcher,
        &config.source.base_url,
        max_pages,
        args.anchor_url.as_deref(),
    )
    .await?;

    let mut processed: u64 = 0;
    let mut inserted: u64 = 0;
    let mut skipped: u64 = 0;
    let mut tag_links: u64 = 0;

    for (date_label, item) in items {
        processed += 1;
        let article_url = join_url(&config.source.root_url, &item.relative_url);
        let canonical = match normalize_url(&article_url) {
            Some(u) => u,
            None => {
                warn!(url = %article_url, "could not normalize article url, skipping");
                println!("{article_url}: error:normalize");
                skipped += 1;
                continue;
            }
        };

        if args.dry_run {
            println!("{canonical}: would fetch");
            continue;
        }

        let draft = match fetcher.fetch_article(&canonical).await {
            Ok(d) => d,
            Err(FetchError::Permanent(e)) => {
                warn!(url = %canonical, error = %e, "permanent fetch error, article skipped");
                println!("{canonical}: error:permanent");
                skipped += 1;
                continue;
            }
            Err(e @ FetchError::Transient(_)) => {
                warn!(url = %canonical, error = %e, "transient fetch error surfaced after retries");
                println!("{canonical}: error:transient");
                skipped += 1;
                continue;
            }
        };

        let published_at = parse_published_at(&date_label, &item.time_label);
        let existed_before = news.get_by_url(&canonical).await?.is_some();

        let news_id = news
            .upsert_by_url(NewsUpsert {
                url: canonical.clone(),
                title: draft.title.clone(),
                body: draft.body.clone(),
                published_at,
                source: config.source.name.clone(),
                lang: "ru".to_string(),
                image_urls: draft.images.clone(),
                video_urls: draft.videos.clone(),
            })
            .await?;
        if !existed_before {
            inserted += 1;
        }

        for tag_ref in &draft.tags {
            let tag_url = tag_ref
                .url
                .as_deref()
                .map(|u| join_url(&config.source.root_url, u))
                .and_then(|u| normalize_url(&u));

            let upserted = canon
                .upsert_tag(&tag_ref.name, tag_url.as_deref(), None, Some(&draft.body))
                .await?;
            let tag_type = tags
                .get(upserted.id)
                .await?
                .and_then(|r| r.tag_type.parse::<TagType>().ok())
                .unwrap_or(TagType::Unknown);

            canon
                .link_tag_to_article(news_id, upserted.id, &tag_ref.name, tag_type, "crawler", "ru")
                .await?;
            tag_links += 1;
        }

        canon.assign_entities_for_article(news_id, true).await?;

        let linked_tags = tags.tags_for_article(news_id).await?;
        let slot = |ty: TagType| -> Option<String> {
            linked_tags
                .iter()
                .find(|t| t.tag_type.parse::<TagType>().ok() == Some(ty))
                .map(|t| t.name_normalized.clone())
        };
        let sport = slot(TagType::Sport);
        let tournament = slot(TagType::Tournament);
        let team = slot(TagType::Team);
        let player = slot(TagType::Player);
        let slots = EntitySlots {
            sport: sport.as_deref(),
            tournament: tournament.as_deref(),
            team: team.as_deref(),
            player: player.as_deref(),
        };
        let (title_sig, entity_sig) = compute_signatures(&draft.title, &slots);
        fingerprints.upsert(news_id, &title_sig, entity_sig.as_deref()).await?;

        println!("{canonical}: {}", if existed_before { "updated" } else { "inserted" });
    }

    println!("processed={processed} inserted={inserted} skipped={skipped} tag_links={tag_links}");
    Ok(())
}
