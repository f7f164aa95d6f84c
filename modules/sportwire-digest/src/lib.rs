//! Digest builder (spec.md §4.12): scores stories updated within a window,
//! persists the ranking, and renders Markdown/HTML artifacts.

pub mod render;
pub mod scoring;

use chrono::{DateTime, Utc};
use sportwire_compose::RenderMode;
use sportwire_store::digest::{DigestItem, DigestStore};
use sportwire_store::error::Result;
use sportwire_store::stories::StoryStore;
use tracing::info;

pub use scoring::ScoredStory;

/// A fully-built digest: the persisted row id, the ranked stories, and both
/// rendered artifacts ready to ship.
pub struct Digest {
    pub digest_id: i64,
    pub stories: Vec<ScoredStory>,
    pub html: (String, Vec<String>),
    pub markdown: (String, Vec<String>),
}

/// Builds and persists a digest for `period` over `[window_start, window_end)`.
pub async fn build_digest(
    stories_store: &StoryStore,
    digest_store: &DigestStore,
    period: &str,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    limit: usize,
) -> Result<Digest> {
    let candidates = stories_store.digest_candidates(window_start, window_end).await?;
    let now = Utc::now();
    let ranked = scoring::top_n(&candidates, limit, now);

    let items: Vec<DigestItem> = ranked
        .iter()
        .enumerate()
        .map(|(idx, s)| DigestItem {
            rank: idx as i32 + 1,
            story_id: s.story_id,
            score: s.score,
        })
        .collect();

    let digest_id = digest_store.save(period, window_start, window_end, &items).await?;
    info!(digest_id, period, stories = ranked.len(), "digest built");

    let html = render::render(RenderMode::Html, period, window_start, window_end, &ranked);
    let markdown = render::render(RenderMode::Markdown, period, window_start, window_end, &ranked);

    Ok(Digest {
        digest_id,
        stories: ranked,
        html,
        markdown,
    })
}
