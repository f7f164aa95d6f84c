//! Renders a queued `(item_type, item_id)` into chat-ready text by pulling
//! a story/article and its tags back out of the store and handing them to
//! `sportwire-compose` (spec.md §4.8-§4.9: the scheduler only knows how to
//! call `MessageSource::render`, not how a message is assembled).

use async_trait::async_trait;
use sportwire_common::types::{ItemType, TagType};
use sportwire_compose::{
    render_article_message, render_story_message, select_story_items, ArticleItem,
    ArticleMessageInput, RenderMode, SourceInfo, StoryMessageInput, TypedTag,
};
use sportwire_fingerprint::{filter_near_duplicates, SignedArticle};
use sportwire_publish::scheduler::MessageSource;
use sportwire_store::error::{Result, StoreError};
use sportwire_store::fingerprints::FingerprintStore;
use sportwire_store::news::{NewsRow, NewsStore};
use sportwire_store::stories::StoryStore;
use sportwire_store::tags::TagStore;

/// Source-line identity (`SOURCE_NAME` / `SOURCE_ROOT_URL`), threaded in at
/// construction so this module never reads the environment itself
/// (spec.md §9 "consolidate ambient config").
#[derive(Clone)]
pub struct Renderer {
    pub news: NewsStore,
    pub tags: TagStore,
    pub stories: StoryStore,
    pub fingerprints: FingerprintStore,
    pub source: SourceInfo,
}

const ALLOWED_TAG_ORDER: [TagType; 4] = [TagType::Tournament, TagType::Team, TagType::Player, TagType::Sport];

fn article_item(row: &NewsRow, tags: &[sportwire_store::tags::TagRow]) -> ArticleItem {
    let mut typed: Vec<TypedTag> = Vec::new();
    for kind in ALLOWED_TAG_ORDER {
        for t in tags {
            let ty: TagType = t.tag_type.parse().unwrap_or(TagType::Unknown);
            if ty == kind {
                typed.push(TypedTag {
                    kind,
                    name: t.name.clone(),
                });
            }
        }
    }
    ArticleItem {
        news_id: row.id,
        title: row.title.clone(),
        url: row.url.clone(),
        tags: typed,
    }
}

impl Renderer {
    pub fn new(
        news: NewsStore,
        tags: TagStore,
        stories: StoryStore,
        fingerprints: FingerprintStore,
        source: SourceInfo,
    ) -> Self {
        Self {
            news,
            tags,
            stories,
            fingerprints,
            source,
        }
    }

    async fn load_article_item(&self, news_id: i64) -> Result<(NewsRow, ArticleItem)> {
        let row = self
            .news
            .get(news_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("news {news_id}")))?;
        let tags = self.tags.tags_for_article(news_id).await?;
        let item = article_item(&row, &tags);
        Ok((row, item))
    }

    /// Renders a single article message (spec.md §4.8, the secondary
    /// publish path).
    pub async fn render_article(&self, news_id: i64, mode: RenderMode) -> Result<Vec<String>> {
        let (_row, item) = self.load_article_item(news_id).await?;
        Ok(render_article_message(
            mode,
            &ArticleMessageInput {
                article: item,
                source: self.source.clone(),
            },
        ))
    }

    /// Renders a story message: members ordered newest-first, filtered for
    /// near-duplicates, re-admitted to the 3-article floor, then handed to
    /// the composer (spec.md §4.5, §4.8).
    pub async fn render_story(&self, story_id: i64, mode: RenderMode) -> Result<Vec<String>> {
        let story = self
            .stories
            .get(story_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("story {story_id}")))?;

        let member_ids = self.stories.members(story_id).await?;
        let mut rows = Vec::with_capacity(member_ids.len());
        for id in &member_ids {
            if let Some(row) = self.news.get(*id).await? {
                rows.push(row);
            }
        }
        rows.sort_by(|a, b| match (b.published_at, a.published_at) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.id.cmp(&a.id),
        });

        let mut items = Vec::with_capacity(rows.len());
        let mut signed = Vec::with_capacity(rows.len());
        for row in &rows {
            let tags = self.tags.tags_for_article(row.id).await?;
            let item = article_item(row, &tags);
            let fp = self.fingerprints.get(row.id).await?;
            let (title_sig, entity_sig) = match fp {
                Some(f) => (f.title_sig, f.entity_sig),
                None => (String::new(), None),
            };
            signed.push(SignedArticle {
                id: row.id,
                title_sig,
                entity_sig,
                payload: item.clone(),
            });
            items.push(item);
        }

        let (visible, _hidden) = filter_near_duplicates(&signed);
        let selected = select_story_items(&visible, &items);

        Ok(render_story_message(
            mode,
            &StoryMessageInput {
                story_title: story.title,
                items: selected,
                source: self.source.clone(),
            },
        ))
    }
}

#[async_trait]
impl MessageSource for Renderer {
    async fn render(&self, item_type: ItemType, item_id: i64, mode: RenderMode) -> anyhow::Result<Vec<String>> {
        let chunks = match item_type {
            ItemType::Story => self.render_story(item_id, mode).await?,
            ItemType::Article => self.render_article(item_id, mode).await?,
        };
        Ok(chunks)
    }
}
