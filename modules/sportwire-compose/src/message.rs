use sportwire_common::types::TagType;

use crate::chunk::{chunk_message, truncate_chars};
use crate::escape::{bold, escape, link, RenderMode};

pub const MIN_STORY_ITEMS: usize = 3;
pub const MAX_STORY_ITEMS: usize = 5;
const TITLE_MAX_CHARS: usize = 256;
const CHUNK_LIMIT: usize = 4096;
const INDEX_EMOJI: [&str; MAX_STORY_ITEMS] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣"];

fn tag_icon(kind: TagType) -> &'static str {
    match kind {
        TagType::Sport => "🏅",
        TagType::Tournament => "🏆",
        TagType::Team => "🏟️",
        TagType::Player => "👤",
        TagType::Unknown => "🏷️",
    }
}

#[derive(Debug, Clone)]
pub struct TypedTag {
    pub kind: TagType,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ArticleItem {
    pub news_id: i64,
    pub title: String,
    pub url: String,
    /// At most 4 rendered per message; callers should order by
    /// significance (spec.md §4.8 "up-to-4 typed tags").
    pub tags: Vec<TypedTag>,
}

#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub name: String,
    pub root_url: String,
}

#[derive(Debug, Clone)]
pub struct StoryMessageInput {
    pub story_title: String,
    pub items: Vec<ArticleItem>,
    pub source: SourceInfo,
}

#[derive(Debug, Clone)]
pub struct ArticleMessageInput {
    pub article: ArticleItem,
    pub source: SourceInfo,
}

fn tag_line(mode: RenderMode, tags: &[TypedTag], limit: usize) -> String {
    tags.iter()
        .take(limit)
        .map(|t| format!("{} {}", tag_icon(t.kind), escape(mode, &t.name)))
        .collect::<Vec<_>>()
        .join(" · ")
}

fn source_line(mode: RenderMode, source: &SourceInfo) -> String {
    format!("Источник: {}", link(mode, &source.name, &source.root_url))
}

/// First-occurrence-wins item selection for a story message: keep at most
/// `MAX_STORY_ITEMS` of the already-deduplicated `visible` items; if that
/// leaves fewer than `MIN_STORY_ITEMS`, re-admit from `original_order`
/// (the pre-filter sequence, visible and hidden together) in encounter
/// order until the minimum is reached (spec.md §4.8).
pub fn select_story_items(visible: &[ArticleItem], original_order: &[ArticleItem]) -> Vec<ArticleItem> {
    let mut selected: Vec<ArticleItem> = visible.iter().take(MAX_STORY_ITEMS).cloned().collect();

    if selected.len() < MIN_STORY_ITEMS {
        let mut seen: std::collections::HashSet<i64> = selected.iter().map(|a| a.news_id).collect();
        for item in original_order {
            if selected.len() >= MIN_STORY_ITEMS {
                break;
            }
            if seen.insert(item.news_id) {
                selected.push(item.clone());
            }
        }
    }

    selected.truncate(MAX_STORY_ITEMS);
    selected
}

/// Renders a story into chunked messages (spec.md §4.8): header, up to 5
/// numbered item lines with typed tags, a footer. Chunks beyond the first
/// are meant to be sent as replies threaded on the first (the caller
/// dispatches; this crate only renders text).
pub fn render_story_message(mode: RenderMode, input: &StoryMessageInput) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("🏆 {}", bold(mode, &input.story_title)));
    lines.push(String::new());

    for (idx, item) in input.items.iter().take(MAX_STORY_ITEMS).enumerate() {
        let title = truncate_chars(&item.title, TITLE_MAX_CHARS);
        let mut line = format!("{} {}", INDEX_EMOJI[idx], link(mode, &title, &item.url));
        let tags = tag_line(mode, &item.tags, 4);
        if !tags.is_empty() {
            line.push_str(" — ");
            line.push_str(&tags);
        }
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(source_line(mode, &input.source));

    chunk_message(&lines, CHUNK_LIMIT)
}

/// Renders a single article message: title, up to 4 typed tags, URL,
/// source line (spec.md §4.8, the secondary "article" publish path).
pub fn render_article_message(mode: RenderMode, input: &ArticleMessageInput) -> Vec<String> {
    let title = truncate_chars(&input.article.title, TITLE_MAX_CHARS);
    let mut lines = vec![link(mode, &title, &input.article.url)];

    let tags = tag_line(mode, &input.article.tags, 4);
    if !tags.is_empty() {
        lines.push(tags);
    }

    lines.push(String::new());
    lines.push(source_line(mode, &input.source));

    chunk_message(&lines, CHUNK_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, title: &str) -> ArticleItem {
        ArticleItem {
            news_id: id,
            title: title.to_string(),
            url: format!("https://championat.com/news/{id}.html"),
            tags: vec![
                TypedTag {
                    kind: TagType::Team,
                    name: "Зенит".to_string(),
                },
                TypedTag {
                    kind: TagType::Player,
                    name: "Дзюба".to_string(),
                },
            ],
        }
    }

    fn source() -> SourceInfo {
        SourceInfo {
            name: "championat.com".to_string(),
            root_url: "https://championat.com".to_string(),
        }
    }

    #[test]
    fn story_message_has_header_items_and_footer() {
        let input = StoryMessageInput {
            story_title: "Зенит — победа".to_string(),
            items: vec![item(1, "Первая"), item(2, "Вторая")],
            source: source(),
        };
        let chunks = render_story_message(RenderMode::Html, &input);
        assert_eq!(chunks.len(), 1);
        let text = &chunks[0];
        assert!(text.starts_with("🏆 <b>"));
        assert!(text.contains("1️⃣"));
        assert!(text.contains("2️⃣"));
        assert!(text.contains("Источник"));
        assert!(text.contains("🏟️ Зенит · 👤 Дзюба"));
    }

    #[test]
    fn story_message_caps_at_five_items() {
        let items: Vec<ArticleItem> = (1..=8).map(|i| item(i, &format!("Новость {i}"))).collect();
        let input = StoryMessageInput {
            story_title: "Сводка".to_string(),
            items,
            source: source(),
        };
        let chunks = render_story_message(RenderMode::Html, &input);
        let text = chunks.join("\n");
        assert!(text.contains("5️⃣"));
        assert!(!text.contains("6️⃣"));
    }

    #[test]
    fn select_story_items_re_admits_to_minimum() {
        let visible = vec![item(1, "один")];
        let original = vec![item(1, "один"), item(2, "два"), item(3, "три"), item(4, "четыре")];
        let selected = select_story_items(&visible, &original);
        assert_eq!(selected.len(), MIN_STORY_ITEMS);
        assert_eq!(selected[0].news_id, 1);
    }

    #[test]
    fn select_story_items_keeps_visible_when_enough() {
        let visible = vec![item(1, "один"), item(2, "два"), item(3, "три")];
        let selected = select_story_items(&visible, &visible);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn article_message_renders_tags_and_source() {
        let input = ArticleMessageInput {
            article: item(9, "Заголовок"),
            source: source(),
        };
        let chunks = render_article_message(RenderMode::Markdown, &input);
        let text = chunks.join("\n");
        assert!(text.contains("Источник"));
        assert!(text.contains("Зенит"));
    }

    #[test]
    fn markdown_mode_escapes_title_punctuation() {
        let mut a = item(1, "Зенит: матч!");
        a.tags.clear();
        let input = ArticleMessageInput {
            article: a,
            source: source(),
        };
        let chunks = render_article_message(RenderMode::Markdown, &input);
        assert!(chunks[0].contains("Зенит: матч\\!"));
    }
}
