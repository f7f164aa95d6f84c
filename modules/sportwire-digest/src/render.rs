use chrono::{DateTime, Utc};
use sportwire_compose::{chunk_message, RenderMode};

use crate::scoring::ScoredStory;

const CHUNK_LIMIT: usize = 4096;

fn period_label(period: &str) -> &str {
    match period {
        "daily" => "Дайджест за день",
        "weekly" => "Дайджест за неделю",
        other => other,
    }
}

fn escape(mode: RenderMode, text: &str) -> String {
    sportwire_compose::escape::escape(mode, text)
}

fn item_line(mode: RenderMode, rank: usize, story: &ScoredStory) -> String {
    format!(
        "{}. {} — {} материалов, счёт {:.1}",
        rank,
        escape(mode, &story.title),
        story.article_count,
        story.score
    )
}

/// Renders the digest overview (header line) plus chunked item bodies in
/// one render mode. The overview is meant as the thread head, the chunks as
/// the thread body (spec.md §4.12).
pub fn render(
    mode: RenderMode,
    period: &str,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    stories: &[ScoredStory],
) -> (String, Vec<String>) {
    let overview = format!(
        "{}: {} — {} ({} историй)",
        period_label(period),
        window_start.format("%Y-%m-%d %H:%M UTC"),
        window_end.format("%Y-%m-%d %H:%M UTC"),
        stories.len()
    );

    let lines: Vec<String> = stories
        .iter()
        .enumerate()
        .map(|(idx, s)| item_line(mode, idx + 1, s))
        .collect();

    let body = if lines.is_empty() {
        vec!["(за этот период ничего не набрало достаточный счёт)".to_string()]
    } else {
        chunk_message(&lines, CHUNK_LIMIT)
    };

    (overview, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn story(id: i64, score: f64) -> ScoredStory {
        ScoredStory {
            story_id: id,
            title: format!("Story {id}"),
            article_count: 4,
            score,
        }
    }

    #[test]
    fn renders_overview_with_story_count() {
        let now = Utc::now();
        let (overview, body) = render(RenderMode::Html, "daily", now - Duration::days(1), now, &[story(1, 5.0)]);
        assert!(overview.contains("1 историй"));
        assert_eq!(body.len(), 1);
        assert!(body[0].contains("Story 1"));
    }

    #[test]
    fn empty_digest_renders_placeholder_body() {
        let now = Utc::now();
        let (_overview, body) = render(RenderMode::Markdown, "weekly", now - Duration::days(7), now, &[]);
        assert_eq!(body.len(), 1);
    }
}
