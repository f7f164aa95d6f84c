use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Timelike, Utc};
use sportwire_common::config::{is_quiet, SchedulerConfig};
use sportwire_common::types::{ItemType, QueueStatus, SchedulerOutcome};
use sportwire_compose::RenderMode;
use sportwire_store::publish::{PublishMapStore, PublishQueueStore};
use sportwire_store::stories::StoryStore;
use tracing::{info, warn};

use crate::chat::ChatClient;
use crate::send;

/// Renders a queued `(item_type, item_id)` into one or more chat-ready
/// chunks. Implemented by the CLI layer, which knows how to assemble a
/// [`sportwire_compose::StoryMessageInput`]/`ArticleMessageInput` from the
/// store; the scheduler itself stays ignorant of how messages are built
/// (spec.md §5 keeps the scheduler a thin loop over `process_once`).
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn render(&self, item_type: ItemType, item_id: i64, mode: RenderMode) -> anyhow::Result<Vec<String>>;
}

pub struct Scheduler<'a> {
    pub queue: &'a PublishQueueStore,
    pub map: &'a PublishMapStore,
    pub chat: &'a dyn ChatClient,
    pub source: &'a dyn MessageSource,
    pub config: &'a SchedulerConfig,
    pub chat_id: i64,
    pub mode: RenderMode,
}

impl<'a> Scheduler<'a> {
    /// Enqueues every story updated within `since_days`, skipping one that
    /// already has an active queue row within the dedup window
    /// (spec.md §4.9 `enqueue_recent_stories`).
    pub async fn enqueue_recent_stories(
        &self,
        stories: &StoryStore,
        limit: usize,
        since_days: i64,
        priority: i32,
        scheduled_at: Option<chrono::DateTime<Utc>>,
    ) -> anyhow::Result<usize> {
        let cutoff = Utc::now() - ChronoDuration::days(since_days);
        let dedup_cutoff = Utc::now() - ChronoDuration::days(self.config.dedup_window_days);

        let rows = stories.updated_since(cutoff).await?;
        let mut enqueued = 0;
        for row in rows.into_iter().take(limit) {
            let dedup_key = format!("story:{}", row.id);
            if self.queue.has_recent_dedup_match(&dedup_key, dedup_cutoff).await? {
                info!(story_id = row.id, "dedup");
                continue;
            }
            self.queue
                .insert(ItemType::Story, row.id, priority, scheduled_at, &dedup_key)
                .await?;
            enqueued += 1;
        }
        Ok(enqueued)
    }

    /// One scheduler tick per spec.md §4.9: pick the next ready row, apply
    /// the rate-limit gate, dispatch through composer + chat, record the
    /// outcome. Deferred rows are left `queued` in place — they are not
    /// re-ordered or penalized for having been skipped.
    pub async fn process_once(&self) -> anyhow::Result<SchedulerOutcome> {
        let now = Utc::now();
        let local_hour = now.with_timezone(&chrono::Local).hour();
        if is_quiet(local_hour, self.config.quiet_hours) {
            return Ok(SchedulerOutcome::Quiet);
        }

        let Some(row) = self.queue.select_next_ready(now).await? else {
            return Ok(SchedulerOutcome::Empty);
        };
        debug_assert_eq!(row.status(), QueueStatus::Queued);

        if let Some(last_sent) = self.queue.last_sent_at().await? {
            let interval = ChronoDuration::seconds(self.config.interval_sec as i64);
            if now - last_sent < interval {
                return Ok(SchedulerOutcome::IntervalCapReached);
            }
        }

        let hour_count = self.queue.count_sent_since(now - ChronoDuration::hours(1)).await?;
        if hour_count as u32 >= self.config.max_per_hour {
            return Ok(SchedulerOutcome::HourCapReached);
        }

        let day_count = self.queue.count_sent_since(now - ChronoDuration::days(1)).await?;
        if day_count as u32 >= self.config.max_per_day {
            return Ok(SchedulerOutcome::DayCapReached);
        }

        let item_type = row.item_type();
        let chunks = match self.source.render(item_type, row.item_id, self.mode).await {
            Ok(c) => c,
            Err(e) => {
                self.queue.mark_error(row.id, &e.to_string()).await?;
                warn!(queue_id = row.id, error = %e, "render failed, queue row marked error");
                return Ok(SchedulerOutcome::Error);
            }
        };

        let dispatch = self.dispatch_chunks(&chunks).await;
        match dispatch {
            Ok(message_id) => {
                self.queue.mark_sent(row.id, message_id).await?;
                self.map
                    .upsert(item_type, row.item_id, message_id, &chunks[0], &self.mode.to_string())
                    .await?;
                info!(queue_id = row.id, item_type = %item_type, item_id = row.item_id, "sent");
                Ok(SchedulerOutcome::Sent)
            }
            Err(e) => {
                self.queue.mark_error(row.id, &e.to_string()).await?;
                warn!(queue_id = row.id, error = %e, "dispatch failed, queue row marked error");
                Ok(SchedulerOutcome::Error)
            }
        }
    }

    /// Sends the first chunk, then threads every subsequent chunk as a
    /// reply to it (spec.md §4.8). Returns the first chunk's message id,
    /// which becomes the anchor `publish_map.message_id`.
    async fn dispatch_chunks(&self, chunks: &[String]) -> anyhow::Result<i64> {
        let parse_mode = telegram_parse_mode(self.mode);
        let first = send::send_text(self.chat, self.chat_id, &chunks[0], parse_mode, None, false).await?;
        for chunk in &chunks[1..] {
            send::reply_text(self.chat, self.chat_id, first.message_id, chunk, parse_mode).await?;
        }
        Ok(first.message_id)
    }
}

pub fn telegram_parse_mode(mode: RenderMode) -> &'static str {
    match mode {
        RenderMode::Html => "HTML",
        RenderMode::Markdown => "MarkdownV2",
    }
}

#[cfg(test)]
mod tests {
    use super::telegram_parse_mode;
    use sportwire_compose::RenderMode;

    #[test]
    fn parse_mode_matches_telegram_names() {
        assert_eq!(telegram_parse_mode(RenderMode::Html), "HTML");
        assert_eq!(telegram_parse_mode(RenderMode::Markdown), "MarkdownV2");
    }
}
