//! `sportwire scheduler` (spec.md §6, §4.9): the queued, rate-limited
//! publish loop — enqueue recently updated stories, then tick
//! `publish_queue` until it is empty or a cap/quiet-hours rule defers.

use std::time::Duration;

use clap::Args;
use sportwire_common::config::Config;
use sportwire_common::types::SchedulerOutcome;
use sportwire_publish::scheduler::{MessageSource, Scheduler};
use sportwire_store::publish::{PublishMapStore, PublishQueueStore};
use sportwire_store::stories::StoryStore;
use tracing::info;

#[derive(Args, Debug)]
pub struct SchedulerArgs {
    /// Enqueue stories updated in the last N days before ticking.
    #[arg(long)]
    pub enqueue: bool,
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
    #[arg(long, default_value_t = 2)]
    pub since_days: i64,
    #[arg(long, default_value_t = 0)]
    pub priority: i32,
    /// Keep ticking until the queue reports Empty, instead of a single tick.
    #[arg(long)]
    pub drain: bool,
    /// "html" or "markdown".
    #[arg(long)]
    pub mode: Option<String>,
    /// Peek at the next-ready row and print it without dispatching or
    /// mutating `publish_queue`/`publish_map`.
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(config: &Config, args: SchedulerArgs) -> anyhow::Result<()> {
    let mode = crate::cmd::parse_mode(args.mode.as_deref());
    let pool = crate::cmd::open_store(config).await?;
    let queue = PublishQueueStore::new(pool.clone());
    let map = PublishMapStore::new(pool.clone());
    let stories = StoryStore::new(pool.clone());
    let renderer = crate::cmd::build_renderer(&pool, config);

    if args.dry_run {
        let Some(row) = queue.select_next_ready(chrono::Utc::now()).await? else {
            println!("empty: no ready queue row");
            return Ok(());
        };
        let chunks = renderer.render(row.item_type(), row.item_id, mode).await?;
        println!(
            "dry-run: queue_id={} item_type={} item_id={} chunks={}",
            row.id,
            row.item_type(),
            row.item_id,
            chunks.len()
        );
        for (i, chunk) in chunks.iter().enumerate() {
            println!("--- chunk {} ---\n{chunk}", i + 1);
        }
        return Ok(());
    }

    let chat = crate::cmd::build_chat_client(config);
    let scheduler = Scheduler {
        queue: &queue,
        map: &map,
        chat: chat.as_ref(),
        source: &renderer,
        config: &config.scheduler,
        chat_id: config.chat.channel_id,
        mode,
    };

    if args.enqueue {
        let enqueued = scheduler
            .enqueue_recent_stories(&stories, args.limit, args.since_days, args.priority, None)
            .await?;
        info!(enqueued, "enqueued recent stories");
        println!("enqueued={enqueued}");
    }

    loop {
        let outcome = scheduler.process_once().await?;
        println!("tick: {outcome}");
        if !args.drain {
            break;
        }
        match outcome {
            SchedulerOutcome::Empty
            | SchedulerOutcome::Quiet
            | SchedulerOutcome::IntervalCapReached
            | SchedulerOutcome::HourCapReached
            | SchedulerOutcome::DayCapReached => break,
            SchedulerOutcome::Sent | SchedulerOutcome::Error | SchedulerOutcome::Dedup => {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }

    Ok(())
}
