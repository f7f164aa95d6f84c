//! `sportwire monitor` (spec.md §6, §2 item 12): snapshot pipeline health —
//! recent ingest rate, queue depth, recent send rate — evaluate alert
//! thresholds, and persist the snapshot to `monitor_logs`.

use chrono::{Duration, Utc};
use clap::Args;
use sportwire_common::config::Config;
use sportwire_common::metrics::{evaluate_alerts, MetricsSnapshot};
use sportwire_store::monitor::MonitorStore;
use sportwire_store::news::NewsStore;
use sportwire_store::publish::PublishQueueStore;
use tracing::warn;

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Window, in hours, for the ingest-rate metric (spec.md §2 alert
    /// `news_min_1h` is evaluated over this window).
    #[arg(long, default_value_t = 1)]
    pub since_hours: i64,
    /// Skip writing the snapshot to `monitor_logs`.
    #[arg(long)]
    pub no_record: bool,
}

pub async fn run(config: &Config, args: MonitorArgs) -> anyhow::Result<()> {
    let pool = crate::cmd::open_store(config).await?;
    let news = NewsStore::new(pool.clone());
    let queue = PublishQueueStore::new(pool.clone());
    let monitor = MonitorStore::new(pool.clone());

    let now = Utc::now();
    let ingested = news.count_ingested_since(now - Duration::hours(args.since_hours)).await?;
    let queue_depth = queue.depth().await?;
    let sent_24h = queue.count_sent_since(now - Duration::days(1)).await?;

    let snapshot = MetricsSnapshot {
        ingested: ingested.max(0) as u64,
        tag_links: 0,
        clustered_stories: 0,
        queue_depth: queue_depth.max(0) as u64,
        sent: sent_24h.max(0) as u64,
        rate_limit_hits: 0,
        dispatch_errors: 0,
    };

    println!(
        "ingested_{}h={} queue_depth={} sent_24h={}",
        args.since_hours, snapshot.ingested, snapshot.queue_depth, snapshot.sent
    );

    let breaches = evaluate_alerts(&snapshot, &config.alerts);
    for breach in &breaches {
        warn!(metric = breach.metric, value = breach.value, threshold = breach.threshold, "{}", breach.message);
        println!("ALERT: {}", breach.message);
    }
    if breaches.is_empty() && config.alerts.enabled {
        println!("alerts: none");
    }

    if !args.no_record {
        monitor.record(now, "ingested", snapshot.ingested as f64, None).await?;
        monitor.record(now, "queue_depth", snapshot.queue_depth as f64, None).await?;
        monitor.record(now, "sent_24h", snapshot.sent as f64, None).await?;
    }

    Ok(())
}
