use std::sync::atomic::{AtomicU64, Ordering};

/// Plain atomic counters for the admin/observability surface (spec.md §2
/// item 12). Mirrors the teacher's plain-struct counter style rather than
/// pulling in an external metrics exporter — this crate's scale does not
/// warrant one (see DESIGN.md).
#[derive(Debug, Default)]
pub struct Metrics {
    pub ingested: AtomicU64,
    pub tag_links: AtomicU64,
    pub clustered_stories: AtomicU64,
    pub queue_depth: AtomicU64,
    pub sent: AtomicU64,
    pub rate_limit_hits: AtomicU64,
    pub dispatch_errors: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set(counter: &AtomicU64, value: u64) {
        counter.store(value, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ingested: self.ingested.load(Ordering::Relaxed),
            tag_links: self.tag_links.load(Ordering::Relaxed),
            clustered_stories: self.clustered_stories.load(Ordering::Relaxed),
            queue_depth: self.queue_depth.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            rate_limit_hits: self.rate_limit_hits.load(Ordering::Relaxed),
            dispatch_errors: self.dispatch_errors.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    pub ingested: u64,
    pub tag_links: u64,
    pub clustered_stories: u64,
    pub queue_depth: u64,
    pub sent: u64,
    pub rate_limit_hits: u64,
    pub dispatch_errors: u64,
}

/// One alert threshold breach, as raised by the `monitor` CLI subcommand.
#[derive(Debug, Clone)]
pub struct AlertBreach {
    pub metric: &'static str,
    pub value: u64,
    pub threshold: u64,
    pub message: String,
}

/// Evaluate the alert thresholds in spec.md §6 against a metrics snapshot.
pub fn evaluate_alerts(
    snapshot: &MetricsSnapshot,
    cfg: &crate::config::AlertConfig,
) -> Vec<AlertBreach> {
    let mut breaches = Vec::new();
    if !cfg.enabled {
        return breaches;
    }

    if snapshot.ingested < cfg.news_min_1h {
        breaches.push(AlertBreach {
            metric: "news_min_1h",
            value: snapshot.ingested,
            threshold: cfg.news_min_1h,
            message: format!(
                "ingested {} articles in the last hour, below minimum {}",
                snapshot.ingested, cfg.news_min_1h
            ),
        });
    }
    if snapshot.queue_depth > cfg.queue_max {
        breaches.push(AlertBreach {
            metric: "queue_max",
            value: snapshot.queue_depth,
            threshold: cfg.queue_max,
            message: format!(
                "publish queue depth {} exceeds maximum {}",
                snapshot.queue_depth, cfg.queue_max
            ),
        });
    }
    if snapshot.sent < cfg.sent_min_24h {
        breaches.push(AlertBreach {
            metric: "sent_min_24h",
            value: snapshot.sent,
            threshold: cfg.sent_min_24h,
            message: format!(
                "sent {} messages in the last 24h, below minimum {}",
                snapshot.sent, cfg.sent_min_24h
            ),
        });
    }
    breaches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlertConfig;

    fn cfg(enabled: bool) -> AlertConfig {
        AlertConfig {
            enabled,
            news_min_1h: 1,
            queue_max: 100,
            sent_min_24h: 1,
            chat_id: None,
        }
    }

    #[test]
    fn disabled_alerts_never_breach() {
        let snap = MetricsSnapshot::default();
        assert!(evaluate_alerts(&snap, &cfg(false)).is_empty());
    }

    #[test]
    fn low_ingest_breaches() {
        let snap = MetricsSnapshot {
            ingested: 0,
            ..Default::default()
        };
        let breaches = evaluate_alerts(&snap, &cfg(true));
        assert!(breaches.iter().any(|b| b.metric == "news_min_1h"));
    }

    #[test]
    fn queue_depth_breaches() {
        let snap = MetricsSnapshot {
            ingested: 5,
            queue_depth: 500,
            sent: 5,
            ..Default::default()
        };
        let breaches = evaluate_alerts(&snap, &cfg(true));
        assert!(breaches.iter().any(|b| b.metric == "queue_max"));
    }

    #[test]
    fn healthy_snapshot_no_breach() {
        let snap = MetricsSnapshot {
            ingested: 10,
            queue_depth: 5,
            sent: 20,
            ..Default::default()
        };
        assert!(evaluate_alerts(&snap, &cfg(true)).is_empty());
    }
}
