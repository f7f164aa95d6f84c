use std::env;

/// Process-wide configuration loaded once from environment variables and
/// threaded explicitly into every component. No module holds config state
/// of its own.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,

    pub chat: ChatConfig,
    pub scheduler: SchedulerConfig,
    pub alerts: AlertConfig,
    pub digest: DigestConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub bot_token: String,
    pub channel_id: i64,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub interval_sec: u64,
    pub max_per_hour: u32,
    pub max_per_day: u32,
    /// `(start_hour, end_hour)` local, wrap-around supported. `None` means no quiet hours.
    pub quiet_hours: Option<(u32, u32)>,
    pub tz: String,
    pub dedup_window_days: i64,
}

#[derive(Debug, Clone)]
pub struct AlertConfig {
    pub enabled: bool,
    pub news_min_1h: u64,
    pub queue_max: u64,
    pub sent_min_24h: u64,
    pub chat_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub default_limit: u32,
    pub thread_chunk: usize,
}

/// Describes one source portal's markup so `sportwire-fetch` never hardcodes
/// a site (spec.md §4.1 "external collaborator"). Selectors default to the
/// `championat.com`-style date-grouped listing markup used throughout this
/// crate's fixtures; override per-deployment via env.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub name: String,
    pub base_url: String,
    pub root_url: String,
    pub listing_date_group: String,
    pub listing_item_class: String,
    pub listing_time: String,
    pub listing_article_link: String,
    pub article_title: String,
    pub article_body_container: String,
    pub article_tags: String,
    pub article_images: String,
    pub article_videos: String,
}

impl SourceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            name: env::var("SOURCE_NAME").unwrap_or_else(|_| "championat.com".to_string()),
            base_url: required_env("SOURCE_BASE_URL")?,
            root_url: env::var("SOURCE_ROOT_URL").unwrap_or_else(|_| "https://www.championat.com".to_string()),
            listing_date_group: env::var("SOURCE_LISTING_DATE_GROUP").unwrap_or_else(|_| "div.news-item-list".to_string()),
            listing_item_class: env::var("SOURCE_LISTING_ITEM_CLASS").unwrap_or_else(|_| "div.news-item".to_string()),
            listing_time: env::var("SOURCE_LISTING_TIME").unwrap_or_else(|_| "span.news-item__time".to_string()),
            listing_article_link: env::var("SOURCE_LISTING_ARTICLE_LINK").unwrap_or_else(|_| "a".to_string()),
            article_title: env::var("SOURCE_ARTICLE_TITLE").unwrap_or_else(|_| "h1".to_string()),
            article_body_container: env::var("SOURCE_ARTICLE_BODY").unwrap_or_else(|_| "div.article-content".to_string()),
            article_tags: env::var("SOURCE_ARTICLE_TAGS").unwrap_or_else(|_| "a.article-tags__link".to_string()),
            article_images: env::var("SOURCE_ARTICLE_IMAGES").unwrap_or_else(|_| "img".to_string()),
            article_videos: env::var("SOURCE_ARTICLE_VIDEOS").unwrap_or_else(|_| "video".to_string()),
        })
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_sec: 300,
            max_per_hour: 8,
            max_per_day: 40,
            quiet_hours: None,
            tz: "UTC".to_string(),
            dedup_window_days: 3,
        }
    }
}

impl Config {
    /// Load full configuration from the environment. Fails fast with a clear
    /// message on missing/invalid required values (spec.md §7 ConfigError).
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required_env("DATABASE_URL")?,
            chat: ChatConfig::from_env()?,
            scheduler: SchedulerConfig::from_env()?,
            alerts: AlertConfig::from_env()?,
            digest: DigestConfig::from_env()?,
            source: SourceConfig::from_env()?,
        })
    }

    /// Load a config suitable for `--dry-run` / read-only CLI invocations:
    /// chat credentials are optional since no dispatch will occur.
    pub fn from_env_dry_run() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required_env("DATABASE_URL")?,
            chat: ChatConfig::from_env().unwrap_or(ChatConfig {
                bot_token: String::new(),
                channel_id: 0,
            }),
            scheduler: SchedulerConfig::from_env()?,
            alerts: AlertConfig::from_env()?,
            digest: DigestConfig::from_env()?,
            source: SourceConfig::from_env().unwrap_or(SourceConfig {
                name: "championat.com".to_string(),
                base_url: String::new(),
                root_url: "https://www.championat.com".to_string(),
                listing_date_group: "div.news-item-list".to_string(),
                listing_item_class: "div.news-item".to_string(),
                listing_time: "span.news-item__time".to_string(),
                listing_article_link: "a".to_string(),
                article_title: "h1".to_string(),
                article_body_container: "div.article-content".to_string(),
                article_tags: "a.article-tags__link".to_string(),
                article_images: "img".to_string(),
                article_videos: "video".to_string(),
            }),
        })
    }
}

impl ChatConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            bot_token: required_env("TG_BOT_TOKEN")?,
            channel_id: required_env("TG_CHANNEL_ID")?.parse()?,
        })
    }
}

impl SchedulerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let quiet_hours = match env::var("PUBLISH_QUIET_HOURS") {
            Ok(raw) if !raw.trim().is_empty() => parse_quiet_hours(&raw).or_else(|| {
                tracing::warn!(value = %raw, "invalid PUBLISH_QUIET_HOURS, ignoring");
                None
            }),
            _ => None,
        };

        Ok(Self {
            interval_sec: env_or("PUBLISH_INTERVAL_SEC", 300)?,
            max_per_hour: env_or("PUBLISH_MAX_PER_HOUR", 8)?,
            max_per_day: env_or("PUBLISH_MAX_PER_DAY", 40)?,
            quiet_hours,
            tz: env::var("TZ").unwrap_or_else(|_| "UTC".to_string()),
            dedup_window_days: env_or("DEDUP_WINDOW_DAYS", 3)?,
        })
    }
}

impl AlertConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            enabled: env::var("ALERT_ENABLED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            news_min_1h: env_or("ALERT_NEWS_MIN_1H", 1)?,
            queue_max: env_or("ALERT_QUEUE_MAX", 200)?,
            sent_min_24h: env_or("ALERT_SENT_MIN_24H", 1)?,
            chat_id: env::var("ALERT_CHAT_ID").ok().and_then(|v| v.parse().ok()),
        })
    }
}

impl DigestConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            default_limit: env_or("DIGEST_DEFAULT_LIMIT", 10)?,
            thread_chunk: env_or("DIGEST_THREAD_CHUNK", 5usize)?,
        })
    }
}

fn parse_quiet_hours(raw: &str) -> Option<(u32, u32)> {
    let (start, end) = raw.split_once('-')?;
    let start: u32 = start.trim().parse().ok()?;
    let end: u32 = end.trim().parse().ok()?;
    Some((start, end))
}

fn required_env(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("{key} environment variable is required"))
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
        Err(_) => Ok(default),
    }
}

/// Quiet-hour rule per spec.md §4.9: `start==end` never quiet, `start<end`
/// quiet when `start <= hour < end`, `start>end` wraps past midnight.
pub fn is_quiet(hour: u32, quiet_hours: Option<(u32, u32)>) -> bool {
    let Some((start, end)) = quiet_hours else {
        return false;
    };
    if start == end {
        return false;
    }
    if start < end {
        start <= hour && hour < end
    } else {
        hour >= start || hour < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_hours_equal_never_quiet() {
        assert!(!is_quiet(5, Some((10, 10))));
        assert!(!is_quiet(10, Some((10, 10))));
    }

    #[test]
    fn quiet_hours_normal_range() {
        assert!(!is_quiet(7, Some((8, 20))));
        assert!(is_quiet(8, Some((8, 20))));
        assert!(is_quiet(19, Some((8, 20))));
        assert!(!is_quiet(20, Some((8, 20))));
    }

    #[test]
    fn quiet_hours_wraps_midnight() {
        assert!(is_quiet(23, Some((22, 6))));
        assert!(is_quiet(2, Some((22, 6))));
        assert!(!is_quiet(6, Some((22, 6))));
        assert!(!is_quiet(21, Some((22, 6))));
    }

    #[test]
    fn quiet_hours_none_never_quiet() {
        assert!(!is_quiet(3, None));
    }

    #[test]
    fn parses_quiet_hours_string() {
        assert_eq!(parse_quiet_hours("8-20"), Some((8, 20)));
        assert_eq!(parse_quiet_hours("22-6"), Some((22, 6)));
        assert_eq!(parse_quiet_hours("not-a-range"), None);
    }
}
