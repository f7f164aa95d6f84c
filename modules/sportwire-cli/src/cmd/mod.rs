//! CLI subcommands (spec.md §6), one module per `sportwire` verb.

pub mod cluster;
pub mod edit;
pub mod monitor;
pub mod publish;
pub mod scheduler;
pub mod sync;

use sportwire_common::config::Config;
use sportwire_common::error::SportwireError;
use sportwire_compose::SourceInfo;
use sportwire_publish::chat::{ChatClient, NullChatClient, TelegramChatClient};
use sportwire_store::fingerprints::FingerprintStore;
use sportwire_store::news::NewsStore;
use sportwire_store::stories::StoryStore;
use sportwire_store::tags::TagStore;
use sqlx::PgPool;

use crate::message_source::Renderer;

/// Opens a connection pool and runs migrations. Shared by every subcommand
/// so schema bootstrap and index creation stay idempotent and centralized
/// (spec.md §6 "Persisted-state layout").
pub async fn open_store(config: &Config) -> anyhow::Result<PgPool> {
    let pool = sportwire_store::db::connect(&config.database_url, 5)
        .await
        .map_err(|e| SportwireError::Store(e.to_string()))?;
    sportwire_store::db::migrate(&pool)
        .await
        .map_err(|e| SportwireError::Store(e.to_string()))?;
    Ok(pool)
}

/// Builds the store-backed message renderer shared by `publish` and
/// `scheduler` (spec.md §4.8-§4.9).
pub fn build_renderer(pool: &PgPool, config: &Config) -> Renderer {
    Renderer::new(
        NewsStore::new(pool.clone()),
        TagStore::new(pool.clone()),
        StoryStore::new(pool.clone()),
        FingerprintStore::new(pool.clone()),
        SourceInfo {
            name: config.source.name.clone(),
            root_url: config.source.root_url.clone(),
        },
    )
}

/// A real Telegram backend when credentials are configured, otherwise a
/// no-op sink for `--dry-run` invocations (spec.md §4.10).
pub fn build_chat_client(config: &Config) -> Box<dyn ChatClient> {
    if config.chat.bot_token.is_empty() {
        Box::new(NullChatClient)
    } else {
        Box::new(TelegramChatClient::new(config.chat.bot_token.clone()))
    }
}

/// Parses `html`/`markdown` into [`sportwire_compose::RenderMode`], falling
/// back to HTML for anything else (spec.md §6 `--mode html|markdown`).
pub fn parse_mode(raw: Option<&str>) -> sportwire_compose::RenderMode {
    match raw {
        Some("markdown") => sportwire_compose::RenderMode::Markdown,
        _ => sportwire_compose::RenderMode::Html,
    }
}
