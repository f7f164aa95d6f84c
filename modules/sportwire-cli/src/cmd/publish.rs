//! `sportwire publish` (spec.md §6, §4.8): the manual/secondary publish
//! path — render one story or article and dispatch it directly, bypassing
//! `publish_queue` (the scheduler owns the primary, queued path; see
//! `cmd::scheduler`).

use clap::Args;
use sportwire_common::config::Config;
use sportwire_common::types::ItemType;
use sportwire_publish::scheduler::telegram_parse_mode;
use sportwire_publish::send;
use sportwire_store::publish::PublishMapStore;

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// "story" or "article".
    #[arg(long)]
    pub item_type: String,
    #[arg(long)]
    pub item_id: i64,
    /// Actually dispatch to the chat platform; otherwise only render and print.
    #[arg(long)]
    pub send: bool,
    /// "html" or "markdown" (spec.md §6).
    #[arg(long)]
    pub mode: Option<String>,
    /// Publish even if a publish_map row already exists for this item.
    #[arg(long)]
    pub force: bool,
}

pub async fn run(config: &Config, args: PublishArgs) -> anyhow::Result<()> {
    let item_type: ItemType = args
        .item_type
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid --item-type: {e}"))?;
    let mode = crate::cmd::parse_mode(args.mode.as_deref());

    let pool = crate::cmd::open_store(config).await?;
    let map = PublishMapStore::new(pool.clone());

    if !args.force {
        if let Some(existing) = map.get(item_type, args.item_id).await? {
            println!(
                "already published: item_type={item_type} item_id={} message_id={}",
                args.item_id, existing.message_id
            );
            return Ok(());
        }
    }

    let renderer = crate::cmd::build_renderer(&pool, config);
    let chunks = match item_type {
        ItemType::Story => renderer.render_story(args.item_id, mode).await?,
        ItemType::Article => renderer.render_article(args.item_id, mode).await?,
    };

    if !args.send {
        for (i, chunk) in chunks.iter().enumerate() {
            println!("--- chunk {} ---\n{chunk}", i + 1);
        }
        println!("dry-run: {} chunk(s) rendered, not sent", chunks.len());
        return Ok(());
    }

    let chat = crate::cmd::build_chat_client(config);
    let parse_mode = telegram_parse_mode(mode);
    let first = send::send_text(chat.as_ref(), config.chat.channel_id, &chunks[0], parse_mode, None, false).await?;
    for chunk in &chunks[1..] {
        send::reply_text(chat.as_ref(), config.chat.channel_id, first.message_id, chunk, parse_mode).await?;
    }

    map.upsert(item_type, args.item_id, first.message_id, &chunks[0], &mode.to_string())
        .await?;

    println!(
        "published: item_type={item_type} item_id={} message_id={} chunks={}",
        args.item_id,
        first.message_id,
        chunks.len()
    );
    Ok(())
}
