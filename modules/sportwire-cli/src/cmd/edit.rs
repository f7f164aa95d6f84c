//! `sportwire edit` (spec.md §6, §4.11): overwrite a previously-sent message
//! in place, or append a reply-thread update under it.

use clap::Args;
use sportwire_common::config::Config;
use sportwire_common::types::ItemType;
use sportwire_store::publish::{PublishEditStore, PublishMapStore, PublishQueueStore};

#[derive(Args, Debug)]
pub struct EditArgs {
    /// "story" or "article".
    #[arg(long)]
    pub item_type: String,
    #[arg(long)]
    pub item_id: i64,
    /// New message text (no auto-render; spec.md §4.11 only auto-renders append templates).
    #[arg(long)]
    pub text: String,
    /// "html" or "markdown".
    #[arg(long)]
    pub mode: Option<String>,
    /// Append a reply-thread update instead of overwriting the anchor message.
    #[arg(long)]
    pub append: bool,
    /// Print what would be sent without dispatching to the chat platform.
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(config: &Config, args: EditArgs) -> anyhow::Result<()> {
    let item_type: ItemType = args
        .item_type
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid --item-type: {e}"))?;
    let mode = crate::cmd::parse_mode(args.mode.as_deref());

    if args.dry_run {
        println!(
            "dry-run: would {} item_type={item_type} item_id={} text={:?}",
            if args.append { "append" } else { "edit" },
            args.item_id,
            args.text
        );
        return Ok(());
    }

    let pool = crate::cmd::open_store(config).await?;
    let map = PublishMapStore::new(pool.clone());
    let queue = PublishQueueStore::new(pool.clone());
    let edits = PublishEditStore::new(pool.clone());
    let chat = crate::cmd::build_chat_client(config);

    if args.append {
        sportwire_publish::edit::append(
            chat.as_ref(),
            &map,
            &queue,
            &edits,
            config.chat.channel_id,
            item_type,
            args.item_id,
            &args.text,
            mode,
        )
        .await?;
        println!("appended: item_type={item_type} item_id={}", args.item_id);
    } else {
        sportwire_publish::edit::edit(
            chat.as_ref(),
            &map,
            &queue,
            &edits,
            config.chat.channel_id,
            item_type,
            args.item_id,
            &args.text,
            mode,
        )
        .await?;
        println!("edited: item_type={item_type} item_id={}", args.item_id);
    }

    Ok(())
}
