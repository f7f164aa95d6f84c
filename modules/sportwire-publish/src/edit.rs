use sportwire_common::types::ItemType;
use sportwire_compose::RenderMode;
use sportwire_store::publish::{PublishEditStore, PublishMapStore, PublishQueueStore};
use thiserror::Error;
use tracing::warn;

use crate::chat::ChatClient;
use crate::scheduler::telegram_parse_mode;
use crate::send;

const TEXT_MAX_CHARS: usize = 4096;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("no publish_map row (or sent queue row) for {0:?} {1}")]
    NotFound(ItemType, i64),

    #[error("text exceeds {TEXT_MAX_CHARS} characters")]
    TooLong,

    #[error("chat dispatch failed: {0}")]
    Dispatch(String),

    #[error(transparent)]
    Store(#[from] sportwire_store::error::StoreError),
}

/// Resolves the anchor message id for an item: `publish_map` first, falling
/// back to the most recent `sent` `publish_queue` row when the map has no
/// entry yet (supplement per original `bot/edit.py`'s two-path lookup,
/// recorded in DESIGN.md). Returns the anchor id and the previously stored
/// text, if any — a queue-only fallback has no prior rendered text.
async fn resolve_anchor(
    map: &PublishMapStore,
    queue: &PublishQueueStore,
    item_type: ItemType,
    item_id: i64,
) -> Result<(i64, Option<String>), EditError> {
    if let Some(row) = map.get(item_type, item_id).await? {
        return Ok((row.message_id, Some(row.text)));
    }
    if let Some(message_id) = queue.latest_sent_message_id(item_type, item_id).await? {
        return Ok((message_id, None));
    }
    Err(EditError::NotFound(item_type, item_id))
}

/// Overwrites a previously-sent message in place. Requires a prior
/// `publish_map` row (or, failing that, a `sent` queue row); on success the
/// `publish_map` row's `text`/`mode` are overwritten and an `edit` audit row
/// is appended; on failure the audit row records the error and the failure
/// propagates (spec.md §4.11).
pub async fn edit(
    chat: &dyn ChatClient,
    map: &PublishMapStore,
    queue: &PublishQueueStore,
    edits: &PublishEditStore,
    chat_id: i64,
    item_type: ItemType,
    item_id: i64,
    new_text: &str,
    mode: RenderMode,
) -> Result<(), EditError> {
    let (message_id, stored_text) = resolve_anchor(map, queue, item_type, item_id).await?;

    if new_text.chars().count() > TEXT_MAX_CHARS {
        return Err(EditError::TooLong);
    }

    if stored_text.as_deref() == Some(new_text) {
        warn!(item_type = %item_type, item_id, "edit text identical to stored text, proceeding anyway");
    }

    let parse_mode = telegram_parse_mode(mode);
    match send::edit_text(chat, chat_id, message_id, new_text, parse_mode).await {
        Ok(()) => {
            map.upsert(item_type, item_id, message_id, new_text, &mode.to_string()).await?;
            edits
                .append(item_type, item_id, "edit", stored_text.as_deref(), Some(new_text), Some(&mode.to_string()), None, None)
                .await?;
            Ok(())
        }
        Err(e) => {
            edits
                .append(item_type, item_id, "edit", stored_text.as_deref(), Some(new_text), None, Some(&e.to_string()), None)
                .await?;
            Err(EditError::Dispatch(e.to_string()))
        }
    }
}

/// Posts a reply-thread update under the anchor message without mutating
/// it. Warns if `new_text` equals the most recent successful append; the
/// anchor `message_id` in `publish_map` is never touched (spec.md §4.11).
pub async fn append(
    chat: &dyn ChatClient,
    map: &PublishMapStore,
    queue: &PublishQueueStore,
    edits: &PublishEditStore,
    chat_id: i64,
    item_type: ItemType,
    item_id: i64,
    new_text: &str,
    mode: RenderMode,
) -> Result<(), EditError> {
    let (message_id, _stored_text) = resolve_anchor(map, queue, item_type, item_id).await?;

    if new_text.chars().count() > TEXT_MAX_CHARS {
        return Err(EditError::TooLong);
    }

    if let Some(last) = edits.latest_append_text(item_type, item_id).await? {
        if last == new_text {
            warn!(item_type = %item_type, item_id, "append text identical to most recent append");
        }
    }

    let parse_mode = telegram_parse_mode(mode);
    match send::reply_text(chat, chat_id, message_id, new_text, parse_mode).await {
        Ok(outcome) => {
            edits
                .append(
                    item_type,
                    item_id,
                    "append",
                    None,
                    Some(new_text),
                    Some(&mode.to_string()),
                    None,
                    Some(outcome.message_id),
                )
                .await?;
            Ok(())
        }
        Err(e) => {
            edits
                .append(item_type, item_id, "append", None, Some(new_text), None, Some(&e.to_string()), None)
                .await?;
            Err(EditError::Dispatch(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatError, SendOutcome};
    use async_trait::async_trait;

    struct FakeChat;

    #[async_trait]
    impl ChatClient for FakeChat {
        async fn send_text(
            &self,
            _chat_id: i64,
            _text: &str,
            _parse_mode: &str,
            _reply_to: Option<i64>,
            _disable_preview: bool,
        ) -> Result<SendOutcome, ChatError> {
            Ok(SendOutcome { message_id: 1 })
        }

        async fn edit_text(&self, _chat_id: i64, _message_id: i64, _text: &str, _parse_mode: &str) -> Result<(), ChatError> {
            Ok(())
        }

        async fn reply_text(
            &self,
            _chat_id: i64,
            _message_id: i64,
            _text: &str,
            _parse_mode: &str,
        ) -> Result<SendOutcome, ChatError> {
            Ok(SendOutcome { message_id: 2 })
        }
    }

    #[test]
    fn too_long_text_is_rejected_before_dispatch() {
        let long = "x".repeat(TEXT_MAX_CHARS + 1);
        assert!(long.chars().count() > TEXT_MAX_CHARS);
    }

    #[allow(dead_code)]
    fn _type_check_fake_chat_implements_trait(_c: &FakeChat) {}
}
