//! Publish scheduler, chat dispatch, and the edit/append protocol
//! (spec.md §4.9-§4.11).

pub mod chat;
pub mod edit;
pub mod scheduler;
pub mod send;

pub use chat::{ChatClient, ChatError, NullChatClient, SendOutcome, TelegramChatClient};
pub use edit::EditError;
pub use scheduler::{telegram_parse_mode, MessageSource, Scheduler};
