//! Message composer (spec.md §4.8): renders a story or single article into
//! chunked chat messages in HTML or lightweight-markdown mode.

pub mod chunk;
pub mod escape;
pub mod message;

pub use chunk::chunk_message;
pub use escape::RenderMode;
pub use message::{
    render_article_message, render_story_message, select_story_items, ArticleItem,
    ArticleMessageInput, SourceInfo, StoryMessageInput, TypedTag, MAX_STORY_ITEMS, MIN_STORY_ITEMS,
};
