/// CSS selectors for one source's listing markup, the Rust-side counterpart
/// of `parsers/champ_parser.py`'s `config["parser"]` dict.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub date_group: String,
    pub item_class: String,
    pub time: String,
    pub article_link: String,
}

/// CSS selectors for one source's article markup.
#[derive(Debug, Clone)]
pub struct ArticleSelectors {
    pub title: String,
    pub body_container: String,
    pub tags: String,
    pub images: String,
    pub videos: String,
}

/// Plain-text markers that end the scraped article body — everything from
/// the first match onward is "related content" cruft, not the article
/// itself (`champ_parser.py::fetch_article`'s decompose loop).
pub const BODY_STOP_PHRASES: &[&str] = &[
    "Материалы по теме",
    "Сейчас читают",
    "Источник",
    "Читайте также",
];
