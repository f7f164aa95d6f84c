/// One item card inside a listing's date group: a relative article URL,
/// its headline, and the `HH:MM` label next to it (spec.md §4.1).
#[derive(Debug, Clone)]
pub struct ListItem {
    pub relative_url: String,
    pub title: String,
    pub time_label: String,
}

/// A `date_label` and the item cards published under it, as laid out on a
/// listing page (championat-style "date header, then a run of sibling
/// cards" markup — `parsers/champ_parser.py::fetch_list`).
#[derive(Debug, Clone)]
pub struct ListGroup {
    pub date_label: String,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Default)]
pub struct RawListPage {
    pub groups: Vec<ListGroup>,
}

/// An inline tag reference discovered on an article page: display name plus
/// whatever URL the site links it to, if any (spec.md §4.1's "inline tag
/// refs (name+URL)").
#[derive(Debug, Clone)]
pub struct TagRef {
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ArticleDraft {
    pub title: String,
    pub canonical_url: String,
    pub body: String,
    pub tags: Vec<TagRef>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
}
