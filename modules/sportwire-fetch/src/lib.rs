//! HTTP/HTML fetcher (spec.md §4.1): a scoped session over a pure-HTTP
//! client, paginated listing fetch and article-detail fetch against one
//! source's markup (selectors live in `selectors.rs`; the exact DOM shape
//! is the out-of-scope "external collaborator" per spec.md §1 — this
//! module is the generic `fetch(url) -> HTML` capability plus extraction
//! against configurable selectors, not a hardcoded site integration).

pub mod error;
pub mod model;
pub mod selectors;
pub mod session;

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use sportwire_common::retry::{retry_transient, MAX_ATTEMPTS};
use tracing::{debug, warn};

pub use error::{FetchError, Result};
pub use model::{ArticleDraft, ListGroup, ListItem, RawListPage, TagRef};
pub use selectors::{ArticleSelectors, ListingSelectors, BODY_STOP_PHRASES};
pub use session::SessionPool;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(25);
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// The core contract spec.md §4.1 asks for: `fetch_listing` and
/// `fetch_article`. A test double can implement this without touching the
/// network; `HttpFetcher` is the production implementation.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_listing(&self, base_url: &str, page_index: u32) -> Result<RawListPage>;
    async fn fetch_article(&self, url: &str) -> Result<ArticleDraft>;
}

/// `reqwest`-backed fetcher. Acquires a `SessionPool` permit for the
/// duration of each call (released on every exit path, including panics,
/// via the permit's `Drop`) and retries transient failures with jittered
/// backoff up to `MAX_ATTEMPTS` (spec.md §4.1, §7).
pub struct HttpFetcher {
    client: reqwest::Client,
    session: SessionPool,
    listing: ListingSelectors,
    article: ArticleSelectors,
}

impl HttpFetcher {
    pub fn new(session: SessionPool, listing: ListingSelectors, article: ArticleSelectors) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("sportwire-fetch/0.1")
            .build()
            .map_err(|e| FetchError::Permanent(e.to_string()))?;
        Ok(Self {
            client,
            session,
            listing,
            article,
        })
    }

    async fn get_html(&self, url: &str) -> Result<String> {
        let _session = self.session.acquire().await;

        retry_transient(
            RETRY_BASE_DELAY,
            || async {
                let resp = self.client.get(url).send().await.map_err(|e| {
                    if e.is_timeout() || e.is_connect() {
                        FetchError::Transient(e.to_string())
                    } else {
                        FetchError::Permanent(e.to_string())
                    }
                })?;

                let status = resp.status();
                if status.is_server_error() || status.as_u16() == 429 {
                    return Err(FetchError::Transient(format!("http {status}")));
                }
                if !status.is_success() {
                    return Err(FetchError::Permanent(format!("http {status}")));
                }

                resp.text()
                    .await
                    .map_err(|e| FetchError::Transient(e.to_string()))
            },
            FetchError::is_transient,
        )
        .await
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_listing(&self, base_url: &str, page_index: u32) -> Result<RawListPage> {
        let url = if page_index <= 1 {
            base_url.to_string()
        } else {
            format!("{}?page={}", base_url.trim_end_matches('/'), page_index)
        };
        let html = self.get_html(&url).await?;
        parse_listing(&html, &self.listing)
    }

    async fn fetch_article(&self, url: &str) -> Result<ArticleDraft> {
        let html = self.get_html(url).await?;
        parse_article(&html, url, &self.article)
    }
}

fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| FetchError::Permanent(format!("bad selector {raw:?}: {e:?}")))
}

/// Extracts `ListGroup`s from a listing page. A missing date-group
/// selector is a permanent error (spec.md §4.1: "selector miss" fails
/// the call); a page with zero groups is not itself an error — the
/// caller (`sync`) treats empty pages as end-of-pagination.
fn parse_listing(html: &str, sel: &ListingSelectors) -> Result<RawListPage> {
    let doc = Html::parse_document(html);
    let group_sel = parse_selector(&sel.date_group)?;
    let item_sel = parse_selector(&sel.item_class)?;
    let time_sel = parse_selector(&sel.time)?;
    let link_sel = parse_selector(&sel.article_link)?;

    let mut groups = Vec::new();
    for group_el in doc.select(&group_sel) {
        let date_label = group_el.text().collect::<String>().trim().to_string();
        if date_label.is_empty() {
            continue;
        }

        let mut items = Vec::new();
        for item_el in group_el.select(&item_sel) {
            let Some(link) = item_el.select(&link_sel).next() else {
                continue;
            };
            let Some(relative_url) = link.value().attr("href") else {
                continue;
            };
            let title = link.text().collect::<String>().trim().to_string();
            let time_label = item_el
                .select(&time_sel)
                .next()
                .map(|t| t.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            if title.is_empty() {
                continue;
            }
            items.push(ListItem {
                relative_url: relative_url.to_string(),
                title,
                time_label,
            });
        }

        if !items.is_empty() {
            groups.push(ListGroup { date_label, items });
        }
    }

    if groups.is_empty() {
        debug!("listing page produced zero groups");
    }
    Ok(RawListPage { groups })
}

/// Extracts an `ArticleDraft`. Missing title or body container is a
/// permanent error (spec.md §4.1 "selector miss"); the body text is cut
/// at the first `BODY_STOP_PHRASES` match to drop related-content cruft.
fn parse_article(html: &str, url: &str, sel: &ArticleSelectors) -> Result<ArticleDraft> {
    let doc = Html::parse_document(html);
    let title_sel = parse_selector(&sel.title)?;
    let body_sel = parse_selector(&sel.body_container)?;
    let tags_sel = parse_selector(&sel.tags)?;
    let images_sel = parse_selector(&sel.images)?;
    let videos_sel = parse_selector(&sel.videos)?;

    let title = doc
        .select(&title_sel)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FetchError::Permanent("missing title selector match".to_string()))?;

    let raw_body = doc
        .select(&body_sel)
        .next()
        .map(|e| e.text().collect::<Vec<_>>().join("\n"))
        .ok_or_else(|| FetchError::Permanent("missing body selector match".to_string()))?;

    let body = truncate_at_stop_phrase(&raw_body);

    let tags = doc
        .select(&tags_sel)
        .filter_map(|el| {
            let name = el.text().collect::<String>().trim().to_string();
            if name.is_empty() {
                None
            } else {
                Some(TagRef {
                    name,
                    url: el.value().attr("href").map(str::to_string),
                })
            }
        })
        .collect();

    let images = doc
        .select(&images_sel)
        .filter_map(|el| el.value().attr("src").map(str::to_string))
        .collect();
    let videos = doc
        .select(&videos_sel)
        .filter_map(|el| el.value().attr("src").map(str::to_string))
        .collect();

    let canonical_url = sportwire_normalize::normalize_url(url).unwrap_or_else(|| {
        warn!(url, "could not normalize article url, keeping raw");
        url.to_string()
    });

    Ok(ArticleDraft {
        title,
        canonical_url,
        body,
        tags,
        images,
        videos,
    })
}

fn truncate_at_stop_phrase(body: &str) -> String {
    let mut cut = body.len();
    for phrase in BODY_STOP_PHRASES {
        if let Some(pos) = body.find(phrase) {
            cut = cut.min(pos);
        }
    }
    body[..cut].trim().to_string()
}

/// Walks listing pages from 1 upward, stopping either at `max_pages` or
/// the page containing `anchor_url` (inclusive) — the "incremental
/// crawler" anchoring behavior spec.md §1/§6 describes for `sync`.
pub async fn crawl_incremental<F: Fetcher + ?Sized>(
    fetcher: &F,
    base_url: &str,
    max_pages: u32,
    anchor_url: Option<&str>,
) -> Result<Vec<(String, ListItem)>> {
    let mut out = Vec::new();
    for page in 1..=max_pages.max(1) {
        let page_result = fetcher.fetch_listing(base_url, page).await;
        let list = match page_result {
            Ok(list) => list,
            Err(FetchError::Permanent(msg)) => {
                warn!(page, error = %msg, "permanent listing failure, stopping crawl");
                break;
            }
            Err(e) => return Err(e),
        };

        if list.groups.is_empty() {
            break;
        }

        let mut hit_anchor = false;
        for group in list.groups {
            for item in group.items {
                if Some(item.relative_url.as_str()) == anchor_url {
                    hit_anchor = true;
                    break;
                }
                out.push((group.date_label.clone(), item));
            }
            if hit_anchor {
                break;
            }
        }
        if hit_anchor {
            break;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors() -> (ListingSelectors, ArticleSelectors) {
        (
            ListingSelectors {
                date_group: "div.group".to_string(),
                item_class: "div.item".to_string(),
                time: "span.time".to_string(),
                article_link: "a".to_string(),
            },
            ArticleSelectors {
                title: "h1".to_string(),
                body_container: "div.body".to_string(),
                tags: "a.tag".to_string(),
                images: "img".to_string(),
                videos: "video".to_string(),
            },
        )
    }

    #[test]
    fn parses_listing_groups_and_items() {
        let (listing, _) = selectors();
        let html = r#"
            <div class="group">
                <h2>1 сентября 2025</h2>
                <div class="item"><a href="/news/1.html">Зенит выиграл</a><span class="time">21:50</span></div>
                <div class="item"><a href="/news/2.html">Спартак проиграл</a><span class="time">22:10</span></div>
            </div>
        "#;
        let page = parse_listing(html, &listing).unwrap();
        assert_eq!(page.groups.len(), 1);
        assert_eq!(page.groups[0].items.len(), 2);
        assert_eq!(page.groups[0].items[0].time_label, "21:50");
    }

    #[test]
    fn parses_article_and_truncates_at_stop_phrase() {
        let (_, article) = selectors();
        let html = r#"
            <html><body>
                <h1>Зенит обыграл Спартак</h1>
                <div class="body">Основной текст статьи.
Материалы по теме
Ссылка на другую статью</div>
                <a class="tag" href="/team/zenit">Зенит</a>
                <img src="https://site.ru/img1.jpg" />
            </body></html>
        "#;
        let draft = parse_article(html, "https://site.ru/news/1.html", &article).unwrap();
        assert_eq!(draft.title, "Зенит обыграл Спартак");
        assert!(draft.body.contains("Основной текст статьи."));
        assert!(!draft.body.contains("Материалы по теме"));
        assert_eq!(draft.tags.len(), 1);
        assert_eq!(draft.images.len(), 1);
    }

    #[test]
    fn missing_title_is_permanent_error() {
        let (_, article) = selectors();
        let html = r#"<html><body><div class="body">text</div></body></html>"#;
        let err = parse_article(html, "https://site.ru/news/1.html", &article).unwrap_err();
        assert!(matches!(err, FetchError::Permanent(_)));
    }

    #[test]
    fn retry_const_is_three() {
        assert_eq!(MAX_ATTEMPTS, 3);
    }
}
