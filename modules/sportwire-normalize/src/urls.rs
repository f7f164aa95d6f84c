use url::Url;

/// Host aliases that are the same site under a different domain. Extend as
/// the fetcher picks up new mirrors.
const HOST_ALIASES: &[(&str, &str)] = &[];

/// Normalize a URL per spec.md §4.2: strip whitespace, upgrade scheme-relative
/// to https, lowercase host, strip `www.`, collapse site aliases, drop
/// `utm_*` query params and the fragment, trim a trailing `/` from the path.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let with_scheme = if trimmed.starts_with("//") {
        format!("https:{trimmed}")
    } else {
        trimmed.to_string()
    };

    let mut parsed = Url::parse(&with_scheme).ok()?;

    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let host = HOST_ALIASES
        .iter()
        .find(|(alias, _)| *alias == host)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(host)
        .to_string();
    parsed.set_host(Some(&host)).ok()?;

    let path = parsed.path().to_string();
    if path != "/" && path.ends_with('/') {
        let trimmed_path = path.trim_end_matches('/');
        let new_path = if trimmed_path.is_empty() { "/" } else { trimmed_path };
        parsed.set_path(new_path);
    }

    parsed.set_fragment(None);

    if let Some(query) = parsed.query() {
        if !query.is_empty() {
            let kept: Vec<(String, String)> = parsed
                .query_pairs()
                .filter(|(k, _)| !k.starts_with("utm_"))
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            if kept.is_empty() {
                parsed.set_query(None);
            } else {
                let joined: Vec<String> = kept
                    .iter()
                    .map(|(k, v)| if v.is_empty() { k.clone() } else { format!("{k}={v}") })
                    .collect();
                parsed.set_query(Some(&joined.join("&")));
            }
        }
    }

    Some(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_www_and_lowercases_host() {
        assert_eq!(
            normalize_url("https://WWW.Championat.com/news/1.html").unwrap(),
            "https://championat.com/news/1.html"
        );
    }

    #[test]
    fn drops_utm_params_and_fragment() {
        let got = normalize_url(
            "https://championat.com/news/1.html?utm_source=tg&id=5#section",
        )
        .unwrap();
        assert_eq!(got, "https://championat.com/news/1.html?id=5");
    }

    #[test]
    fn trims_trailing_slash() {
        assert_eq!(
            normalize_url("https://championat.com/news/").unwrap(),
            "https://championat.com/news"
        );
    }

    #[test]
    fn trims_trailing_slash_before_query() {
        // spec.md S1: the slash sits between the path and the query string,
        // not at the very end of the serialized URL.
        assert_eq!(
            normalize_url(
                "https://WWW.championat.com/Some/Path/?utm_source=x&id=5#frag"
            )
            .unwrap(),
            "https://championat.com/Some/Path?id=5"
        );
    }

    #[test]
    fn upgrades_scheme_relative() {
        assert_eq!(
            normalize_url("//championat.com/news/1.html").unwrap(),
            "https://championat.com/news/1.html"
        );
    }

    #[test]
    fn idempotent_on_already_normalized_url() {
        let once = normalize_url("https://championat.com/news/1.html?id=5").unwrap();
        let twice = normalize_url(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(normalize_url("   "), None);
    }
}
