use regex::Regex;
use std::sync::OnceLock;

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("static regex"))
}

/// Unicode word tokens, lowercased, in surface order. Does not filter
/// stopwords — callers apply their own stopword sets (spec.md §4.4, §4.7
/// use different ones).
pub fn tokenize(text: &str) -> Vec<String> {
    word_re()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// `normalize_token` per spec.md §4.2: preserve unicode letters, lowercase,
/// replace `-`/`_` with a single space, collapse whitespace, trim
/// non-word-boundary characters.
pub fn normalize_token(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();
    let lowered = replaced.to_lowercase();

    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    collapsed
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits_on_word_boundaries() {
        assert_eq!(
            tokenize("Спартак — ЦСКА 2:1"),
            vec!["спартак", "цска", "2", "1"]
        );
    }

    #[test]
    fn normalize_token_collapses_separators() {
        assert_eq!(normalize_token("Lokomotiv-Moscow_Club"), "lokomotiv moscow club");
    }

    #[test]
    fn normalize_token_trims_non_word_boundary_chars() {
        assert_eq!(normalize_token("  «Зенит»  "), "зенит");
    }

    #[test]
    fn normalize_token_collapses_whitespace() {
        assert_eq!(normalize_token("ФК   Зенит"), "фк зенит");
    }
}
