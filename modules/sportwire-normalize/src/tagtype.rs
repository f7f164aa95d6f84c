use regex::Regex;
use sportwire_common::types::TagType;
use std::sync::OnceLock;

/// Frequent Russian football/hockey club prefixes and well-known single-word
/// club names, enough to catch most beat-reporting without a gazetteer.
const TEAM_PREFIXES: &[&str] = &[
    "фк ", "фк-", "fc ", "fc-", "fk ", "fk-", "ск ", "ск-", "hc ", "hc-", "bc ", "bc-", "хк ",
    "хк-", "бк ", "бк-", "пфк ", "сборная ", "сборная-", "лос анджелес", "лос-анджелес", "цска",
    "ак барс", "зенит", "спартак", "динамо", "локомотив", "ростов", "сочи", "крылья", "ахмат",
    "урал", "краснодар", "рубин", "амкар", "амур", "авангард", "салават", "витязь", "торпедо",
    "северсталь", "автомобилист", "адмирал", "нефтьехимик", "трактор", "химки", "оренбург",
];

const TEAM_SINGLE_NAMES: &[&str] = &[
    "крылья",
    "спартак",
    "нефтьехимик",
    "салават",
    "сочи",
    "витязь",
    "адмирал",
    "рубин",
    "северсталь",
    "локомотив",
    "автомобилист",
    "урал",
    "амкар",
    "динамо",
    "авангард",
    "амур",
    "краснодар",
    "ростов",
    "зенит",
    "ахмат",
    "торпедо",
    "цска",
];

const TEAM_CITY_PATTERNS: &[&str] = &[
    "москва",
    "санкт петербург",
    "петербург",
    "питер",
    "минск",
    "казань",
    "самара",
    "тольятти",
    "екатеринбург",
    "нижний новгород",
    "новосибирск",
    "ростов",
    "сочи",
    "уфа",
    "омск",
    "ярославль",
    "череповец",
    "нижнекамск",
    "владивосток",
    "хабаровск",
    "красноярск",
];

const TEAM_URL_HINTS: &[&str] = &[
    "/team/", "/teams/", "/club/", "/klub/", "/komanda/", "/squad/", "/roster/",
];

const PLAYER_URL_HINTS: &[&str] = &[
    "/player/",
    "/players/",
    "/igrok/",
    "/igroki/",
    "/hockeyplayer/",
    "/hockeyplayers/",
    "/footballplayer/",
    "/footballplayers/",
];

const PLAYER_ROLE_MARKERS: &[&str] = &[
    "нападающий",
    "защитник",
    "форвард",
    "полузащитник",
    "вратарь",
    "голкипер",
    "капитан",
    "снайпер",
    "striker",
    "defender",
    "forward",
    "winger",
    "goalie",
    "goalkeeper",
    "center",
    "centre",
    "center-back",
    "centre-back",
    "midfielder",
];

const PLAYER_MARKER_WINDOW: usize = 40;

fn team_abbreviation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(FC|CF|SC|HC|B|BC)\b").expect("static regex"))
}

/// `^[Upper][rest]+(\s+[Upper][rest]+){1,2}$` — a title-case two- or
/// three-token proper name (spec.md §4.3 "title-case two-or-three-token
/// name matching the person-name pattern").
fn is_person_name(candidate: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return false;
    }
    let tokens: Vec<&str> = candidate.split_whitespace().collect();
    if !(2..=3).contains(&tokens.len()) {
        return false;
    }
    tokens.iter().all(|t| {
        let mut chars = t.chars();
        match chars.next() {
            Some(first) => first.is_uppercase() && t.chars().skip(1).all(|c| c.is_alphabetic() || c == '-' || c == '\''),
            None => false,
        }
    })
}

fn split_words(s: &str) -> Vec<String> {
    s.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

fn extract_slug_fragment(url: &str) -> String {
    let path = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .and_then(|rest| rest.split_once('/').map(|(_, path)| path))
        .unwrap_or("");
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return String::new();
    }
    let slug = path.rsplit('/').next().unwrap_or("");
    let slug = slug.trim_start_matches(|c: char| c.is_ascii_digit() || c == '-' || c == '_');
    slug.replace('-', " ").trim().to_string()
}

fn matches_team_prefix(text: &str) -> bool {
    TEAM_PREFIXES.iter().any(|p| text.starts_with(p))
}

fn match_team_one_word_city(words: &[String]) -> bool {
    if !(2..=3).contains(&words.len()) {
        return false;
    }
    if !TEAM_SINGLE_NAMES.contains(&words[0].as_str()) {
        return false;
    }
    let rest = words[1..].join(" ");
    TEAM_CITY_PATTERNS.iter().any(|p| rest.starts_with(p))
}

fn guess_team(name_matchable: &str, name_words: &[String], url: Option<&str>) -> bool {
    if matches_team_prefix(name_matchable) {
        return true;
    }

    if let Some(u) = url {
        let slug = extract_slug_fragment(u);
        if !slug.is_empty() {
            let slug_matchable = slug.to_lowercase();
            if matches_team_prefix(&slug_matchable) || team_abbreviation_re().is_match(&slug) {
                return true;
            }
        }
    }

    if team_abbreviation_re().is_match(name_matchable) {
        return true;
    }

    if let Some(u) = url {
        let lowered = u.to_lowercase();
        if TEAM_URL_HINTS.iter().any(|h| lowered.contains(h)) || team_abbreviation_re().is_match(u) {
            return true;
        }
    }

    match_team_one_word_city(name_words)
}

fn has_player_marker_near(name: &str, context: &str) -> bool {
    let context_lower = context.to_lowercase();
    let name_words = split_words(&name.to_lowercase());
    if name_words.is_empty() {
        return false;
    }

    for word in &name_words {
        let mut start = 0;
        while let Some(pos) = context_lower[start..].find(word.as_str()) {
            let abs = start + pos;
            let window_start = abs.saturating_sub(PLAYER_MARKER_WINDOW);
            let window_end = (abs + word.len() + PLAYER_MARKER_WINDOW).min(context_lower.len());
            let snippet = &context_lower[window_start..window_end];
            if PLAYER_ROLE_MARKERS.iter().any(|m| snippet.contains(m)) {
                return true;
            }
            start = abs + word.len().max(1);
        }
    }
    false
}

fn guess_player(name_original: &str, url: Option<&str>, context: Option<&str>) -> bool {
    let candidate = name_original.trim();
    if candidate.is_empty() {
        return false;
    }

    if is_person_name(candidate) {
        return true;
    }

    if let Some(ctx) = context {
        if has_player_marker_near(candidate, ctx) {
            return true;
        }
    }

    if let Some(u) = url {
        let lowered = u.to_lowercase();
        if PLAYER_URL_HINTS.iter().any(|h| lowered.contains(h)) {
            let words = split_words(&candidate.to_lowercase());
            if words.len() >= 2 {
                return true;
            }
            if let Some(ctx) = context {
                if has_player_marker_near(candidate, ctx) {
                    return true;
                }
            }
        }
    }

    false
}

/// Heuristic classifier for a tag with no pre-existing type. Ties resolve
/// team before player (spec.md §4.3).
pub fn guess_tag_type_with_context(
    name: Option<&str>,
    url: Option<&str>,
    context: Option<&str>,
) -> TagType {
    let clean_name = name.map(str::trim).filter(|s| !s.is_empty());
    let clean_url = url.map(str::trim).filter(|s| !s.is_empty());

    if let Some(n) = clean_name {
        let matchable = n.to_lowercase();
        let words = split_words(&matchable);
        if guess_team(&matchable, &words, clean_url) {
            return TagType::Team;
        }
        if guess_player(n, clean_url, context) {
            return TagType::Player;
        }
    }

    if let Some(u) = clean_url {
        let slug = extract_slug_fragment(u);
        if !slug.is_empty() {
            let slug_matchable = slug.to_lowercase();
            let slug_words = split_words(&slug_matchable);
            if guess_team(&slug_matchable, &slug_words, Some(u)) {
                return TagType::Team;
            }
            if clean_name.is_none() && guess_player(&slug, Some(u), context) {
                return TagType::Player;
            }
        }

        let lowered = u.to_lowercase();
        if TEAM_URL_HINTS.iter().any(|h| lowered.contains(h)) {
            return TagType::Team;
        }
        if PLAYER_URL_HINTS.iter().any(|h| lowered.contains(h)) {
            if let Some(n) = clean_name {
                if split_words(&n.to_lowercase()).len() >= 2 {
                    return TagType::Player;
                }
            } else if !slug.is_empty() && is_person_name(&slug) {
                return TagType::Player;
            }
        }
    }

    TagType::Unknown
}

/// If `raw` is already a known type, keep it; otherwise classify.
pub fn enrich_tag_type(raw: Option<TagType>, name: Option<&str>, url: Option<&str>, context: Option<&str>) -> TagType {
    match raw {
        Some(t) if t != TagType::Unknown => t,
        _ => guess_tag_type_with_context(name, url, context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_prefixed_club_name_as_team() {
        assert_eq!(
            guess_tag_type_with_context(Some("ФК Зенит"), None, None),
            TagType::Team
        );
    }

    #[test]
    fn classifies_two_token_title_case_name_as_player() {
        assert_eq!(
            guess_tag_type_with_context(Some("Артём Дзюба"), None, None),
            TagType::Player
        );
    }

    #[test]
    fn classifies_via_team_url_hint() {
        assert_eq!(
            guess_tag_type_with_context(Some("Crvena Zvezda"), Some("https://site.ru/team/crvena"), None),
            TagType::Team
        );
    }

    #[test]
    fn classifies_role_marker_in_context_as_player() {
        assert_eq!(
            guess_tag_type_with_context(
                Some("Иванов"),
                None,
                Some("нападающий Иванов забил решающий гол")
            ),
            TagType::Player
        );
    }

    #[test]
    fn unclassifiable_name_is_unknown() {
        assert_eq!(
            guess_tag_type_with_context(Some("турнир"), None, None),
            TagType::Unknown
        );
    }

    #[test]
    fn enrich_keeps_already_typed_tag() {
        assert_eq!(
            enrich_tag_type(Some(TagType::Sport), Some("ФК Зенит"), None, None),
            TagType::Sport
        );
    }
}
