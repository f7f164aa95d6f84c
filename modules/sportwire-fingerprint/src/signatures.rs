use std::collections::HashMap;

const RU_STOP: &[&str] = &[
    "и", "в", "на", "к", "по", "о", "от", "за", "для", "с", "во", "как", "или", "но", "а", "не",
    "это", "что", "из", "со", "же", "бы", "ли", "до", "об", "обо", "над", "между", "при", "под",
    "у", "про", "ещё",
];

const EN_STOP: &[&str] = &[
    "and", "or", "the", "a", "an", "of", "in", "on", "to", "for", "by", "with", "as", "at",
    "from", "is", "are", "was", "were", "be", "this", "that", "these", "those", "it", "its",
    "their", "your", "our", "his", "her",
];

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ('а'..='я').contains(&c) || ('А'..='Я').contains(&c) || c == 'ё' || c == 'Ё' || c == '-'
}

/// Tokenize on `[A-Za-zА-Яа-я0-9-]+`, lowercase, drop the built-in
/// Russian/English stopword set (spec.md §4.4).
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if is_word_char(c) {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
        .into_iter()
        .map(|t| t.to_lowercase())
        .filter(|t| !RU_STOP.contains(&t.as_str()) && !EN_STOP.contains(&t.as_str()))
        .collect()
}

/// Top-8 tokens by frequency, ties broken lexicographically, sorted
/// lexicographically and pipe-joined.
pub fn title_signature(tokens: &[String]) -> String {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for t in tokens {
        *counts.entry(t.as_str()).or_insert(0) += 1;
    }

    let mut by_frequency: Vec<(&str, u32)> = counts.into_iter().collect();
    by_frequency.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    by_frequency.truncate(8);

    let mut top: Vec<&str> = by_frequency.into_iter().map(|(t, _)| t).collect();
    top.sort();
    top.join("|")
}

#[derive(Debug, Clone, Default)]
pub struct EntitySlots<'a> {
    pub sport: Option<&'a str>,
    pub tournament: Option<&'a str>,
    pub team: Option<&'a str>,
    pub player: Option<&'a str>,
}

/// Slot order is tournament, team, player, sport (spec.md §4.4). Empty
/// everywhere yields `None`, not an empty string.
pub fn entity_signature(slots: &EntitySlots) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(t) = slots.tournament.filter(|s| !s.trim().is_empty()) {
        parts.push(format!("t:{}", t.trim().to_lowercase()));
    }
    if let Some(t) = slots.team.filter(|s| !s.trim().is_empty()) {
        parts.push(format!("team:{}", t.trim().to_lowercase()));
    }
    if let Some(p) = slots.player.filter(|s| !s.trim().is_empty()) {
        parts.push(format!("p:{}", p.trim().to_lowercase()));
    }
    if let Some(s) = slots.sport.filter(|s| !s.trim().is_empty()) {
        parts.push(format!("s:{}", s.trim().to_lowercase()));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("|"))
    }
}

pub fn signature_tokens(sig: &str) -> Vec<&str> {
    sig.split('|').filter(|p| !p.is_empty()).collect()
}

/// |A∩B|/|A∪B|; two empty sets are defined equal (1.0), one empty is 0.0
/// (spec.md §4.4).
pub fn jaccard(a: &[&str], b: &[&str]) -> f64 {
    use std::collections::HashSet;
    let set_a: HashSet<&str> = a.iter().copied().collect();
    let set_b: HashSet<&str> = b.iter().copied().collect();

    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}

pub fn compute_signatures(title: &str, entities: &EntitySlots) -> (String, Option<String>) {
    let tokens = tokenize(title);
    (title_signature(&tokens), entity_signature(entities))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_drops_stopwords() {
        let tokens = tokenize("Зенит и Спартак сыграют вничью");
        assert_eq!(tokens, vec!["зенит", "спартак", "сыграют", "вничью"]);
    }

    #[test]
    fn title_signature_breaks_ties_lexicographically() {
        // "a" and "b" both occur once; lexicographic tie-break keeps "a" and "b" over others.
        let tokens = vec!["b".to_string(), "a".to_string(), "c".to_string()];
        assert_eq!(title_signature(&tokens), "a|b|c");
    }

    #[test]
    fn title_signature_keeps_top_8_by_count() {
        let tokens: Vec<String> = "a a a b b c c d e f g h i"
            .split_whitespace()
            .map(String::from)
            .collect();
        let sig = title_signature(&tokens);
        assert_eq!(signature_tokens(&sig).len(), 8);
        assert!(sig.contains('a'));
    }

    #[test]
    fn entity_signature_orders_tournament_team_player_sport() {
        let slots = EntitySlots {
            sport: Some("Football"),
            tournament: Some("RPL"),
            team: Some("Zenit"),
            player: Some("Dzyuba"),
        };
        assert_eq!(
            entity_signature(&slots),
            Some("t:rpl|team:zenit|p:dzyuba|s:football".to_string())
        );
    }

    #[test]
    fn entity_signature_none_when_all_absent() {
        assert_eq!(entity_signature(&EntitySlots::default()), None);
    }

    #[test]
    fn jaccard_empty_sets_are_equal() {
        assert_eq!(jaccard(&[], &[]), 1.0);
    }

    #[test]
    fn jaccard_one_empty_is_zero() {
        assert_eq!(jaccard(&["a"], &[]), 0.0);
    }

    #[test]
    fn jaccard_overlap() {
        assert_eq!(jaccard(&["a", "b"], &["b", "c"]), 1.0 / 3.0);
    }
}
