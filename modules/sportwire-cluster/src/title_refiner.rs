use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;

const MONTH_NAMES: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

fn stop_words() -> &'static HashSet<&'static str> {
    static WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    WORDS.get_or_init(|| {
        [
            "the", "and", "for", "with", "that", "this", "from", "your", "their", "into",
            "after", "before", "over", "under", "about", "against", "across", "around",
            "through", "onto", "between", "without", "within", "while", "whose", "where",
            "when", "дело", "дня", "новости", "новость", "матч", "матча", "матче", "сезона",
            "сезон", "игра", "игры", "игре", "игрок", "игроки", "тур", "туре", "турнир",
            "турнира", "турнире", "команда", "команды", "команде", "клуб", "клуба", "клубе",
            "год", "года", "году", "что", "как", "где", "когда", "после", "перед", "при",
            "под", "над", "между", "если", "почему", "из", "на", "по", "в", "во", "к", "ко",
            "о", "об", "обо", "за", "до", "без", "со", "от", "то", "так", "же", "ли", "не",
            "да", "но", "или", "бы",
        ]
        .into_iter()
        .collect()
    })
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").unwrap())
}

/// Article view the title refiner needs: its title, publication instant,
/// and the distinct entity names it carries per type (spec.md §4.7).
#[derive(Debug, Clone, Default)]
pub struct ArticleForTitle {
    pub title: String,
    pub published: Option<DateTime<Utc>>,
    pub sports: Vec<String>,
    pub tournaments: Vec<String>,
    pub teams: Vec<String>,
    pub players: Vec<String>,
}

struct TokenInfo<'a> {
    tokens: HashSet<String>,
    ordered: Vec<(String, String)>,
    article: &'a ArticleForTitle,
}

fn truncate_plain(text: &str, limit: usize) -> String {
    if limit == 0 {
        return String::new();
    }
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= limit {
        return text.to_string();
    }
    let keep = limit.saturating_sub(1);
    let mut out: String = chars[..keep].iter().collect();
    out.push('…');
    out
}

/// `\w+` tokens, lowercased and deduped against the domain stopword list;
/// single-character tokens are dropped too (spec.md §4.7).
fn extract_tokens(title: &str) -> Vec<(String, String)> {
    token_re()
        .find_iter(title)
        .filter_map(|m| {
            let word = m.as_str();
            let normalized = word.to_lowercase();
            if normalized.chars().count() <= 1 || stop_words().contains(normalized.as_str()) {
                None
            } else {
                Some((normalized, word.to_string()))
            }
        })
        .collect()
}

fn ceil_ratio(total: usize, ratio: f64) -> usize {
    let computed = ((total as f64) * ratio).ceil() as i64;
    computed.max(1) as usize
}

/// Tournament → team → player → sport, in that priority; a name wins a
/// field only once it appears on at least half the articles, ties broken
/// by longer name then lexicographically (spec.md §4.7).
fn select_primary_entity(articles: &[ArticleForTitle]) -> Option<String> {
    let total = articles.len();
    let required = ceil_ratio(total, 0.5);

    let fields: [fn(&ArticleForTitle) -> &[String]; 4] = [
        |a| a.tournaments.as_slice(),
        |a| a.teams.as_slice(),
        |a| a.players.as_slice(),
        |a| a.sports.as_slice(),
    ];

    for field in fields {
        let mut counter: HashMap<&str, u32> = HashMap::new();
        for article in articles {
            for name in field(article) {
                *counter.entry(name.as_str()).or_insert(0) += 1;
            }
        }
        let mut eligible: Vec<&str> = counter
            .into_iter()
            .filter(|(_, count)| *count as usize >= required)
            .map(|(name, _)| name)
            .collect();
        if !eligible.is_empty() {
            eligible.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            return Some(eligible[0].to_string());
        }
    }
    None
}

/// When no common token survives, fall back to whichever title has the
/// highest average token-Jaccard against all the others (spec.md §4.7).
fn select_representative_title(token_info: &[TokenInfo]) -> String {
    if token_info.is_empty() {
        return String::new();
    }
    if token_info.len() == 1 {
        return token_info[0].article.title.clone();
    }

    let mut best_score = -1.0f64;
    let mut best_title = token_info[0].article.title.clone();

    for (idx, info) in token_info.iter().enumerate() {
        let mut score = 0.0;
        let mut comparisons = 0u32;
        for (jdx, other) in token_info.iter().enumerate() {
            if idx == jdx {
                continue;
            }
            let union = info.tokens.union(&other.tokens).count();
            let intersection = info.tokens.intersection(&other.tokens).count();
            comparisons += 1;
            score += if union > 0 {
                intersection as f64 / union as f64
            } else {
                0.0
            };
        }
        let avg = if comparisons > 0 {
            score / comparisons as f64
        } else {
            0.0
        };
        if avg > best_score {
            best_score = avg;
            best_title = info.article.title.clone();
        }
    }

    best_title
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Ports the original's `compute_story_title`: common-token topic
/// extraction, primary-entity selection, composition into
/// `"{entity} — {topic}"` / `"Сводка: {entity}"` / a representative
/// title / the literal `"Сводка дня"`, an optional single-date month
/// suffix, then a 140-char ellipsis truncation (spec.md §4.7).
pub fn compute_story_title(articles: &[ArticleForTitle]) -> String {
    if articles.is_empty() {
        return "Сводка дня".to_string();
    }

    let mut token_counter: HashMap<String, u32> = HashMap::new();
    let mut token_info: Vec<TokenInfo> = Vec::with_capacity(articles.len());
    for article in articles {
        let ordered = extract_tokens(&article.title);
        let token_set: HashSet<String> = ordered.iter().map(|(n, _)| n.clone()).collect();
        for t in &token_set {
            *token_counter.entry(t.clone()).or_insert(0) += 1;
        }
        token_info.push(TokenInfo {
            tokens: token_set,
            ordered,
            article,
        });
    }

    let required = ceil_ratio(articles.len(), 0.6);
    let common_tokens: HashSet<String> = token_counter
        .into_iter()
        .filter(|(_, count)| *count as usize >= required)
        .map(|(token, _)| token)
        .collect();

    let entity_name = select_primary_entity(articles);

    let mut topic = String::new();
    if !common_tokens.is_empty() {
        let best_info = token_info
            .iter()
            .max_by_key(|info| info.tokens.intersection(&common_tokens).count())
            .expect("token_info is non-empty");

        let mut used = HashSet::new();
        let mut topic_words = Vec::new();
        for (normalized, original) in &best_info.ordered {
            if common_tokens.contains(normalized) && !used.contains(normalized) {
                topic_words.push(original.clone());
                used.insert(normalized.clone());
            }
        }
        topic = topic_words.join(" ").trim().to_string();
        if topic
            .chars()
            .next()
            .is_some_and(|c| c.is_lowercase())
        {
            topic = capitalize_first(&topic);
        }
    }

    if topic.is_empty() {
        let representative = select_representative_title(&token_info);
        return if let Some(entity) = entity_name {
            truncate_plain(&format!("Сводка: {entity}"), 140)
        } else {
            let fallback = if representative.is_empty() {
                "Сводка дня".to_string()
            } else {
                representative
            };
            truncate_plain(&fallback, 140)
        };
    }

    if let Some(entity) = entity_name.as_deref() {
        let topic_lower = topic.to_lowercase();
        let entity_lower = entity.to_lowercase();
        if topic_lower.starts_with(&entity_lower) {
            let trimmed = topic[entity.len().min(topic.len())..]
                .trim_start_matches([' ', '—', ':', '-', '–'])
                .to_string();
            topic = if trimmed.is_empty() {
                String::new()
            } else if trimmed.chars().next().is_some_and(|c| c.is_lowercase()) {
                capitalize_first(&trimmed)
            } else {
                trimmed
            };
        }
    }

    let mut base_title = match (entity_name.as_deref(), topic.is_empty()) {
        (Some(entity), false) => format!("{entity} — {topic}"),
        (Some(entity), true) => format!("Сводка: {entity}"),
        (None, _) => topic,
    };

    let dates: HashSet<chrono::NaiveDate> = articles
        .iter()
        .filter_map(|a| a.published.map(|dt| dt.date_naive()))
        .collect();
    if dates.len() == 1 {
        let date_value = *dates.iter().next().unwrap();
        let month_index = (date_value.month() as usize).saturating_sub(1);
        if let Some(month_name) = MONTH_NAMES.get(month_index) {
            let suffix = format!(" на {} {}", date_value.day(), month_name);
            if base_title.chars().count() + suffix.chars().count() <= 140 {
                base_title.push_str(&suffix);
            }
        }
    }

    truncate_plain(&base_title, 140)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(title: &str, teams: &[&str], published: Option<(i32, u32, u32)>) -> ArticleForTitle {
        ArticleForTitle {
            title: title.to_string(),
            published: published.map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()),
            sports: Vec::new(),
            tournaments: Vec::new(),
            teams: teams.iter().map(|s| s.to_string()).collect(),
            players: Vec::new(),
        }
    }

    #[test]
    fn empty_articles_returns_literal_fallback() {
        assert_eq!(compute_story_title(&[]), "Сводка дня");
    }

    #[test]
    fn common_topic_and_entity_combine() {
        let articles = vec![
            article("Зенит обыграл Спартак в матче тура", &["Зенит"], Some((2026, 3, 1))),
            article("Зенит обыграл Спартак со счётом 2:0", &["Зенит"], Some((2026, 3, 1))),
            article("Зенит дожал Спартак в концовке", &["Зенит"], Some((2026, 3, 1))),
        ];
        let title = compute_story_title(&articles);
        assert!(title.starts_with("Зенит"));
        assert!(title.contains("на 1 марта"));
    }

    #[test]
    fn no_common_tokens_falls_back_to_entity_summary() {
        let articles = vec![
            article("Первая новость про клуб", &["Зенит"], None),
            article("Совершенно другая формулировка", &["Зенит"], None),
            article("Третий заголовок без пересечений", &["Зенит"], None),
        ];
        let title = compute_story_title(&articles);
        assert_eq!(title, "Сводка: Зенит");
    }

    #[test]
    fn no_common_tokens_and_no_entity_uses_representative_title() {
        let articles = vec![
            article("Алгоритм выбирает заголовок сам", &[], None),
            article("Совершенно другая формулировка текста", &[], None),
        ];
        let title = compute_story_title(&articles);
        assert!(!title.is_empty());
        assert_ne!(title, "Сводка дня");
    }

    #[test]
    fn mixed_dates_suppress_month_suffix() {
        let articles = vec![
            article("Зенит обыграл Спартак в матче", &["Зенит"], Some((2026, 3, 1))),
            article("Зенит обыграл Спартак со счётом", &["Зенит"], Some((2026, 3, 2))),
        ];
        let title = compute_story_title(&articles);
        assert!(!title.contains(" на "));
    }

    #[test]
    fn long_title_truncated_with_ellipsis() {
        let long_team = "А".repeat(200);
        let articles = vec![
            article("Заголовок один про клуб", &[long_team.as_str()], None),
            article("Заголовок два про клуб", &[long_team.as_str()], None),
        ];
        let title = compute_story_title(&articles);
        assert!(title.chars().count() <= 140);
        assert!(title.ends_with('…'));
    }
}
