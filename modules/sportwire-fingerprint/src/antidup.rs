use crate::signatures::{jaccard, signature_tokens};
use crate::{JACCARD_ENTITY, JACCARD_STRICT};

#[derive(Debug, Clone, Copy)]
pub struct DuplicateMatch {
    pub duplicate_of: i64,
    pub jaccard: f64,
    pub entity_match: bool,
}

/// First already-kept candidate this reference matches, entity-relaxed
/// threshold first (spec.md §4.5).
pub fn is_near_duplicate<'a>(
    ref_title_sig: &str,
    ref_entity_sig: Option<&str>,
    candidates: impl IntoIterator<Item = (i64, &'a str, Option<&'a str>)>,
) -> Option<DuplicateMatch> {
    let ref_tokens = signature_tokens(ref_title_sig);

    for (candidate_id, cand_title_sig, cand_entity_sig) in candidates {
        let cand_tokens = signature_tokens(cand_title_sig);
        let score = jaccard(&ref_tokens, &cand_tokens);
        let entity_match = matches!((ref_entity_sig, cand_entity_sig), (Some(r), Some(c)) if r == c);

        if entity_match && score >= JACCARD_ENTITY {
            return Some(DuplicateMatch {
                duplicate_of: candidate_id,
                jaccard: score,
                entity_match: true,
            });
        }
        if score >= JACCARD_STRICT {
            return Some(DuplicateMatch {
                duplicate_of: candidate_id,
                jaccard: score,
                entity_match: false,
            });
        }
    }
    None
}

#[derive(Debug, Clone)]
pub struct HiddenArticle<T> {
    pub payload: T,
    pub duplicate_of: i64,
    pub jaccard: f64,
    pub entity_match: bool,
}

/// One article's signatures plus the opaque payload callers want preserved
/// (title, URL, whatever the composer later needs).
#[derive(Debug, Clone)]
pub struct SignedArticle<T> {
    pub id: i64,
    pub title_sig: String,
    pub entity_sig: Option<String>,
    pub payload: T,
}

/// First-occurrence-wins near-duplicate filter. Each incoming article is
/// compared against everything already kept; preserves input order
/// (spec.md §4.5).
pub fn filter_near_duplicates<T: Clone>(
    articles: &[SignedArticle<T>],
) -> (Vec<T>, Vec<HiddenArticle<T>>) {
    let mut kept: Vec<&SignedArticle<T>> = Vec::new();
    let mut hidden = Vec::new();

    for article in articles {
        let candidates = kept.iter().map(|k| {
            (
                k.id,
                k.title_sig.as_str(),
                k.entity_sig.as_deref(),
            )
        });

        match is_near_duplicate(&article.title_sig, article.entity_sig.as_deref(), candidates) {
            Some(m) => hidden.push(HiddenArticle {
                payload: article.payload.clone(),
                duplicate_of: m.duplicate_of,
                jaccard: m.jaccard,
                entity_match: m.entity_match,
            }),
            None => kept.push(article),
        }
    }

    (kept.into_iter().map(|a| a.payload.clone()).collect(), hidden)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed(id: i64, title_sig: &str, entity_sig: Option<&str>) -> SignedArticle<i64> {
        SignedArticle {
            id,
            title_sig: title_sig.to_string(),
            entity_sig: entity_sig.map(String::from),
            payload: id,
        }
    }

    #[test]
    fn strict_threshold_hides_near_identical_titles() {
        // B's tokens are a strict superset of A's: intersection=9, union=10,
        // jaccard=0.9 == JACCARD_STRICT.
        let articles = vec![
            signed(1, "a|b|c|d|e|f|g|h|i", None),
            signed(2, "a|b|c|d|e|f|g|h|i|j", None),
        ];
        let (visible, hidden) = filter_near_duplicates(&articles);
        assert_eq!(visible, vec![1]);
        assert_eq!(hidden.len(), 1);
        assert_eq!(hidden[0].duplicate_of, 1);
        assert!(!hidden[0].entity_match);
    }

    #[test]
    fn entity_relaxed_threshold_hides_lower_overlap_with_matching_entities() {
        // intersection=4, union=5, jaccard=0.8 == JACCARD_ENTITY, below
        // JACCARD_STRICT — only the entity-match relaxation hides it.
        let articles = vec![
            signed(1, "a|b|c|d", Some("team:zenit")),
            signed(2, "a|b|c|d|e", Some("team:zenit")),
        ];
        let (visible, hidden) = filter_near_duplicates(&articles);
        assert_eq!(visible, vec![1]);
        assert_eq!(hidden.len(), 1);
        assert!(hidden[0].entity_match);
    }

    #[test]
    fn dissimilar_titles_both_visible() {
        let articles = vec![signed(1, "a|b|c", None), signed(2, "x|y|z", None)];
        let (visible, hidden) = filter_near_duplicates(&articles);
        assert_eq!(visible, vec![1, 2]);
        assert!(hidden.is_empty());
    }

    #[test]
    fn first_occurrence_wins_order_preserved() {
        let articles = vec![
            signed(5, "a|b|c|d|e|f|g|h", None),
            signed(6, "a|b|c|d|e|f|g|h", None),
            signed(7, "q|r|s", None),
        ];
        let (visible, _) = filter_near_duplicates(&articles);
        assert_eq!(visible, vec![5, 7]);
    }
}
