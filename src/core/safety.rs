//! Safety override detection.
//!
//! Runs on every query regardless of topic resolution or output filters, so
//! supreme-tier guidance cannot be switched off by a presentation option.

use crate::core::catalog::SafetyCategory;
use crate::core::query::NormalizedQuery;
use std::collections::BTreeSet;

/// Return the ids of every category with at least one whole-word keyword
/// hit or substring phrase hit.
pub fn detect(query: &NormalizedQuery, categories: &[SafetyCategory]) -> BTreeSet<String> {
    let mut triggered = BTreeSet::new();
    if query.is_empty {
        return triggered;
    }
    for category in categories {
        let keyword_hit = category.keywords.iter().any(|kw| query.has_word(kw));
        let phrase_hit = category.phrases.iter().any(|p| query.has_phrase(p));
        if keyword_hit || phrase_hit {
            triggered.insert(category.id.clone());
        }
    }
    triggered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, keywords: &[&str], phrases: &[&str]) -> SafetyCategory {
        SafetyCategory {
            id: id.to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            phrases: phrases.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn phrase_hit_alone_triggers_a_category() {
        let cats = vec![category("privacy", &["pii"], &["user data"])];
        let q = NormalizedQuery::from_raw("this might expose user data", 2000);
        assert!(detect(&q, &cats).contains("privacy"));
    }

    #[test]
    fn keyword_hit_is_whole_word() {
        let cats = vec![category("security", &["secret"], &[])];
        let hit = NormalizedQuery::from_raw("is this secret safe", 2000);
        let miss = NormalizedQuery::from_raw("run the secretary report", 2000);
        assert!(detect(&hit, &cats).contains("security"));
        assert!(detect(&miss, &cats).is_empty());
    }

    #[test]
    fn empty_query_triggers_nothing() {
        let cats = vec![category("harm", &["dangerous"], &[])];
        let q = NormalizedQuery::from_raw("", 2000);
        assert!(detect(&q, &cats).is_empty());
    }

    #[test]
    fn multiple_categories_can_trigger_on_one_query() {
        let cats = vec![
            category("privacy", &[], &["user data"]),
            category("security", &["credentials"], &[]),
        ];
        let q = NormalizedQuery::from_raw("log user data with credentials", 2000);
        let hot = detect(&q, &cats);
        assert_eq!(hot.len(), 2);
    }
}
