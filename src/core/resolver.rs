//! Topic resolution: which topic scopes are active for a query.
//!
//! Resolution order is a hard contract: explicit topic first, then keyword
//! detection, then the score → priority-rank → multi-activation tie-break.
//! Returning more than one topic is the last-resort outcome, reached only
//! when the best detection scores AND the best priority ranks both tie.

use crate::core::catalog::Topic;
use crate::core::config::RetrievalConfig;
use crate::core::query::NormalizedQuery;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Reserved explicit value meaning "no topic, Base tier only".
pub const NO_TOPIC: &str = "general";

/// How the active-topic set was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    Explicit,
    Detected,
    Default,
    None,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    /// Active topic ids, ordered for deterministic downstream iteration.
    pub topics: BTreeSet<String>,
    pub method: ResolutionMethod,
    pub warnings: Vec<String>,
}

/// Detection score for one topic: whole-word keyword hits plus boosted
/// phrase hits.
fn detection_score(topic: &Topic, query: &NormalizedQuery, cfg: &RetrievalConfig) -> f64 {
    let mut score = 0.0;
    for kw in &topic.trigger_keywords {
        if query.has_word(kw) {
            score += 1.0;
        }
    }
    for phrase in &topic.trigger_phrases {
        if query.has_phrase(phrase) {
            score += cfg.topic_phrase_boost;
        }
    }
    score
}

pub fn resolve(
    query: &NormalizedQuery,
    explicit: Option<&str>,
    registry: &[Topic],
    cfg: &RetrievalConfig,
) -> Resolution {
    let mut warnings = Vec::new();

    // Explicit always wins when recognized.
    if let Some(requested) = explicit {
        if requested == NO_TOPIC {
            return Resolution {
                topics: BTreeSet::new(),
                method: ResolutionMethod::Explicit,
                warnings,
            };
        }
        if registry.iter().any(|t| t.id == requested) {
            let mut topics = BTreeSet::new();
            topics.insert(requested.to_string());
            return Resolution {
                topics,
                method: ResolutionMethod::Explicit,
                warnings,
            };
        }
        warnings.push(format!(
            "unknown explicit topic '{}', falling back to detection",
            requested
        ));
    }

    // Detection pass over the whole registry.
    let mut qualified: Vec<(&Topic, f64)> = registry
        .iter()
        .map(|t| (t, detection_score(t, query, cfg)))
        .filter(|(_, score)| *score >= cfg.topic_min_score)
        .collect();

    if qualified.is_empty() {
        return match &cfg.default_topic {
            Some(default) => {
                let mut topics = BTreeSet::new();
                topics.insert(default.clone());
                Resolution {
                    topics,
                    method: ResolutionMethod::Default,
                    warnings,
                }
            }
            None => Resolution {
                topics: BTreeSet::new(),
                method: ResolutionMethod::None,
                warnings,
            },
        };
    }

    if qualified.len() == 1 {
        let mut topics = BTreeSet::new();
        topics.insert(qualified[0].0.id.clone());
        return Resolution {
            topics,
            method: ResolutionMethod::Detected,
            warnings,
        };
    }

    // Several qualified: keep only the max-score subset.
    let best_score = qualified
        .iter()
        .map(|(_, s)| *s)
        .fold(f64::NEG_INFINITY, f64::max);
    qualified.retain(|(_, s)| *s == best_score);

    let mut topics = BTreeSet::new();
    if qualified.len() == 1 {
        topics.insert(qualified[0].0.id.clone());
    } else {
        // Score tie: priority rank decides. Equal best ranks are a
        // configuration escape hatch that activates the whole tied set.
        qualified.sort_by_key(|(t, _)| t.priority_rank);
        let best_rank = qualified[0].0.priority_rank;
        if qualified[1].0.priority_rank != best_rank {
            topics.insert(qualified[0].0.id.clone());
        } else {
            for (t, _) in &qualified {
                topics.insert(t.id.clone());
            }
        }
    }

    Resolution {
        topics,
        method: ResolutionMethod::Detected,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::NormalizedQuery;

    fn topic(id: &str, rank: u32, keywords: &[&str], phrases: &[&str]) -> Topic {
        Topic {
            id: id.to_string(),
            name: id.to_string(),
            priority_rank: rank,
            trigger_keywords: keywords.iter().map(|s| s.to_string()).collect(),
            trigger_phrases: phrases.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn query(text: &str) -> NormalizedQuery {
        NormalizedQuery::from_raw(text, 2000)
    }

    fn cfg() -> RetrievalConfig {
        RetrievalConfig::default()
    }

    #[test]
    fn explicit_recognized_topic_wins_over_detection() {
        let registry = vec![topic("coding", 10, &["code"], &[]), topic("ops", 20, &["deploy"], &[])];
        let r = resolve(&query("deploy the code"), Some("ops"), &registry, &cfg());
        assert_eq!(r.method, ResolutionMethod::Explicit);
        assert_eq!(r.topics.iter().collect::<Vec<_>>(), vec!["ops"]);
    }

    #[test]
    fn reserved_no_topic_value_resolves_to_empty_set() {
        let registry = vec![topic("coding", 10, &["code"], &[])];
        let r = resolve(&query("help me code"), Some(NO_TOPIC), &registry, &cfg());
        assert_eq!(r.method, ResolutionMethod::Explicit);
        assert!(r.topics.is_empty());
    }

    #[test]
    fn unknown_explicit_topic_warns_and_falls_back_to_detection() {
        let registry = vec![topic("coding", 10, &["code"], &[])];
        let r = resolve(&query("help me code"), Some("cookery"), &registry, &cfg());
        assert_eq!(r.warnings.len(), 1);
        assert!(r.warnings[0].contains("cookery"));
        assert_eq!(r.method, ResolutionMethod::Detected);
        assert!(r.topics.contains("coding"));
    }

    #[test]
    fn no_qualifier_and_no_default_means_base_only() {
        let registry = vec![topic("coding", 10, &["code"], &[])];
        let r = resolve(&query("completely unrelated words"), None, &registry, &cfg());
        assert_eq!(r.method, ResolutionMethod::None);
        assert!(r.topics.is_empty());
    }

    #[test]
    fn no_qualifier_with_default_returns_default() {
        let registry = vec![topic("coding", 10, &["code"], &[])];
        let mut config = cfg();
        config.default_topic = Some("coding".to_string());
        let r = resolve(&query("completely unrelated words"), None, &registry, &config);
        assert_eq!(r.method, ResolutionMethod::Default);
        assert!(r.topics.contains("coding"));
    }

    #[test]
    fn higher_score_beats_priority_rank() {
        // "ops" matches two keywords, "coding" one; rank is irrelevant here.
        let registry = vec![
            topic("coding", 1, &["deploy"], &[]),
            topic("ops", 99, &["deploy", "rollback"], &[]),
        ];
        let r = resolve(&query("deploy then rollback"), None, &registry, &cfg());
        assert_eq!(r.topics.iter().collect::<Vec<_>>(), vec!["ops"]);
    }

    #[test]
    fn score_tie_is_broken_by_priority_rank() {
        let registry = vec![
            topic("coding", 10, &["review"], &[]),
            topic("multi-agent", 20, &["review"], &[]),
        ];
        let r = resolve(&query("review this"), None, &registry, &cfg());
        assert_eq!(r.topics.iter().collect::<Vec<_>>(), vec!["coding"]);
    }

    #[test]
    fn equal_score_and_equal_rank_activates_all_tied_topics() {
        let registry = vec![
            topic("coding", 10, &["review"], &[]),
            topic("multi-agent", 10, &["review"], &[]),
        ];
        let r = resolve(&query("review this"), None, &registry, &cfg());
        assert_eq!(r.method, ResolutionMethod::Detected);
        assert_eq!(r.topics.len(), 2);
    }

    #[test]
    fn phrase_boost_counts_toward_qualification() {
        let registry = vec![topic("coding", 10, &[], &["code review"])];
        let r = resolve(&query("set up a code review flow"), None, &registry, &cfg());
        assert!(r.topics.contains("coding"));
    }
}
