//! Retrieval orchestration: candidate assembly, scoring, ordering, budget.
//!
//! The pipeline is a pure function of the catalog snapshot, the config, and
//! one [`QueryContext`]; identical inputs produce identical results. Safety
//! detection always runs first, Override matches are exempt from the output
//! budget, and every edge case (empty query, over-length query, unknown
//! topic, zero matches) resolves to a well-formed result, never an error.

use crate::core::catalog::{Catalog, Tier};
use crate::core::config::RetrievalConfig;
use crate::core::query::{NormalizedQuery, QueryContext};
use crate::core::resolver::{self, Resolution, ResolutionMethod};
use crate::core::safety;
use crate::core::scorer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One scored principle in the final ordering.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankedPrinciple {
    pub principle_id: String,
    pub title: String,
    pub tier: Tier,
    pub topic: Option<String>,
    pub score: f64,
    /// Full principle body, returned verbatim.
    pub text: String,
}

/// Ordered result set plus resolution metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalResult {
    pub results: Vec<RankedPrinciple>,
    pub active_topics: Vec<String>,
    pub triggered_safety: Vec<String>,
    pub resolution: ResolutionMethod,
    pub warnings: Vec<String>,
    /// The query exceeded the length cap and was truncated before matching.
    pub query_truncated: bool,
    /// Distinguished no-query outcome, distinct from a genuine zero-match.
    pub empty_query: bool,
    /// Nothing scored above zero; the caller may suggest rephrasing.
    pub no_matches: bool,
    pub catalog_digest: String,
}

impl RetrievalResult {
    fn empty(catalog: &Catalog, resolution: ResolutionMethod) -> Self {
        RetrievalResult {
            results: Vec::new(),
            active_topics: Vec::new(),
            triggered_safety: Vec::new(),
            resolution,
            warnings: Vec::new(),
            query_truncated: false,
            empty_query: false,
            no_matches: false,
            catalog_digest: catalog.digest.clone(),
        }
    }
}

pub fn retrieve(catalog: &Catalog, cfg: &RetrievalConfig, ctx: &QueryContext) -> RetrievalResult {
    let query = NormalizedQuery::from_raw(&ctx.raw_text, cfg.max_query_chars);

    if query.is_empty {
        let mut result = RetrievalResult::empty(catalog, ResolutionMethod::None);
        result.empty_query = true;
        result
            .warnings
            .push("no specific query given; nothing to match against".to_string());
        return result;
    }

    // Safety detection always runs, independent of topics and output filters.
    let triggered = safety::detect(&query, &catalog.safety);

    let Resolution {
        topics: active,
        method,
        warnings,
    } = resolver::resolve(&query, ctx.explicit_topic.as_deref(), &catalog.topics, cfg);

    let mut ranked = collect_candidates(catalog, cfg, &query, &active);

    // Override group first by descending score; remainder by descending
    // score, tier rank, then id for determinism.
    let (mut overrides, mut remainder): (Vec<_>, Vec<_>) = ranked
        .drain(..)
        .partition(|r| r.tier == Tier::Override);
    overrides.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.principle_id.cmp(&b.principle_id))
    });
    remainder.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.tier.rank().cmp(&b.tier.rank()))
            .then_with(|| a.principle_id.cmp(&b.principle_id))
    });

    // Output filters and budget apply to the non-Override remainder only.
    if !ctx.include_base_in_output {
        remainder.retain(|r| r.tier != Tier::Base);
    }
    remainder.truncate(ctx.output_budget);

    let no_matches = overrides.is_empty() && remainder.is_empty();
    let mut results = overrides;
    results.extend(remainder);

    RetrievalResult {
        results,
        active_topics: active.into_iter().collect(),
        triggered_safety: triggered.into_iter().collect(),
        resolution: method,
        warnings,
        query_truncated: query.truncated,
        empty_query: false,
        no_matches,
        catalog_digest: catalog.digest.clone(),
    }
}

/// Score the candidate pool: all Override, all Base, Topic-tier principles
/// of active topics, and procedures scoped to an active topic (or to none).
/// Zero scores are dropped here.
fn collect_candidates(
    catalog: &Catalog,
    cfg: &RetrievalConfig,
    query: &NormalizedQuery,
    active: &BTreeSet<String>,
) -> Vec<RankedPrinciple> {
    let mut ranked = Vec::new();
    for principle in &catalog.principles {
        let in_pool = match principle.tier {
            Tier::Override | Tier::Base => true,
            Tier::Topic | Tier::Procedure => match &principle.topic {
                Some(topic) => active.contains(topic),
                None => principle.tier == Tier::Procedure,
            },
        };
        if !in_pool {
            continue;
        }
        let score = scorer::score(principle, query, cfg);
        if score > 0.0 {
            ranked.push(RankedPrinciple {
                principle_id: principle.id.clone(),
                title: principle.title.clone(),
                tier: principle.tier,
                topic: principle.topic.clone(),
                score,
                text: principle.text.clone(),
            });
        }
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{Catalog, Principle, SafetyCategory, Topic};

    fn principle(id: &str, tier: Tier, topic: Option<&str>, keywords: &[&str]) -> Principle {
        Principle {
            id: id.to_string(),
            tier,
            topic: topic.map(|t| t.to_string()),
            title: id.to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            synonyms: vec![],
            trigger_phrases: vec![],
            failure_indicators: vec![],
            applies_when: vec![],
            text: format!("body of {}", id),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                principle("ovr-privacy", Tier::Override, None, &["data", "expose"]),
                principle("base-context", Tier::Base, None, &["incomplete", "context"]),
                principle("code-spec", Tier::Topic, Some("coding"), &["specs", "incomplete"]),
                principle("agent-handoff", Tier::Topic, Some("multi-agent"), &["handoff"]),
                principle("proc-review", Tier::Procedure, Some("coding"), &["review"]),
            ],
            vec![
                Topic {
                    id: "coding".to_string(),
                    name: "Coding".to_string(),
                    priority_rank: 10,
                    trigger_keywords: vec!["specs".to_string(), "code".to_string()],
                    trigger_phrases: vec![],
                },
                Topic {
                    id: "multi-agent".to_string(),
                    name: "Multi-agent".to_string(),
                    priority_rank: 20,
                    trigger_keywords: vec!["agents".to_string(), "handoff".to_string()],
                    trigger_phrases: vec![],
                },
            ],
            vec![SafetyCategory {
                id: "privacy".to_string(),
                keywords: vec!["pii".to_string()],
                phrases: vec!["user data".to_string()],
            }],
        )
    }

    #[test]
    fn empty_query_is_distinguished_from_zero_match() {
        let cat = catalog();
        let cfg = RetrievalConfig::default();
        let empty = retrieve(&cat, &cfg, &QueryContext::new("   "));
        assert!(empty.empty_query);
        assert!(!empty.no_matches);

        let miss = retrieve(&cat, &cfg, &QueryContext::new("zebra telescope"));
        assert!(!miss.empty_query);
        assert!(miss.no_matches);
        assert!(miss.results.is_empty());
    }

    #[test]
    fn inactive_topic_principles_are_not_scored_into_results() {
        let cat = catalog();
        let cfg = RetrievalConfig::default();
        // only the coding topic activates here, so agent-handoff stays out
        let r = retrieve(&cat, &cfg, &QueryContext::new("specs incomplete"));
        assert!(r.active_topics.contains(&"coding".to_string()));
        assert!(!r.results.iter().any(|p| p.principle_id == "agent-handoff"));
    }

    #[test]
    fn base_suppression_keeps_base_in_scoring_but_out_of_output() {
        let cat = catalog();
        let cfg = RetrievalConfig::default();
        let r = retrieve(
            &cat,
            &cfg,
            &QueryContext::new("specs incomplete").without_base(),
        );
        assert!(!r.results.iter().any(|p| p.tier == Tier::Base));
        assert!(r.results.iter().any(|p| p.principle_id == "code-spec"));
    }

    #[test]
    fn override_results_are_exempt_from_the_budget() {
        let cat = catalog();
        let cfg = RetrievalConfig::default();
        let r = retrieve(
            &cat,
            &cfg,
            &QueryContext::new("specs incomplete context data expose").with_budget(1),
        );
        let overrides: Vec<_> = r
            .results
            .iter()
            .filter(|p| p.tier == Tier::Override)
            .collect();
        let rest: Vec<_> = r
            .results
            .iter()
            .filter(|p| p.tier != Tier::Override)
            .collect();
        assert_eq!(overrides.len(), 1);
        assert_eq!(rest.len(), 1);
        // Override leads the ordering.
        assert_eq!(r.results[0].principle_id, "ovr-privacy");
    }

    #[test]
    fn budget_larger_than_candidates_returns_all_without_padding() {
        let cat = catalog();
        let cfg = RetrievalConfig::default();
        let r = retrieve(&cat, &cfg, &QueryContext::new("specs incomplete").with_budget(50));
        assert!(r.results.len() < 50);
        assert!(!r.results.is_empty());
    }

    #[test]
    fn equal_scores_break_ties_by_tier_rank_then_id() {
        let cat = Catalog::new(
            vec![
                principle("b-same", Tier::Base, None, &["review"]),
                principle("a-same", Tier::Base, None, &["review"]),
                principle("proc-same", Tier::Procedure, None, &["review"]),
            ],
            vec![],
            vec![],
        );
        let cfg = RetrievalConfig::default();
        let r = retrieve(&cat, &cfg, &QueryContext::new("review"));
        let ids: Vec<_> = r.results.iter().map(|p| p.principle_id.as_str()).collect();
        assert_eq!(ids, vec!["a-same", "b-same", "proc-same"]);
    }

    #[test]
    fn retrieval_is_idempotent_byte_for_byte() {
        let cat = catalog();
        let cfg = RetrievalConfig::default();
        let ctx = QueryContext::new("specs incomplete, user data exposure?");
        let a = serde_json::to_string(&retrieve(&cat, &cfg, &ctx)).expect("serialize");
        let b = serde_json::to_string(&retrieve(&cat, &cfg, &ctx)).expect("serialize");
        assert_eq!(a, b);
    }

    #[test]
    fn over_length_query_is_flagged() {
        let cat = catalog();
        let mut cfg = RetrievalConfig::default();
        cfg.max_query_chars = 10;
        let r = retrieve(&cat, &cfg, &QueryContext::new("incomplete specs and much more text"));
        assert!(r.query_truncated);
    }
}
