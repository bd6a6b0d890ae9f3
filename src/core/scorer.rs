//! Relevance scoring: six additive weighted signals plus the override boost.
//!
//! Keyword, synonym, and failure-indicator signals are whole-word matches
//! against the query token set. Trigger-phrase and applies-when signals are
//! substring matches against the lowered query. An absent term is a
//! permanent miss; there is no stemming or edit-distance fallback.

use crate::core::catalog::{Principle, Tier};
use crate::core::config::RetrievalConfig;
use crate::core::query::NormalizedQuery;

pub fn score(principle: &Principle, query: &NormalizedQuery, cfg: &RetrievalConfig) -> f64 {
    if query.is_empty {
        return 0.0;
    }

    let mut total = 0.0;
    for kw in &principle.keywords {
        if query.has_word(kw) {
            total += cfg.keyword_weight;
        }
    }
    for syn in &principle.synonyms {
        if query.has_word(syn) {
            total += cfg.synonym_weight;
        }
    }
    for phrase in &principle.trigger_phrases {
        if query.has_phrase(phrase) {
            total += cfg.trigger_phrase_weight;
        }
    }
    for indicator in &principle.failure_indicators {
        if query.has_word(indicator) {
            total += cfg.failure_indicator_weight;
        }
    }
    for cond in &principle.applies_when {
        if query.has_phrase(cond) {
            total += cfg.applies_when_weight;
        }
    }

    // Override guidance outranks everything it matches at all.
    if principle.tier == Tier::Override {
        total *= cfg.override_boost;
    }
    total
}
