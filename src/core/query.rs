//! Query normalization: per-request context, tokenization, truncation.
//!
//! All matching downstream works on two views of the query: a lowercase
//! rendering (for substring phrase checks) and a whole-word token set
//! (for keyword checks). No stemming, no fuzzy matching: "code" is not
//! a token of "decode".

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Ephemeral per-request parameters. Discarded after the response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryContext {
    pub raw_text: String,
    pub explicit_topic: Option<String>,
    pub output_budget: usize,
    pub include_base_in_output: bool,
}

impl QueryContext {
    pub fn new(raw_text: &str) -> Self {
        QueryContext {
            raw_text: raw_text.to_string(),
            explicit_topic: None,
            output_budget: 5,
            include_base_in_output: true,
        }
    }

    pub fn with_topic(mut self, topic: &str) -> Self {
        self.explicit_topic = Some(topic.to_string());
        self
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.output_budget = budget;
        self
    }

    pub fn without_base(mut self) -> Self {
        self.include_base_in_output = false;
        self
    }
}

/// Normalized view of a query, computed once per retrieval.
#[derive(Debug, Clone)]
pub struct NormalizedQuery {
    /// Lowercased (possibly truncated) text for substring phrase matching.
    pub lowered: String,
    /// Whole-word token set for keyword matching.
    pub tokens: FxHashSet<String>,
    pub truncated: bool,
    pub is_empty: bool,
}

impl NormalizedQuery {
    pub fn from_raw(raw: &str, max_chars: usize) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return NormalizedQuery {
                lowered: String::new(),
                tokens: FxHashSet::default(),
                truncated: false,
                is_empty: true,
            };
        }

        let mut truncated = false;
        let bounded: String = if trimmed.chars().count() > max_chars {
            truncated = true;
            trimmed.chars().take(max_chars).collect()
        } else {
            trimmed.to_string()
        };

        let lowered = bounded.to_lowercase();
        let tokens = tokenize(&lowered);

        NormalizedQuery {
            lowered,
            tokens,
            truncated,
            is_empty: false,
        }
    }

    /// Whole-word check: the term must equal a complete query token.
    pub fn has_word(&self, term: &str) -> bool {
        self.tokens.contains(term)
    }

    /// Substring check over the lowered query text.
    pub fn has_phrase(&self, phrase: &str) -> bool {
        !phrase.is_empty() && self.lowered.contains(phrase)
    }
}

/// Split lowered text into word tokens. Hyphenated chunks contribute both
/// the joined form and each part, so "multi-agent" matches either spelling.
pub fn tokenize(lowered: &str) -> FxHashSet<String> {
    let mut tokens = FxHashSet::default();
    for chunk in lowered.split_whitespace() {
        let cleaned = chunk.trim_matches(|c: char| !c.is_alphanumeric() && c != '-');
        if cleaned.is_empty() {
            continue;
        }
        tokens.insert(cleaned.trim_matches('-').to_string());
        if cleaned.contains('-') {
            for part in cleaned.split('-').filter(|p| !p.is_empty()) {
                tokens.insert(part.to_string());
            }
        }
    }
    tokens.remove("");
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_word_does_not_match_inside_larger_token() {
        let q = NormalizedQuery::from_raw("let's decode this", 2000);
        assert!(!q.has_word("code"));
        let q = NormalizedQuery::from_raw("please code this", 2000);
        assert!(q.has_word("code"));
    }

    #[test]
    fn punctuation_is_stripped_from_token_edges() {
        let q = NormalizedQuery::from_raw("Specs seem incomplete, should I proceed?", 2000);
        assert!(q.has_word("incomplete"));
        assert!(q.has_word("proceed"));
        assert!(q.has_word("specs"));
    }

    #[test]
    fn hyphenated_tokens_match_both_forms() {
        let q = NormalizedQuery::from_raw("a multi-agent setup", 2000);
        assert!(q.has_word("multi-agent"));
        assert!(q.has_word("agent"));
    }

    #[test]
    fn whitespace_only_query_is_empty() {
        let q = NormalizedQuery::from_raw("   \t ", 2000);
        assert!(q.is_empty);
        assert!(q.tokens.is_empty());
    }

    #[test]
    fn over_length_query_truncates_deterministically() {
        let long = "word ".repeat(600);
        let a = NormalizedQuery::from_raw(&long, 100);
        let b = NormalizedQuery::from_raw(&long, 100);
        assert!(a.truncated);
        assert_eq!(a.lowered, b.lowered);
        assert_eq!(a.lowered.chars().count(), 100);
    }

    #[test]
    fn phrase_match_is_substring_on_lowered_text() {
        let q = NormalizedQuery::from_raw("This might EXPOSE user DATA", 2000);
        assert!(q.has_phrase("user data"));
        assert!(!q.has_phrase("user database"));
        assert!(!q.has_phrase(""));
    }
}
