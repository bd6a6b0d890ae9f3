//! Retrieval configuration: every signal weight and threshold in one place.
//!
//! Defaults match the documented retrieval contract. A project may override
//! individual values through a TOML file; unknown keys are rejected so a
//! typo cannot silently fall back to defaults.

use crate::core::error::PreceptError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Per-signal weights for the relevance scorer.
    pub keyword_weight: f64,
    pub synonym_weight: f64,
    pub trigger_phrase_weight: f64,
    pub failure_indicator_weight: f64,
    pub applies_when_weight: f64,
    /// Multiplier applied to Override-tier scores after accumulation.
    pub override_boost: f64,
    /// Added per matched trigger phrase during topic detection.
    pub topic_phrase_boost: f64,
    /// Minimum detection score for a topic to qualify.
    pub topic_min_score: f64,
    /// Result cap for the non-Override remainder of a retrieval.
    pub default_output_budget: usize,
    /// Queries longer than this are truncated before tokenizing.
    pub max_query_chars: usize,
    /// Topic returned when detection finds nothing. None means Base-only.
    pub default_topic: Option<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        RetrievalConfig {
            keyword_weight: 1.0,
            synonym_weight: 0.8,
            trigger_phrase_weight: 2.0,
            failure_indicator_weight: 1.5,
            applies_when_weight: 1.2,
            override_boost: 10.0,
            topic_phrase_boost: 2.0,
            topic_min_score: 1.0,
            default_output_budget: 5,
            max_query_chars: 2000,
            default_topic: None,
        }
    }
}

/// Partial shape for TOML overrides: every field optional, merged over
/// defaults field by field.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverride {
    keyword_weight: Option<f64>,
    synonym_weight: Option<f64>,
    trigger_phrase_weight: Option<f64>,
    failure_indicator_weight: Option<f64>,
    applies_when_weight: Option<f64>,
    override_boost: Option<f64>,
    topic_phrase_boost: Option<f64>,
    topic_min_score: Option<f64>,
    default_output_budget: Option<usize>,
    max_query_chars: Option<usize>,
    default_topic: Option<String>,
}

impl RetrievalConfig {
    /// Load defaults merged with an optional TOML override file.
    pub fn load(override_path: Option<&Path>) -> Result<Self, PreceptError> {
        let mut cfg = RetrievalConfig::default();
        if let Some(path) = override_path {
            let raw = std::fs::read_to_string(path)?;
            let over: ConfigOverride = toml::from_str(&raw)?;
            cfg.apply(over);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply(&mut self, over: ConfigOverride) {
        if let Some(v) = over.keyword_weight {
            self.keyword_weight = v;
        }
        if let Some(v) = over.synonym_weight {
            self.synonym_weight = v;
        }
        if let Some(v) = over.trigger_phrase_weight {
            self.trigger_phrase_weight = v;
        }
        if let Some(v) = over.failure_indicator_weight {
            self.failure_indicator_weight = v;
        }
        if let Some(v) = over.applies_when_weight {
            self.applies_when_weight = v;
        }
        if let Some(v) = over.override_boost {
            self.override_boost = v;
        }
        if let Some(v) = over.topic_phrase_boost {
            self.topic_phrase_boost = v;
        }
        if let Some(v) = over.topic_min_score {
            self.topic_min_score = v;
        }
        if let Some(v) = over.default_output_budget {
            self.default_output_budget = v;
        }
        if let Some(v) = over.max_query_chars {
            self.max_query_chars = v;
        }
        if over.default_topic.is_some() {
            self.default_topic = over.default_topic;
        }
    }

    pub fn validate(&self) -> Result<(), PreceptError> {
        let weights = [
            ("keyword_weight", self.keyword_weight),
            ("synonym_weight", self.synonym_weight),
            ("trigger_phrase_weight", self.trigger_phrase_weight),
            ("failure_indicator_weight", self.failure_indicator_weight),
            ("applies_when_weight", self.applies_when_weight),
            ("override_boost", self.override_boost),
            ("topic_phrase_boost", self.topic_phrase_boost),
            ("topic_min_score", self.topic_min_score),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(PreceptError::Config(format!(
                    "{} must be a non-negative finite number, got {}",
                    name, value
                )));
            }
        }
        if self.default_output_budget == 0 {
            return Err(PreceptError::Config(
                "default_output_budget must be at least 1".to_string(),
            ));
        }
        if self.max_query_chars == 0 {
            return Err(PreceptError::Config(
                "max_query_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
