//! Corpus extractor: embedded markdown documents into a validated Catalog.
//!
//! Document grammar (one `# `-headed section per tier/topic/category):
//!
//! ```markdown
//! # topic:coding
//! name: Coding
//! priority: 10
//! keywords: code, specs
//! phrases: "code review"
//!
//! ## CODE-001: Specification completeness
//! - keywords: specs, specification
//! - synonyms: contract
//! - triggers: "seem incomplete"
//! - failure-indicators: rework
//! - applies-when: "before implementation"
//!
//! Principle body, returned verbatim.
//! ```
//!
//! Section headers are `tier:base`, `tier:procedure`, `topic:<id>`, or
//! `category:<id>`. Validation failures are fatal: the engine refuses to
//! start on a corpus that could serve inconsistent results.

use crate::core::assets;
use crate::core::catalog::{Catalog, Principle, SafetyCategory, Tier, Topic};
use crate::core::error::PreceptError;
use regex::Regex;
use std::collections::HashSet;

/// Build the catalog from the compile-time embedded corpus.
pub fn extract_embedded() -> Result<Catalog, PreceptError> {
    let docs: Vec<(&str, &str)> = assets::list_docs()
        .into_iter()
        .filter_map(|path| assets::get_embedded_doc(path).map(|content| (path, content)))
        .collect();
    extract_documents(&docs)
}

/// Parse a set of (name, content) documents and validate the result.
pub fn extract_documents(docs: &[(&str, &str)]) -> Result<Catalog, PreceptError> {
    let mut principles = Vec::new();
    let mut topics = Vec::new();
    let mut safety = Vec::new();

    for (name, content) in docs {
        for section in split_sections(content) {
            parse_section(name, &section, &mut principles, &mut topics, &mut safety)?;
        }
    }

    validate(&principles, &topics)?;
    Ok(Catalog::new(principles, topics, safety))
}

/// One `# `-headed top-level section: header value plus its lines.
struct Section {
    header: String,
    lines: Vec<String>,
}

fn split_sections(content: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    for line in content.lines() {
        if let Some(header) = line.strip_prefix("# ") {
            sections.push(Section {
                header: header.trim().to_string(),
                lines: Vec::new(),
            });
        } else if let Some(current) = sections.last_mut() {
            current.lines.push(line.to_string());
        }
    }
    sections
}

fn parse_section(
    doc: &str,
    section: &Section,
    principles: &mut Vec<Principle>,
    topics: &mut Vec<Topic>,
    safety: &mut Vec<SafetyCategory>,
) -> Result<(), PreceptError> {
    let (meta, body_from) = leading_metadata(&section.lines);

    let (tier, topic_id) = if section.header == "tier:base" {
        (Tier::Base, None)
    } else if section.header == "tier:procedure" {
        (Tier::Procedure, None)
    } else if let Some(id) = section.header.strip_prefix("topic:") {
        let id = id.trim().to_string();
        topics.push(Topic {
            id: id.clone(),
            name: meta_value(&meta, "name").unwrap_or_else(|| id.clone()),
            priority_rank: meta_value(&meta, "priority")
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| {
                    PreceptError::Config(format!(
                        "{}: topic '{}' is missing a numeric 'priority:' line",
                        doc, id
                    ))
                })?,
            trigger_keywords: meta_list(&meta, "keywords"),
            trigger_phrases: meta_list(&meta, "phrases"),
        });
        (Tier::Topic, Some(id))
    } else if let Some(id) = section.header.strip_prefix("category:") {
        let id = id.trim().to_string();
        safety.push(SafetyCategory {
            id: id.clone(),
            keywords: meta_list(&meta, "keywords"),
            phrases: meta_list(&meta, "phrases"),
        });
        (Tier::Override, None)
    } else {
        return Err(PreceptError::Config(format!(
            "{}: unrecognized section header '# {}'",
            doc, section.header
        )));
    };

    parse_principles(doc, &section.lines[body_from..], tier, topic_id, principles)
}

/// Key/value lines before the first `## ` principle header.
fn leading_metadata(lines: &[String]) -> (Vec<(String, String)>, usize) {
    let mut meta = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with("## ") {
            return (meta, i);
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() && !key.contains(' ') {
                meta.push((key.to_string(), value.trim().to_string()));
            }
        }
    }
    let len = lines.len();
    (meta, len)
}

fn meta_value(meta: &[(String, String)], key: &str) -> Option<String> {
    meta.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

fn meta_list(meta: &[(String, String)], key: &str) -> Vec<String> {
    meta_value(meta, key)
        .map(|v| parse_term_list(&v))
        .unwrap_or_default()
}

/// Comma-separated terms, optionally quoted, normalized to lowercase.
fn parse_term_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().trim_matches('"').trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_principles(
    doc: &str,
    lines: &[String],
    tier: Tier,
    section_topic: Option<String>,
    principles: &mut Vec<Principle>,
) -> Result<(), PreceptError> {
    let header_re = Regex::new(r"^## +([A-Za-z0-9_-]+): +(.+)$").map_err(|e| {
        PreceptError::Config(format!("internal principle header pattern: {}", e))
    })?;

    let mut blocks: Vec<(String, String, Vec<String>)> = Vec::new();
    for line in lines {
        if let Some(caps) = header_re.captures(line) {
            blocks.push((caps[1].to_string(), caps[2].trim().to_string(), Vec::new()));
        } else if line.starts_with("## ") {
            return Err(PreceptError::Config(format!(
                "{}: malformed principle header '{}' (expected '## ID: Title')",
                doc, line
            )));
        } else if let Some((_, _, block_lines)) = blocks.last_mut() {
            block_lines.push(line.clone());
        }
    }

    for (id, title, block_lines) in blocks {
        let mut principle = Principle {
            id,
            tier,
            topic: section_topic.clone(),
            title,
            keywords: Vec::new(),
            synonyms: Vec::new(),
            trigger_phrases: Vec::new(),
            failure_indicators: Vec::new(),
            applies_when: Vec::new(),
            text: String::new(),
        };

        let mut body = Vec::new();
        for line in &block_lines {
            let trimmed = line.trim();
            if let Some(bullet) = trimmed.strip_prefix("- ") {
                if let Some((key, value)) = bullet.split_once(':') {
                    match key.trim() {
                        "keywords" => principle.keywords = parse_term_list(value),
                        "synonyms" => principle.synonyms = parse_term_list(value),
                        "triggers" => principle.trigger_phrases = parse_term_list(value),
                        "failure-indicators" => {
                            principle.failure_indicators = parse_term_list(value)
                        }
                        "applies-when" => principle.applies_when = parse_term_list(value),
                        "topic" => {
                            principle.topic = Some(value.trim().to_lowercase());
                        }
                        other => {
                            return Err(PreceptError::Config(format!(
                                "{}: principle '{}' has unknown signal '- {}:'",
                                doc, principle.id, other
                            )));
                        }
                    }
                    continue;
                }
            }
            body.push(line.as_str());
        }
        principle.text = body.join("\n").trim().to_string();
        principles.push(principle);
    }
    Ok(())
}

/// Startup invariants. Any violation is fatal: refuse to serve rather than
/// serve inconsistent results.
fn validate(principles: &[Principle], topics: &[Topic]) -> Result<(), PreceptError> {
    let mut seen_principles = HashSet::new();
    let topic_ids: HashSet<&str> = topics.iter().map(|t| t.id.as_str()).collect();

    for p in principles {
        if !seen_principles.insert(p.id.as_str()) {
            return Err(PreceptError::Config(format!(
                "duplicate principle id '{}'",
                p.id
            )));
        }
        if p.text.is_empty() {
            return Err(PreceptError::Config(format!(
                "principle '{}' has an empty body",
                p.id
            )));
        }
        match p.tier {
            Tier::Override | Tier::Base => {
                if p.topic.is_some() {
                    return Err(PreceptError::Config(format!(
                        "{}-tier principle '{}' must not declare a topic",
                        p.tier.label(),
                        p.id
                    )));
                }
            }
            Tier::Topic => {
                let topic = p.topic.as_deref().unwrap_or("");
                if !topic_ids.contains(topic) {
                    return Err(PreceptError::Config(format!(
                        "topic-tier principle '{}' references unknown topic '{}'",
                        p.id, topic
                    )));
                }
            }
            Tier::Procedure => {
                if let Some(topic) = p.topic.as_deref() {
                    if !topic_ids.contains(topic) {
                        return Err(PreceptError::Config(format!(
                            "procedure '{}' references unknown topic '{}'",
                            p.id, topic
                        )));
                    }
                }
            }
        }
    }

    let mut seen_topics = HashSet::new();
    let mut seen_ranks = HashSet::new();
    for t in topics {
        if !seen_topics.insert(t.id.as_str()) {
            return Err(PreceptError::Config(format!("duplicate topic id '{}'", t.id)));
        }
        if !seen_ranks.insert(t.priority_rank) {
            return Err(PreceptError::Config(format!(
                "topic '{}' reuses priority rank {}; ranks must be a total order",
                t.id, t.priority_rank
            )));
        }
    }
    Ok(())
}
