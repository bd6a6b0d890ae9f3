//! Command handlers: render retrieval results for terminal and JSON output.
//!
//! All clap-derived types live in `lib.rs`; this module owns presentation
//! and audit delivery.

use crate::core::audit::{self, AuditEvent};
use crate::core::catalog::{self, Catalog};
use crate::core::config::RetrievalConfig;
use crate::core::error::PreceptError;
use crate::core::output::{compact_line, format_score};
use crate::core::query::QueryContext;
use crate::core::retrieve::{self, RetrievalResult};
use crate::core::time::command_envelope;
use colored::Colorize;
use std::path::Path;

pub enum Format {
    Text,
    Json,
}

impl Format {
    pub fn parse(raw: &str) -> Result<Self, PreceptError> {
        match raw {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => Err(PreceptError::Config(format!(
                "unknown output format '{}'; expected 'text' or 'json'",
                other
            ))),
        }
    }
}

pub fn run_retrieve(
    catalog: &Catalog,
    cfg: &RetrievalConfig,
    ctx: &QueryContext,
    format: &Format,
    audit_root: &Path,
) -> Result<(), PreceptError> {
    let result = retrieve::retrieve(catalog, cfg, ctx);

    // Fire-and-forget audit delivery: a failed append warns, never fails.
    let event = AuditEvent::from_result(ctx, &result);
    if let Err(e) = audit::append_event(&audit::audit_path(audit_root), &event) {
        eprintln!("{} audit event not recorded: {}", "warning:".yellow(), e);
    }

    match format {
        Format::Json => {
            let envelope = command_envelope(
                "retrieve",
                "ok",
                serde_json::json!({ "result": result }),
            );
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Format::Text => render_result_text(&result),
    }
    Ok(())
}

fn render_result_text(result: &RetrievalResult) {
    for warning in &result.warnings {
        eprintln!("{} {}", "warning:".yellow(), warning);
    }
    if result.query_truncated {
        eprintln!("{} query exceeded the length cap and was truncated", "note:".cyan());
    }

    if result.empty_query {
        println!("{}", "No query given; nothing to retrieve.".dimmed());
        return;
    }
    if result.no_matches {
        println!(
            "{}",
            "No principles matched. Try rephrasing, or run `precept topics` to browse scopes."
                .dimmed()
        );
        return;
    }

    if !result.triggered_safety.is_empty() {
        println!(
            "{} {}",
            "safety:".red().bold(),
            result.triggered_safety.join(", ")
        );
    }
    if !result.active_topics.is_empty() {
        println!("{} {}", "topics:".cyan(), result.active_topics.join(", "));
    }

    for ranked in &result.results {
        let tier = match ranked.tier.label() {
            "override" => "override".red().bold().to_string(),
            label => label.cyan().to_string(),
        };
        println!(
            "{} [{}] {}: {}",
            format_score(ranked.score).bold(),
            tier,
            ranked.principle_id,
            ranked.title
        );
        println!("          {}", compact_line(&ranked.text, 160).dimmed());
    }
}

pub fn run_lookup(catalog: &Catalog, id: &str, format: &Format) -> Result<(), PreceptError> {
    let principle = catalog::lookup_by_id(catalog, id)?;
    match format {
        Format::Json => {
            let envelope = command_envelope(
                "lookup",
                "ok",
                serde_json::json!({ "principle": principle }),
            );
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Format::Text => {
            println!(
                "{} [{}] {}",
                principle.id.bold(),
                principle.tier.label(),
                principle.title
            );
            if let Some(topic) = &principle.topic {
                println!("topic: {}", topic);
            }
            println!("\n{}", principle.text);
        }
    }
    Ok(())
}

pub fn run_topics(catalog: &Catalog, format: &Format) -> Result<(), PreceptError> {
    let topics = catalog::list_topics(catalog);
    match format {
        Format::Json => {
            let envelope =
                command_envelope("topics", "ok", serde_json::json!({ "topics": topics }));
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Format::Text => {
            for topic in topics {
                println!(
                    "{:<16} rank {:<4} {}",
                    topic.id.bold(),
                    topic.priority_rank,
                    topic.name
                );
            }
        }
    }
    Ok(())
}

pub fn run_check(catalog: &Catalog) -> Result<(), PreceptError> {
    let overrides = catalog
        .principles
        .iter()
        .filter(|p| p.tier == crate::core::catalog::Tier::Override)
        .count();
    println!(
        "Corpus OK: {} principles ({} override), {} topics, {} safety categories",
        catalog.principles.len(),
        overrides,
        catalog.topics.len(),
        catalog.safety.len()
    );
    println!("digest: {}", catalog.digest);
    Ok(())
}
