//! Structured audit trail: one jsonl event per retrieval.
//!
//! The orchestrator's obligation ends at producing the event; appending it
//! to `precept.events.jsonl` is fire-and-forget and never fails the query.

use crate::core::output::compact_line;
use crate::core::query::QueryContext;
use crate::core::retrieve::RetrievalResult;
use crate::core::time::{new_event_id, now_epoch_z};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const AUDIT_FILE: &str = "precept.events.jsonl";
const QUERY_SUMMARY_CHARS: usize = 120;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditEvent {
    pub schema_version: String,
    pub event_id: String,
    pub ts: String,
    /// Compacted, bounded rendering of the query text.
    pub query_summary: String,
    pub active_topics: Vec<String>,
    pub triggered_safety: Vec<String>,
    pub result_ids: Vec<String>,
    pub resolution: String,
    pub catalog_digest: String,
}

impl AuditEvent {
    pub fn from_result(ctx: &QueryContext, result: &RetrievalResult) -> Self {
        let resolution = serde_json::to_value(result.resolution)
            .ok()
            .and_then(|v| v.as_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "none".to_string());
        AuditEvent {
            schema_version: "1.0.0".to_string(),
            event_id: new_event_id(),
            ts: now_epoch_z(),
            query_summary: compact_line(&ctx.raw_text, QUERY_SUMMARY_CHARS),
            active_topics: result.active_topics.clone(),
            triggered_safety: result.triggered_safety.clone(),
            result_ids: result
                .results
                .iter()
                .map(|r| r.principle_id.clone())
                .collect(),
            resolution,
            catalog_digest: result.catalog_digest.clone(),
        }
    }
}

pub fn audit_path(root: &Path) -> PathBuf {
    root.join(AUDIT_FILE)
}

/// Append one event as a jsonl line. Errors are reported to the caller so
/// the surface layer can downgrade them to a warning.
pub fn append_event(path: &Path, event: &AuditEvent) -> std::io::Result<()> {
    let line = serde_json::to_string(event)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{}", line)
}
