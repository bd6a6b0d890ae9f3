//! Precept: tiered principle retrieval for AI agents
//!
//! **Precept answers one question: which short, authoritative principles
//! apply to this query, right now?**
//!
//! The corpus is small (tens to low hundreds of records) and organized into
//! a strict hierarchy:
//!
//! - **Override**: supreme safety guidance, always scanned, outranks
//!   everything it matches
//! - **Base**: universally applicable guidance, always scored
//! - **Topic**: guidance scoped to a detected or explicitly named topic
//! - **Procedure**: optional implementation notes
//!
//! Retrieval is deterministic keyword/phrase matching: no embeddings, no
//! learned ranking, no fuzzy matching. The whole engine is a pure function
//! of an immutable catalog snapshot and one per-call query context, so
//! concurrent queries need no locking and hot reload is a snapshot swap.
//!
//! # Pipeline
//!
//! 1. Safety detection over the query (unconditional)
//! 2. Topic resolution: explicit topic → detection → default → Base-only,
//!    with the score → priority-rank → multi-activation tie-break
//! 3. Multi-signal weighted scoring of every candidate principle
//! 4. Override-first ordering, then score/tier/id, truncated to budget
//!
//! # Example
//!
//! ```bash
//! # What applies to this situation?
//! precept retrieve "specs seem incomplete, should I proceed?"
//!
//! # Pin the topic explicitly; 'general' means Base tier only
//! precept retrieve "help me think through this" --topic general
//!
//! # Read one principle in full
//! precept lookup BASE-001
//!
//! # Browse topic scopes / validate the embedded corpus
//! precept topics
//! precept check
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: catalog model, extractor, resolver, scorer, safety detector,
//!   orchestrator, audit events
//! - [`cli`]: terminal/JSON rendering for the command surface

pub mod cli;
pub mod core;

use crate::cli::Format;
use crate::core::config::RetrievalConfig;
use crate::core::error::PreceptError;
use crate::core::extract;
use crate::core::query::QueryContext;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "precept",
    version = env!("CARGO_PKG_VERSION"),
    about = "Tiered principle retrieval for AI agents: resolve topics, detect safety overrides, rank the guidance that applies."
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
    /// Optional TOML file overriding retrieval weights and thresholds.
    #[clap(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Retrieve the principles relevant to a free-text query
    Retrieve {
        /// Query text
        text: String,
        /// Explicit topic id ('general' pins Base tier only)
        #[clap(long)]
        topic: Option<String>,
        /// Result cap for non-override principles (default from config)
        #[clap(long)]
        budget: Option<usize>,
        /// Suppress Base-tier principles from the output
        #[clap(long)]
        no_base: bool,
        /// Output format: 'text' or 'json'
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Show one principle in full by id
    Lookup {
        /// Principle id, e.g. BASE-001
        id: String,
        /// Output format: 'text' or 'json'
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// List topic scopes with their priority ranks
    Topics {
        /// Output format: 'text' or 'json'
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Extract and validate the embedded corpus, print its digest
    Check,
}

pub fn run() -> Result<(), PreceptError> {
    let cli = Cli::parse();
    let cfg = RetrievalConfig::load(cli.config.as_deref())?;
    let catalog = extract::extract_embedded()?;
    let audit_root = std::env::current_dir()?;

    match cli.command {
        Command::Retrieve {
            text,
            topic,
            budget,
            no_base,
            format,
        } => {
            let format = Format::parse(&format)?;
            let mut ctx = QueryContext::new(&text)
                .with_budget(budget.unwrap_or(cfg.default_output_budget));
            ctx.explicit_topic = topic;
            if no_base {
                ctx = ctx.without_base();
            }
            cli::run_retrieve(&catalog, &cfg, &ctx, &format, &audit_root)
        }
        Command::Lookup { id, format } => {
            let format = Format::parse(&format)?;
            cli::run_lookup(&catalog, &id, &format)
        }
        Command::Topics { format } => {
            let format = Format::parse(&format)?;
            cli::run_topics(&catalog, &format)
        }
        Command::Check => cli::run_check(&catalog),
    }
}
