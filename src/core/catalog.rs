//! Catalog data model: tiered principles, topics, and safety categories.
//!
//! The catalog is an immutable snapshot built once by the extractor and
//! shared by reference across concurrent queries. Hot reload swaps a whole
//! new snapshot into the [`CatalogHandle`]; in-flight queries keep reading
//! the snapshot they started with.

use crate::core::error::PreceptError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{Arc, RwLock};

/// Hierarchy level of a principle. Override is supreme, Base always applies,
/// Topic applies only when its topic is active, Procedure is an optional
/// implementation note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Override,
    Base,
    Topic,
    Procedure,
}

impl Tier {
    /// Precedence rank used as a sort tie-breaker. Lower ranks sort first.
    pub fn rank(&self) -> u8 {
        match self {
            Tier::Override => 0,
            Tier::Base => 1,
            Tier::Topic => 2,
            Tier::Procedure => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Override => "override",
            Tier::Base => "base",
            Tier::Topic => "topic",
            Tier::Procedure => "procedure",
        }
    }
}

/// An atomic unit of guidance. The `text` body is returned verbatim,
/// never chunked, never summarized.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Principle {
    pub id: String,
    pub tier: Tier,
    /// Owning topic id. None for Override/Base principles and for
    /// procedures that apply regardless of topic.
    pub topic: Option<String>,
    pub title: String,
    /// Matching signals, normalized to lowercase at extraction time.
    pub keywords: Vec<String>,
    pub synonyms: Vec<String>,
    pub trigger_phrases: Vec<String>,
    pub failure_indicators: Vec<String>,
    pub applies_when: Vec<String>,
    pub text: String,
}

/// A named subject-matter scope that activates its principles when
/// detected in a query.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    /// Lower rank wins detection-score ties. Ranks must form a total order;
    /// the extractor refuses duplicates at startup.
    pub priority_rank: u32,
    pub trigger_keywords: Vec<String>,
    pub trigger_phrases: Vec<String>,
}

/// A named override class whose trigger terms make the safety detector
/// mark the category "hot" for a query.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SafetyCategory {
    pub id: String,
    pub keywords: Vec<String>,
    pub phrases: Vec<String>,
}

/// Immutable retrieval corpus: every principle, topic, and safety category,
/// plus a content digest for idempotence checks and audit correlation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Catalog {
    pub principles: Vec<Principle>,
    pub topics: Vec<Topic>,
    pub safety: Vec<SafetyCategory>,
    pub digest: String,
}

impl Catalog {
    /// Assemble a catalog from validated parts, computing the digest over
    /// the canonical (id-sorted) contents.
    pub fn new(
        mut principles: Vec<Principle>,
        mut topics: Vec<Topic>,
        mut safety: Vec<SafetyCategory>,
    ) -> Self {
        principles.sort_by(|a, b| a.id.cmp(&b.id));
        topics.sort_by(|a, b| a.id.cmp(&b.id));
        safety.sort_by(|a, b| a.id.cmp(&b.id));

        let mut hasher = Sha256::new();
        for p in &principles {
            hasher.update(p.id.as_bytes());
            hasher.update([p.tier.rank()]);
            hasher.update(p.text.as_bytes());
        }
        for t in &topics {
            hasher.update(t.id.as_bytes());
            hasher.update(t.priority_rank.to_le_bytes());
        }
        for s in &safety {
            hasher.update(s.id.as_bytes());
        }
        let digest = format!("{:x}", hasher.finalize());

        Catalog {
            principles,
            topics,
            safety,
            digest,
        }
    }

    pub fn principle(&self, id: &str) -> Option<&Principle> {
        self.principles.iter().find(|p| p.id == id)
    }

    pub fn topic(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }
}

/// Look up a principle by id, returning a typed not-found error that
/// carries the requested id and a browse suggestion.
pub fn lookup_by_id<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a Principle, PreceptError> {
    catalog
        .principle(id)
        .ok_or_else(|| PreceptError::NotFound(id.to_string()))
}

pub fn list_topics(catalog: &Catalog) -> &[Topic] {
    &catalog.topics
}

/// Shared handle over the current catalog snapshot. Readers clone the Arc
/// and keep it for the whole query; `reload` swaps the snapshot atomically.
pub struct CatalogHandle {
    inner: RwLock<Arc<Catalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        CatalogHandle {
            inner: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn reload(&self, catalog: Catalog) {
        let next = Arc::new(catalog);
        match self.inner.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}
