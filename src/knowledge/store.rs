//! Per-graph knowledge store
//!
//! Owns the facts added to one graph. Writes always land in the in-memory
//! map; when a graph-memory backend is configured the content is forwarded
//! as an episode (best effort) and searches delegate to the backend. Without
//! a backend, searches run the in-memory keyword matcher.

use super::models::{AddFactRequest, Fact, FactSource, FactSourceType, SearchRequest, Validity};
use super::scope::{is_visible, KnowledgeScope};
use crate::backend::{GraphMemory, RawSearchResult};
use crate::error::Result;
use chrono::Utc;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// Knowledge store for a single graph
pub struct KnowledgeStore {
    backend: Option<Arc<dyn GraphMemory>>,
    // IndexMap keeps insertion order, which is the tie-break for equal
    // confidence in fallback search
    facts: RwLock<IndexMap<String, Fact>>,
}

impl KnowledgeStore {
    /// Create a store. `backend = None` selects the in-memory fallback for
    /// the store's whole lifetime.
    pub fn new(backend: Option<Arc<dyn GraphMemory>>) -> Self {
        Self {
            backend,
            facts: RwLock::new(IndexMap::new()),
        }
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Add a fact and return its generated id.
    ///
    /// The in-memory record is authoritative: a backend forwarding failure
    /// is logged and swallowed, never surfaced to the caller.
    pub async fn add_fact(&self, req: AddFactRequest) -> Result<String> {
        req.scope.validate()?;

        let fact_id = Uuid::new_v4().to_string();
        let fact = Fact {
            id: fact_id.clone(),
            content: req.content.clone(),
            scope: req.scope.clone(),
            source: req.source.clone(),
            confidence: req.confidence,
            valid_from: Utc::now(),
            validity: Validity::Active,
            valid_until: None,
            tags: req.tags,
        };

        if let Some(backend) = &self.backend {
            let outcome = backend
                .add_episode(
                    &format!("fact-{}", fact_id),
                    &req.content,
                    &format!("kais:{}", req.source.source_type.as_str()),
                    &req.scope.group_id(),
                )
                .await;
            if let Err(e) = outcome {
                warn!("Backend episode forwarding failed for {}: {}", fact_id, e);
            }
        }

        self.facts.write().await.insert(fact_id.clone(), fact);
        debug!("Fact added: id={}", fact_id);
        Ok(fact_id)
    }

    /// Search facts visible from the request scope, ranked by confidence.
    ///
    /// With a configured backend the backend does the ranking and its errors
    /// propagate; only an absent backend uses the keyword fallback.
    pub async fn search(&self, req: &SearchRequest) -> Result<Vec<Fact>> {
        if let Some(backend) = &self.backend {
            let results = backend
                .search(&req.query, &req.scope.visible_groups(), req.max_results)
                .await?;
            return Ok(map_backend_results(results, &req.scope));
        }

        let tokens: Vec<String> = req
            .query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let facts = self.facts.read().await;
        let mut matches: Vec<Fact> = facts
            .values()
            .filter(|fact| {
                if !req.include_invalidated && !fact.validity.is_active() {
                    return false;
                }
                if fact.confidence < req.min_confidence {
                    return false;
                }
                if !is_visible(&fact.scope, &req.scope) {
                    return false;
                }
                matches_tokens(fact, &tokens)
            })
            .cloned()
            .collect();
        drop(facts);

        // stable sort: equal confidence keeps insertion order
        matches.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(req.max_results);
        Ok(matches)
    }

    /// Close the validity window on a fact. Unknown ids are a no-op.
    pub async fn invalidate(&self, fact_id: &str, reason: &str) -> Result<()> {
        let mut facts = self.facts.write().await;
        if let Some(fact) = facts.get_mut(fact_id) {
            fact.invalidate(reason);
            debug!("Fact invalidated: id={}, reason={}", fact_id, reason);
        }
        Ok(())
    }

    /// Number of facts held in memory, including invalidated ones
    pub async fn len(&self) -> usize {
        self.facts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.facts.read().await.is_empty()
    }
}

/// Case-insensitive whole-word match of any query token against the fact's
/// content or tags. No tokens (empty query) matches nothing.
fn matches_tokens(fact: &Fact, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return false;
    }
    let word_matches = |text: &str| {
        text.split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .any(|w| tokens.iter().any(|t| *t == w))
    };
    word_matches(&fact.content) || fact.tags.iter().any(|tag| word_matches(tag))
}

/// Shape backend rows into facts. Backend rows carry no provenance, so the
/// source is recorded as promoted knowledge.
fn map_backend_results(results: Vec<RawSearchResult>, query_scope: &KnowledgeScope) -> Vec<Fact> {
    results
        .into_iter()
        .map(|row| {
            let scope = row
                .group_id
                .as_deref()
                .and_then(KnowledgeScope::from_group_id)
                .unwrap_or_else(|| query_scope.clone());
            Fact {
                id: row.uuid,
                content: row.fact,
                scope,
                source: FactSource::new(FactSourceType::Promoted),
                confidence: row.score.clamp(0.0, 1.0),
                valid_from: Utc::now(),
                validity: Validity::Active,
                valid_until: None,
                tags: vec![],
            }
        })
        .collect()
}
