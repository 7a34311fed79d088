//! Graph registry and cross-graph search routing
//!
//! Each tenant graph owns its facts. Reads may widen to one level of declared
//! parents so a child tenant sees shared knowledge without copying it; writes
//! never leave the graph they target.

use super::models::{AddFactRequest, Fact, SearchRequest};
use super::store::KnowledgeStore;
use crate::backend::GraphMemory;
use crate::error::{KnowledgeError, Result};
use dashmap::DashMap;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// A graph known to the router
#[derive(Clone)]
pub struct RegisteredGraph {
    pub graph_id: String,
    pub store: Arc<KnowledgeStore>,
    pub parent_chain: Vec<String>,
    pub inherit: bool,
    pub database: String,
}

/// Routes knowledge operations to the right graph store, with optional
/// parent-chain traversal on reads
pub struct GraphRouter {
    backend: Option<Arc<dyn GraphMemory>>,
    graphs: DashMap<String, RegisteredGraph>,
}

impl GraphRouter {
    /// Create a router. The backend handle, if any, is shared by every store
    /// this router registers.
    pub fn new(backend: Option<Arc<dyn GraphMemory>>) -> Self {
        Self {
            backend,
            graphs: DashMap::new(),
        }
    }

    /// Register a graph, creating its store.
    ///
    /// Destructive on duplicate ids: an existing entry is replaced and its
    /// in-memory facts are dropped.
    pub fn register_graph(
        &self,
        graph_id: impl Into<String>,
        _endpoint: Option<String>,
        database: impl Into<String>,
        parent_chain: Vec<String>,
        inherit: bool,
    ) {
        let graph_id = graph_id.into();
        let store = Arc::new(KnowledgeStore::new(self.backend.clone()));
        let replaced = self
            .graphs
            .insert(
                graph_id.clone(),
                RegisteredGraph {
                    graph_id: graph_id.clone(),
                    store,
                    parent_chain,
                    inherit,
                    database: database.into(),
                },
            )
            .is_some();
        if replaced {
            info!("Graph re-registered, prior store dropped: {}", graph_id);
        } else {
            info!("Graph registered: {}", graph_id);
        }
    }

    /// Remove a graph. No-op for unknown ids.
    pub fn unregister_graph(&self, graph_id: &str) {
        if self.graphs.remove(graph_id).is_some() {
            info!("Graph unregistered: {}", graph_id);
        }
    }

    pub fn is_registered(&self, graph_id: &str) -> bool {
        self.graphs.contains_key(graph_id)
    }

    pub fn get_store(&self, graph_id: &str) -> Option<Arc<KnowledgeStore>> {
        self.graphs.get(graph_id).map(|entry| entry.store.clone())
    }

    /// Graphs consulted for a read: the graph itself, then — when it
    /// inherits — each registered parent in declared order. Unregistered
    /// parents are skipped; grandparents are never followed.
    pub fn get_search_chain(&self, graph_id: &str) -> Vec<RegisteredGraph> {
        let entry = match self.graphs.get(graph_id) {
            Some(entry) => entry.clone(),
            None => return Vec::new(),
        };

        let mut chain = vec![entry.clone()];
        if !entry.inherit {
            return chain;
        }

        for parent_id in &entry.parent_chain {
            if let Some(parent) = self.graphs.get(parent_id) {
                chain.push(parent.clone());
            }
        }
        chain
    }

    /// Fan a search out across the graph's chain, merge, dedup by content
    /// (first occurrence wins), re-rank by confidence, truncate.
    pub async fn search(&self, graph_id: &str, req: &SearchRequest) -> Result<Vec<Fact>> {
        let chain = self.get_search_chain(graph_id);
        if chain.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Search fan-out: graph={}, chain_len={}", graph_id, chain.len());

        let searches = chain.iter().map(|entry| entry.store.search(req));
        // join_all keeps chain order, so the merge is deterministic no
        // matter which store finishes first
        let mut all_results: Vec<Fact> = Vec::new();
        for results in join_all(searches).await {
            all_results.extend(results?);
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut unique: Vec<Fact> = Vec::new();
        for fact in all_results {
            if seen.insert(fact.content.clone()) {
                unique.push(fact);
            }
        }

        unique.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        unique.truncate(req.max_results);
        Ok(unique)
    }

    /// Add a fact to exactly the named graph. Writes are never routed to
    /// parents.
    pub async fn add_fact(&self, graph_id: &str, req: AddFactRequest) -> Result<String> {
        let store = self
            .get_store(graph_id)
            .ok_or_else(|| KnowledgeError::UnknownGraph(graph_id.to_string()))?;
        store.add_fact(req).await
    }

    /// Invalidate a fact in exactly the named graph
    pub async fn invalidate(&self, graph_id: &str, fact_id: &str, reason: &str) -> Result<()> {
        let store = self
            .get_store(graph_id)
            .ok_or_else(|| KnowledgeError::UnknownGraph(graph_id.to_string()))?;
        store.invalidate(fact_id, reason).await
    }
}
