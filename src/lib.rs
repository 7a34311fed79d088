//! Knowledge fact service
//!
//! Multi-tenant knowledge store: callers remember short factual statements
//! tagged with an organizational scope, and recall the facts visible from a
//! scope, ranked by confidence. Facts live in per-graph stores; reads can
//! widen across a graph's declared parent chain, writes never do. Semantic
//! search is delegated to an external graph-memory engine when one is
//! configured, with an in-memory keyword matcher as the fallback.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod metrics;

pub use config::Config;
pub use error::{KnowledgeError, Result};
pub use knowledge::{
    is_visible, AddFactRequest, Fact, FactSource, FactSourceType, GraphRouter, KnowledgeScope,
    KnowledgeStore, ScopeLevel, SearchRequest,
};
