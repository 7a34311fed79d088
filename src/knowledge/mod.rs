//! Knowledge fact core
//!
//! Scoped fact storage for a multi-tenant agent platform:
//! - Four-level organizational scopes with downward-only visibility
//! - Per-graph fact stores with soft invalidation and confidence ranking
//! - A graph registry that fans reads out across declared parent chains

pub mod models;
pub mod router;
pub mod scope;
pub mod store;

pub use models::{
    AddFactRequest, Fact, FactSource, FactSourceType, InvalidateRequest, RegisterGraphRequest,
    SearchRequest, Validity,
};
pub use router::{GraphRouter, RegisteredGraph};
pub use scope::{is_visible, KnowledgeScope, ScopeLevel};
pub use store::KnowledgeStore;
