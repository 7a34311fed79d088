//! Graph-memory backend capability
//!
//! The store talks to the external semantic-search engine through this
//! narrow contract. When no backend is configured the store falls back to
//! in-memory keyword matching; selection happens once at construction, never
//! per call.

pub mod graphiti;

pub use graphiti::{GraphitiClient, GraphitiConfig};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One result row from the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSearchResult {
    pub uuid: String,
    pub fact: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub group_id: Option<String>,
}

/// External graph-memory engine contract
#[async_trait]
pub trait GraphMemory: Send + Sync {
    /// Ingest one episode of content under a scope group
    async fn add_episode(
        &self,
        name: &str,
        content: &str,
        source_description: &str,
        group_id: &str,
    ) -> Result<()>;

    /// Semantic search restricted to the given groups
    async fn search(
        &self,
        query: &str,
        group_ids: &[String],
        num_results: usize,
    ) -> Result<Vec<RawSearchResult>>;

    /// One-time index/constraint setup
    async fn build_indices_and_constraints(&self) -> Result<()>;

    /// Release the connection
    async fn close(&self);
}
