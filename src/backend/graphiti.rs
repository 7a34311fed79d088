//! HTTP adapter for the Graphiti graph-memory service

use super::{GraphMemory, RawSearchResult};
use crate::error::{KnowledgeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Graphiti connection settings
#[derive(Debug, Clone)]
pub struct GraphitiConfig {
    pub uri: String,
    pub user: Option<String>,
    pub password: Option<SecretString>,
    pub database: String,
    pub timeout: Duration,
}

impl Default for GraphitiConfig {
    fn default() -> Self {
        Self {
            uri: "http://localhost:8000".to_string(),
            user: None,
            password: None,
            database: "knowledge".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Graphiti client over HTTP
pub struct GraphitiClient {
    config: GraphitiConfig,
    client: Client,
}

impl GraphitiClient {
    /// Create a new client
    pub fn new(config: GraphitiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| KnowledgeError::Internal(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(format!("{}{}", self.config.uri.trim_end_matches('/'), path));
        if let Some(user) = &self.config.user {
            let password = self
                .config
                .password
                .as_ref()
                .map(|p| p.expose_secret().clone());
            builder = builder.basic_auth(user, password);
        }
        builder
    }
}

#[async_trait]
impl GraphMemory for GraphitiClient {
    async fn add_episode(
        &self,
        name: &str,
        content: &str,
        source_description: &str,
        group_id: &str,
    ) -> Result<()> {
        debug!("Adding episode: name={}, group={}", name, group_id);

        let response = self
            .request("/episodes")
            .json(&json!({
                "name": name,
                "episode_body": content,
                "source_description": source_description,
                "group_id": group_id,
                "database": self.config.database,
            }))
            .send()
            .await?;

        response.error_for_status()?;
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        group_ids: &[String],
        num_results: usize,
    ) -> Result<Vec<RawSearchResult>> {
        debug!(
            "Backend search: query={:?}, groups={}, num_results={}",
            query,
            group_ids.len(),
            num_results
        );

        let response = self
            .request("/search")
            .json(&json!({
                "query": query,
                "group_ids": group_ids,
                "num_results": num_results,
                "database": self.config.database,
            }))
            .send()
            .await?
            .error_for_status()?;

        let results: Vec<RawSearchResult> = response.json().await?;
        Ok(results)
    }

    async fn build_indices_and_constraints(&self) -> Result<()> {
        let response = self
            .request("/indices")
            .json(&json!({ "database": self.config.database }))
            .send()
            .await?;
        response.error_for_status()?;
        Ok(())
    }

    async fn close(&self) {
        // reqwest pools close on drop; nothing to flush
    }
}
