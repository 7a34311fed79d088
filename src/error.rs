//! Error types for the knowledge service

use thiserror::Error;

/// Errors surfaced by the knowledge core and its API
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// A write or invalidate targeted a graph id that is not registered
    #[error("unknown knowledge graph: {0}")]
    UnknownGraph(String),

    /// A configured backend call failed mid-request
    #[error("graph memory backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Malformed request rejected before any store mutation
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, KnowledgeError>;

impl From<config::ConfigError> for KnowledgeError {
    fn from(e: config::ConfigError) -> Self {
        KnowledgeError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for KnowledgeError {
    fn from(e: reqwest::Error) -> Self {
        KnowledgeError::BackendUnavailable(e.to_string())
    }
}
