//! Data models for the knowledge fact store

use super::scope::KnowledgeScope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a fact came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactSourceType {
    MissionExtraction,
    Experiment,
    UserInput,
    Promoted,
    ExplicitRemember,
}

impl FactSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactSourceType::MissionExtraction => "mission_extraction",
            FactSourceType::Experiment => "experiment",
            FactSourceType::UserInput => "user_input",
            FactSourceType::Promoted => "promoted",
            FactSourceType::ExplicitRemember => "explicit_remember",
        }
    }
}

/// Provenance of a fact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactSource {
    #[serde(rename = "type")]
    pub source_type: FactSourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<String>,
}

impl FactSource {
    pub fn new(source_type: FactSourceType) -> Self {
        Self {
            source_type,
            mission_id: None,
            experiment_id: None,
        }
    }
}

/// Fact lifecycle state. Facts are never physically deleted; invalidation
/// closes the validity window and records why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Validity {
    Active,
    Invalidated {
        at: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl Validity {
    pub fn is_active(&self) -> bool {
        matches!(self, Validity::Active)
    }
}

/// A scoped, confidence-scored statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    pub content: String,
    pub scope: KnowledgeScope,
    pub source: FactSource,
    pub confidence: f64,
    pub valid_from: DateTime<Utc>,
    pub validity: Validity,
    /// Closed end of the validity window, mirrored from `validity` for
    /// wire compatibility with older consumers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Fact {
    /// Mark the fact invalid as of now. Idempotent: a second invalidation
    /// keeps the original timestamp and reason.
    pub fn invalidate(&mut self, reason: impl Into<String>) {
        if self.validity.is_active() {
            let at = Utc::now();
            self.validity = Validity::Invalidated {
                at,
                reason: Some(reason.into()),
            };
            self.valid_until = Some(at);
        }
    }
}

/// Request to add a fact to a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddFactRequest {
    pub content: String,
    pub scope: KnowledgeScope,
    pub source: FactSource,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_confidence() -> f64 {
    0.5
}

/// Request to search for facts visible from a scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub scope: KnowledgeScope,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub min_confidence: f64,
    #[serde(default)]
    pub include_invalidated: bool,
}

fn default_max_results() -> usize {
    20
}

/// Request to invalidate (soft-delete) a fact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidateRequest {
    pub fact_id: String,
    pub reason: String,
}

/// Request to register a graph with the router
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterGraphRequest {
    pub graph_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub database: String,
    #[serde(default)]
    pub parent_chain: Vec<String>,
    #[serde(default)]
    pub inherit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::scope::KnowledgeScope;

    #[test]
    fn test_add_fact_request_defaults() {
        let json = r#"{
            "content": "TypeScript projects should use strict mode",
            "scope": {"level": "platform"},
            "source": {"type": "user_input"}
        }"#;
        let req: AddFactRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.confidence, 0.5);
        assert!(req.tags.is_empty());
    }

    #[test]
    fn test_search_request_defaults() {
        let json = r#"{"query": "strict mode", "scope": {"level": "platform"}}"#;
        let req: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.max_results, 20);
        assert_eq!(req.min_confidence, 0.0);
        assert!(!req.include_invalidated);
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let mut fact = Fact {
            id: "f1".to_string(),
            content: "old".to_string(),
            scope: KnowledgeScope::platform(),
            source: FactSource::new(FactSourceType::UserInput),
            confidence: 0.9,
            valid_from: Utc::now(),
            validity: Validity::Active,
            valid_until: None,
            tags: vec![],
        };

        fact.invalidate("superseded");
        let first = fact.valid_until;
        assert!(first.is_some());

        fact.invalidate("again");
        assert_eq!(fact.valid_until, first);
        match &fact.validity {
            Validity::Invalidated { reason, .. } => {
                assert_eq!(reason.as_deref(), Some("superseded"));
            }
            Validity::Active => panic!("fact should be invalidated"),
        }
    }

    #[test]
    fn test_source_type_wire_names() {
        let json = serde_json::to_string(&FactSourceType::ExplicitRemember).unwrap();
        assert_eq!(json, r#""explicit_remember""#);
        assert_eq!(FactSourceType::MissionExtraction.as_str(), "mission_extraction");
    }
}
