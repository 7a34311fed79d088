//! Store behavior against a configured graph-memory backend

use async_trait::async_trait;
use knowledge_service::backend::{GraphMemory, RawSearchResult};
use knowledge_service::knowledge::{
    AddFactRequest, FactSource, FactSourceType, KnowledgeScope, KnowledgeStore, SearchRequest,
};
use knowledge_service::{KnowledgeError, Result};
use std::sync::Arc;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct EpisodeRecord {
    name: String,
    source_description: String,
    group_id: String,
}

/// Scriptable backend double
#[derive(Default)]
struct FakeBackend {
    episodes: Mutex<Vec<EpisodeRecord>>,
    searches: Mutex<Vec<Vec<String>>>,
    fail_add: bool,
    fail_search: bool,
    results: Vec<RawSearchResult>,
}

#[async_trait]
impl GraphMemory for FakeBackend {
    async fn add_episode(
        &self,
        name: &str,
        _content: &str,
        source_description: &str,
        group_id: &str,
    ) -> Result<()> {
        if self.fail_add {
            return Err(KnowledgeError::BackendUnavailable("add down".to_string()));
        }
        self.episodes.lock().unwrap().push(EpisodeRecord {
            name: name.to_string(),
            source_description: source_description.to_string(),
            group_id: group_id.to_string(),
        });
        Ok(())
    }

    async fn search(
        &self,
        _query: &str,
        group_ids: &[String],
        _num_results: usize,
    ) -> Result<Vec<RawSearchResult>> {
        if self.fail_search {
            return Err(KnowledgeError::BackendUnavailable("search down".to_string()));
        }
        self.searches.lock().unwrap().push(group_ids.to_vec());
        Ok(self.results.clone())
    }

    async fn build_indices_and_constraints(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) {}
}

fn add_req(content: &str, scope: KnowledgeScope) -> AddFactRequest {
    AddFactRequest {
        content: content.to_string(),
        scope,
        source: FactSource::new(FactSourceType::ExplicitRemember),
        confidence: 0.7,
        tags: vec![],
    }
}

fn search_req(query: &str, scope: KnowledgeScope) -> SearchRequest {
    SearchRequest {
        query: query.to_string(),
        scope,
        max_results: 20,
        min_confidence: 0.0,
        include_invalidated: false,
    }
}

#[tokio::test]
async fn add_fact_forwards_episode_with_scope_group() {
    let backend = Arc::new(FakeBackend::default());
    let store = KnowledgeStore::new(Some(backend.clone()));

    let mut scope = KnowledgeScope::cell("trading", "c1");
    scope.formation_id = Some("alpha".to_string());
    let fact_id = store.add_fact(add_req("settlement rule", scope)).await.unwrap();

    let episodes = backend.episodes.lock().unwrap();
    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].name, format!("fact-{}", fact_id));
    assert_eq!(episodes[0].source_description, "kais:explicit_remember");
    assert_eq!(episodes[0].group_id, "cell:trading:alpha:c1");
}

#[tokio::test]
async fn add_fact_survives_backend_failure() {
    let backend = Arc::new(FakeBackend {
        fail_add: true,
        ..Default::default()
    });
    let store = KnowledgeStore::new(Some(backend));

    let fact_id = store
        .add_fact(add_req("kept despite outage", KnowledgeScope::platform()))
        .await
        .unwrap();
    assert!(!fact_id.is_empty());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn search_delegates_visible_groups_to_backend() {
    let backend = Arc::new(FakeBackend {
        results: vec![RawSearchResult {
            uuid: "u1".to_string(),
            fact: "platform wisdom".to_string(),
            score: 0.85,
            group_id: Some("platform".to_string()),
        }],
        ..Default::default()
    });
    let store = KnowledgeStore::new(Some(backend.clone()));

    let results = store
        .search(&search_req("wisdom", KnowledgeScope::realm("trading")))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content, "platform wisdom");
    assert_eq!(results[0].confidence, 0.85);
    assert_eq!(results[0].scope, KnowledgeScope::platform());

    let searches = backend.searches.lock().unwrap();
    assert_eq!(
        searches[0],
        vec!["platform".to_string(), "realm:trading".to_string()]
    );
}

#[tokio::test]
async fn configured_backend_search_failure_propagates() {
    let backend = Arc::new(FakeBackend {
        fail_search: true,
        ..Default::default()
    });
    let store = KnowledgeStore::new(Some(backend));
    // the in-memory copy exists, but a configured backend never falls back
    store
        .add_fact(add_req("invisible during outage", KnowledgeScope::platform()))
        .await
        .unwrap();

    let result = store
        .search(&search_req("outage", KnowledgeScope::platform()))
        .await;
    assert!(matches!(
        result,
        Err(KnowledgeError::BackendUnavailable(_))
    ));
}
