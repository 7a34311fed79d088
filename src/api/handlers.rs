//! Knowledge API handlers

use crate::error::KnowledgeError;
use crate::knowledge::{
    AddFactRequest, Fact, GraphRouter, InvalidateRequest, RegisterGraphRequest, SearchRequest,
};
use crate::metrics::METRICS;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Application state for knowledge handlers
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<GraphRouter>,
    pub default_graph: String,
    pub max_results_limit: usize,
}

impl AppState {
    /// Resolve a request's target graph: a registered explicit id, otherwise
    /// the default graph.
    fn resolve_graph(&self, graph_id: Option<&str>) -> String {
        match graph_id {
            Some(id) if self.router.is_registered(id) => id.to_string(),
            _ => self.default_graph.clone(),
        }
    }
}

/// API error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

type HandlerError = (StatusCode, Json<ApiError>);

fn into_response(e: KnowledgeError) -> HandlerError {
    let (status, code) = match &e {
        KnowledgeError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        KnowledgeError::UnknownGraph(_) => (StatusCode::NOT_FOUND, "UNKNOWN_GRAPH"),
        KnowledgeError::BackendUnavailable(_) => (StatusCode::BAD_GATEWAY, "BACKEND_UNAVAILABLE"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (status, Json(ApiError::new(code, e.to_string())))
}

#[derive(Debug, Deserialize)]
pub struct RecallRequest {
    #[serde(flatten)]
    pub search: SearchRequest,
    #[serde(default)]
    pub graph_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RememberRequest {
    #[serde(flatten)]
    pub fact: AddFactRequest,
    #[serde(default)]
    pub graph_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RememberResponse {
    #[serde(rename = "factId")]
    pub fact_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CorrectRequest {
    #[serde(flatten)]
    pub invalidate: InvalidateRequest,
    #[serde(default)]
    pub graph_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UnregisterGraphRequest {
    pub graph_id: String,
}

/// Search facts visible from a scope
///
/// POST /recall
pub async fn recall(
    State(state): State<AppState>,
    Json(mut request): Json<RecallRequest>,
) -> Result<Json<Vec<Fact>>, HandlerError> {
    let timer = METRICS
        .request_duration
        .with_label_values(&["recall"])
        .start_timer();

    if let Err(e) = request.search.scope.validate() {
        METRICS.recall_requests.with_label_values(&["invalid"]).inc();
        return Err(into_response(e));
    }
    request.search.max_results = request.search.max_results.min(state.max_results_limit);

    let graph_id = state.resolve_graph(request.graph_id.as_deref());
    let chain_len = state.router.get_search_chain(&graph_id).len();
    METRICS
        .fan_out_chain_length
        .with_label_values(&[graph_id.as_str()])
        .observe(chain_len as f64);

    match state.router.search(&graph_id, &request.search).await {
        Ok(facts) => {
            METRICS.recall_requests.with_label_values(&["ok"]).inc();
            timer.observe_duration();
            Ok(Json(facts))
        }
        Err(e) => {
            error!("Recall failed on {}: {}", graph_id, e);
            METRICS.recall_requests.with_label_values(&["error"]).inc();
            Err(into_response(e))
        }
    }
}

/// Add a fact
///
/// POST /remember
pub async fn remember(
    State(state): State<AppState>,
    Json(request): Json<RememberRequest>,
) -> Result<Json<RememberResponse>, HandlerError> {
    let timer = METRICS
        .request_duration
        .with_label_values(&["remember"])
        .start_timer();

    if request.fact.content.is_empty() {
        METRICS
            .remember_requests
            .with_label_values(&["invalid"])
            .inc();
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("VALIDATION_ERROR", "Content cannot be empty")),
        ));
    }
    if !(0.0..=1.0).contains(&request.fact.confidence) {
        METRICS
            .remember_requests
            .with_label_values(&["invalid"])
            .inc();
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                "VALIDATION_ERROR",
                "Confidence must be between 0.0 and 1.0",
            )),
        ));
    }

    let graph_id = state.resolve_graph(request.graph_id.as_deref());
    match state.router.add_fact(&graph_id, request.fact).await {
        Ok(fact_id) => {
            info!("Fact remembered: graph={}, id={}", graph_id, fact_id);
            METRICS.remember_requests.with_label_values(&["ok"]).inc();
            timer.observe_duration();
            Ok(Json(RememberResponse { fact_id }))
        }
        Err(e) => {
            error!("Remember failed on {}: {}", graph_id, e);
            METRICS
                .remember_requests
                .with_label_values(&["error"])
                .inc();
            Err(into_response(e))
        }
    }
}

/// Invalidate a fact
///
/// POST /correct
pub async fn correct(
    State(state): State<AppState>,
    Json(request): Json<CorrectRequest>,
) -> Result<Json<StatusResponse>, HandlerError> {
    let graph_id = state.resolve_graph(request.graph_id.as_deref());
    match state
        .router
        .invalidate(
            &graph_id,
            &request.invalidate.fact_id,
            &request.invalidate.reason,
        )
        .await
    {
        Ok(()) => {
            METRICS.correct_requests.with_label_values(&["ok"]).inc();
            Ok(Json(StatusResponse::ok()))
        }
        Err(e) => {
            error!("Correct failed on {}: {}", graph_id, e);
            METRICS.correct_requests.with_label_values(&["error"]).inc();
            Err(into_response(e))
        }
    }
}

/// Register a graph (replaces an existing entry and drops its facts)
///
/// POST /graphs/register
pub async fn register_graph(
    State(state): State<AppState>,
    Json(request): Json<RegisterGraphRequest>,
) -> Result<Json<StatusResponse>, HandlerError> {
    if request.graph_id.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("VALIDATION_ERROR", "graph_id cannot be empty")),
        ));
    }

    state.router.register_graph(
        request.graph_id,
        request.endpoint,
        request.database,
        request.parent_chain,
        request.inherit,
    );
    METRICS
        .graph_registrations
        .with_label_values(&["register"])
        .inc();
    Ok(Json(StatusResponse::ok()))
}

/// Unregister a graph
///
/// POST /graphs/unregister
pub async fn unregister_graph(
    State(state): State<AppState>,
    Json(request): Json<UnregisterGraphRequest>,
) -> Result<Json<StatusResponse>, HandlerError> {
    state.router.unregister_graph(&request.graph_id);
    METRICS
        .graph_registrations
        .with_label_values(&["unregister"])
        .inc();
    Ok(Json(StatusResponse::ok()))
}

/// Liveness probe
///
/// GET /health
pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}

/// Prometheus exposition
///
/// GET /metrics
pub async fn metrics() -> String {
    METRICS.gather()
}
