//! Route table for the knowledge service

use super::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build the service router
pub fn build_router(state: AppState, max_body_size: usize) -> Router {
    Router::new()
        .route("/recall", post(handlers::recall))
        .route("/remember", post(handlers::remember))
        .route("/correct", post(handlers::correct))
        .route("/graphs/register", post(handlers::register_graph))
        .route("/graphs/unregister", post(handlers::unregister_graph))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::GraphRouter;
    use std::sync::Arc;

    #[test]
    fn test_router_builds() {
        let router = Arc::new(GraphRouter::new(None));
        router.register_graph("platform-kg", None, "platform-kg", vec![], true);
        let state = AppState {
            router,
            default_graph: "platform-kg".to_string(),
            max_results_limit: 100,
        };
        let _ = build_router(state, 1024 * 1024);
    }
}
