//! Service entrypoint
//!
//! Startup order: environment, logging, configuration, backend connection
//! (falling back to in-memory if initialization fails — the only point where
//! backend errors are swallowed), default graph registration, HTTP server.

use anyhow::Context;
use knowledge_service::api::{build_router, AppState};
use knowledge_service::backend::{GraphMemory, GraphitiClient, GraphitiConfig};
use knowledge_service::knowledge::GraphRouter;
use knowledge_service::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    if config.logging.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let backend = init_backend(&config).await;
    if backend.is_some() {
        info!("Graph memory backend connected");
    } else {
        info!("No backend configured, using in-memory fallback");
    }

    let router = Arc::new(GraphRouter::new(backend.clone()));
    router.register_graph(
        config.knowledge.default_graph.clone(),
        None,
        config.backend.database.clone(),
        vec![],
        false,
    );

    let state = AppState {
        router,
        default_graph: config.knowledge.default_graph.clone(),
        max_results_limit: config.knowledge.max_results_limit,
    };
    let app = build_router(state, config.server.max_body_size);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Knowledge service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(backend) = backend {
        backend.close().await;
    }
    info!("Knowledge service stopped");
    Ok(())
}

/// Connect to the graph-memory engine if one is configured. Initialization
/// failures downgrade to the in-memory fallback with a warning.
async fn init_backend(config: &Config) -> Option<Arc<dyn GraphMemory>> {
    let uri = config.backend.uri.clone()?;

    let client = match GraphitiClient::new(GraphitiConfig {
        uri,
        user: config.backend.user.clone(),
        password: config.backend.password.clone(),
        database: config.backend.database.clone(),
        timeout: Duration::from_millis(config.backend.timeout_ms),
    }) {
        Ok(client) => client,
        Err(e) => {
            warn!("Backend client construction failed, using in-memory fallback: {}", e);
            return None;
        }
    };

    if let Err(e) = client.build_indices_and_constraints().await {
        warn!("Backend init failed, using in-memory fallback: {}", e);
        return None;
    }

    Some(Arc::new(client))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
