use anyhow::Context;
use axum::{http::HeaderValue, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{self, AppConfig};
use crate::database::{MemoryStore, PgStore, Store};
use crate::handlers;
use crate::state::AppState;

pub async fn handle(port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    let config = config::config();
    tracing::info!("Starting Traceability Hub in {:?} mode", config.environment);

    let store: Arc<dyn Store> = if memory {
        if crate::is_production!() {
            anyhow::bail!("the in-memory store is not available in production");
        }
        tracing::warn!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let store = PgStore::connect(&config.database).await.context("failed to connect to database")?;
        store.migrate().await.context("failed to create tables")?;
        Arc::new(store)
    };

    let app = app(AppState::new(store, config), config);

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(config.server.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Traceability Hub listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Router plus the CORS policy from configuration
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = handlers::router(state);
    if !config.security.enable_cors {
        return router;
    }
    if config.security.cors_origins.is_empty() {
        return router.layer(CorsLayer::permissive());
    }

    let origins = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    router.layer(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
