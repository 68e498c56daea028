// handlers/mod.rs - two-tier handler layout
//
// Public (no token) -> Protected (verified identity; user context resolved per handler)
pub mod protected;
pub mod public;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::identity_middleware;
use crate::state::AppState;

/// Full application router. Static `/api/*` routes take precedence over `/api/:entity`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/webhooks/identity", post(public::identity_webhook))
        .merge(protected_routes(state.clone()))
        .fallback(public::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::entity;

    Router::new()
        .route("/api/me", get(protected::me))
        .route("/api/onboarding", post(protected::onboarding))
        .route(
            "/api/organizations/:id",
            get(protected::organization_get).patch(protected::organization_patch),
        )
        .route("/api/:entity", get(entity::collection_get).post(entity::collection_post))
        .route(
            "/api/:entity/:id",
            get(entity::record_get)
                .patch(entity::record_patch)
                .delete(entity::record_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, identity_middleware))
}
