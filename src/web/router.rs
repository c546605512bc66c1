//! Router configuration for Web API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{create_user, login, logout, me, refresh_token, AppState};
use super::middleware::create_cors_layer;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    // Session routes (no authentication required)
    let session_routes = Router::new()
        .route("/token", post(login))
        .route("/refresh_token", post(refresh_token))
        .route("/logout", post(logout));

    // Identity routes (authentication checked by extractors)
    let user_routes = Router::new()
        .route("/users/", post(create_user))
        .route("/users/me", get(me));

    Router::new()
        .merge(session_routes)
        .merge(user_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
        .merge(create_health_router())
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
