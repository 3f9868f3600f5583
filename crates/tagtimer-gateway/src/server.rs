// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the timer API.

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use tagtimer_config::model::ServerConfig;
use tagtimer_core::{StorageAdapter, TagTimerError};
use tagtimer_engine::Engine;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthState, session_middleware};
use crate::handlers;

/// Session cookie attributes used when the server writes the cookie.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
    /// Storage backend, for health checks.
    pub storage: Arc<dyn StorageAdapter + Send + Sync>,
    pub cookie: CookieSettings,
}

/// CORS policy for the configured origins.
///
/// No origins means no cross-origin access. Origins that are not valid
/// header values are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Build the full router:
/// - `GET /health` (public)
/// - `/api/v1/...` timer, tag, stats, and user routes (session required)
/// - `POST /logout` (session required)
pub fn build_router(state: AppState, auth: AuthState, cors_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/api/v1/timer/{tag}", get(handlers::current_timer))
        .route("/api/v1/timer/{tag}/start", post(handlers::start_timer))
        .route("/api/v1/timer/{tag}/stop", post(handlers::stop_timer))
        .route("/api/v1/timer/{tag}/reset", post(handlers::reset_timer))
        .route("/api/v1/tags", get(handlers::list_tags))
        .route("/api/v1/stats", get(handlers::lifetime_stats))
        .route("/api/v1/stats/summary", get(handlers::stats_summary))
        .route(
            "/api/v1/stats/tag/{tag}",
            axum::routing::delete(handlers::delete_tag),
        )
        .route(
            "/api/v1/stats/tag/{tag}/sessions",
            get(handlers::tag_sessions),
        )
        .route("/api/v1/me", get(handlers::me))
        .route("/logout", post(handlers::logout))
        .route_layer(axum_middleware::from_fn_with_state(
            auth,
            session_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Serve `app` on the configured address until `shutdown` is cancelled.
///
/// In-flight requests are allowed to finish after cancellation.
pub async fn start_server(
    config: &ServerConfig,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), TagTimerError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TagTimerError::Internal(format!("failed to bind {addr}: {e}")))?;

    tracing::info!("tagtimer listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| TagTimerError::Internal(format!("server error: {e}")))?;

    tracing::info!("server stopped");
    Ok(())
}
