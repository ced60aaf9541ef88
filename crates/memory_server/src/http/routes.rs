//! Route table.

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tracing::{info, instrument};

use crate::http::AppState;
use crate::http::handlers;

/// Builds the API router over the given state.
#[instrument(skip(state))]
pub fn router(state: AppState) -> Router {
    info!("Building API router");
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/game/start", post(handlers::start_session))
        .route("/api/game/action", post(handlers::record_action))
        .route("/api/game/end", post(handlers::end_session))
        .route("/api/game/log/{session_id}", get(handlers::session_log))
        .route("/api/analytics", get(handlers::analytics))
        .route("/api/seed-data", get(handlers::seed_data))
        .route("/health", get(handlers::health))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}
