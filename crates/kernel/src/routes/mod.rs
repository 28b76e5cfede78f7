//! HTTP route handlers.

pub mod api;
pub mod auth;
pub mod health;
pub mod helpers;
pub mod metrics;
pub mod pages;
pub mod users;

use axum::Router;
use axum::http::StatusCode;
use axum::response::Response;

use crate::middleware::{enforce_access, track_requests};
use crate::state::AppState;

/// Assemble every route behind the gate and metrics middleware.
///
/// The session layer is added by the caller (Redis in production, memory in
/// tests) and must wrap the returned router.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(pages::router(state.menu()))
        .merge(users::router(state.menu()))
        .merge(api::router())
        .merge(health::router())
        .merge(metrics::router())
        .fallback(not_found)
        // Last added = first executed: track_requests → enforce_access → routes
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            enforce_access,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            track_requests,
        ))
}

async fn not_found(axum::extract::State(state): axum::extract::State<AppState>) -> Response {
    helpers::render_with_status(
        &state,
        StatusCode::NOT_FOUND,
        "not_found.html",
        &tera::Context::new(),
    )
}
