//! JSON endpoints for client-side shells.
//!
//! These bypass the page gate and check authentication themselves: an
//! anonymous caller gets a 401 body instead of a redirect.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_sessions::Session;

use crate::gate::IdentityProvider;
use crate::models::Identity;
use crate::session::SessionIdentityProvider;
use crate::state::AppState;

#[derive(Serialize)]
struct ApiError {
    error: &'static str,
}

fn unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiError {
            error: "unauthenticated",
        }),
    )
        .into_response()
}

/// Resolve the caller; resolution failures count as anonymous.
async fn current_identity(session: &Session) -> Option<Identity> {
    match SessionIdentityProvider::new(session).resolve_identity().await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(error = %e, "identity resolution failed on API request");
            None
        }
    }
}

/// GET /api/session
///
/// The caller's identity and capability flags.
async fn session_info(State(state): State<AppState>, session: Session) -> Response {
    match current_identity(&session).await {
        Some(identity) => Json(state.gate().context_for(identity)).into_response(),
        None => unauthenticated(),
    }
}

/// GET /api/menu
///
/// The caller's projected menu.
async fn menu(State(state): State<AppState>, session: Session) -> Response {
    match current_identity(&session).await {
        Some(identity) => Json(state.project_menu(identity.role)).into_response(),
        None => unauthenticated(),
    }
}

/// Create the JSON API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/session", get(session_info))
        .route("/api/menu", get(menu))
}
