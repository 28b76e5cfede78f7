//! Access gate middleware.
//!
//! Runs the gate for every non-public path. Authorized requests continue
//! with an [`AccessContext`] extension; everything else is redirected
//! before a handler runs.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::debug;

use crate::gate::{GateState, RedirectReason};
use crate::permissions::pages;
use crate::session::SessionIdentityProvider;
use crate::state::AppState;

/// Enforce page access for the requested path.
///
/// Public paths (login, logout, health, metrics, `/api/*`, `/static/*`)
/// pass through untouched.
pub async fn enforce_access(
    State(state): State<AppState>,
    session: Session,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if pages::is_public(&path) {
        return next.run(request).await;
    }

    let provider = SessionIdentityProvider::new(&session);
    match state.gate().resolve(&provider, &path).await {
        GateState::Authorized(context) => {
            state.metrics().record_gate("authorized");
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        GateState::Redirecting(redirect) => {
            let outcome = match redirect.reason {
                RedirectReason::Unauthenticated => "unauthenticated",
                RedirectReason::Unauthorized => "unauthorized",
            };
            state.metrics().record_gate(outcome);
            debug!(page = %path, target = %redirect.target, outcome, "gate redirect");
            Redirect::to(&redirect.target).into_response()
        }
        other => {
            // resolve() only returns terminal states; fail closed regardless.
            state.metrics().record_gate(other.label());
            Redirect::to(state.gate().login_page()).into_response()
        }
    }
}
