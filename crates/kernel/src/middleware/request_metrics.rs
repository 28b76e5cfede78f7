//! Request counting middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::state::AppState;

/// Count every request by method and response status.
pub async fn track_requests(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let response = next.run(request).await;
    state
        .metrics()
        .record_request(&method, response.status().as_u16());
    response
}
