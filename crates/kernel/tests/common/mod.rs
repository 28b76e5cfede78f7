#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`TestApp`] wires the real routes, middleware and templates to an
//! in-memory session store and a fixture account table, so these tests
//! need neither PostgreSQL nor Redis.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;

use dashgate_kernel::accounts::StaticAccountStore;
use dashgate_kernel::menu::MasterMenu;
use dashgate_kernel::permissions::RoleRegistry;
use dashgate_kernel::theme::ThemeEngine;
use dashgate_kernel::{AppState, Config, routes, session};
use dashgate_test_utils::{TEST_PASSWORD, standard_accounts};

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Built-in registry and menu, one account per role plus `ghost`.
    pub fn new() -> Self {
        Self::with_parts(RoleRegistry::new(), MasterMenu::builtin())
    }

    pub fn with_parts(registry: RoleRegistry, menu: MasterMenu) -> Self {
        let config = Config::from_lookup(|key| match key {
            "COOKIE_SECURE" => Some("false".to_string()),
            _ => None,
        })
        .expect("Failed to load config");

        let state = AppState::from_parts(
            registry,
            menu,
            ThemeEngine::builtin().expect("Failed to compile templates"),
            Arc::new(StaticAccountStore::new(standard_accounts())),
        );

        // Must match main.rs apart from the session store.
        let router = routes::router(&state)
            .layer(session::create_memory_session_layer(&config))
            .with_state(state.clone());

        Self { router, state }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a request with cookies from a previous response.
    pub async fn request_with_cookies(
        &self,
        mut request: Request<Body>,
        cookies: &str,
    ) -> Response {
        if !cookies.is_empty() {
            request.headers_mut().insert(
                header::COOKIE,
                cookies.parse().expect("Invalid cookie header"),
            );
        }
        self.request(request).await
    }

    /// GET `path` with the given cookies.
    pub async fn get(&self, path: &str, cookies: &str) -> Response {
        self.request_with_cookies(Request::get(path).body(Body::empty()).unwrap(), cookies)
            .await
    }

    /// POST the login form.
    pub async fn post_login(&self, username: &str, password: &str) -> Response {
        let body = format!(
            "username={}&password={}",
            form_encode(username),
            form_encode(password)
        );
        self.request(
            Request::post("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Log in as a fixture account and return session cookies.
    ///
    /// # Panics
    ///
    /// Panics if the login response is not a redirect.
    pub async fn login(&self, username: &str) -> String {
        let response = self.post_login(username, TEST_PASSWORD).await;

        assert_eq!(
            response.status(),
            axum::http::StatusCode::SEE_OTHER,
            "Login failed for user '{username}' (status {})",
            response.status()
        );

        extract_cookies(&response)
    }
}

/// Extract Set-Cookie headers from a response for use in subsequent requests.
pub fn extract_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|cookie| {
            // Extract just the cookie name=value, ignoring attributes
            cookie.split(';').next()
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// The `Location` header of a redirect.
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Read a response body as a string.
pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).expect("Body is not JSON")
}

fn form_encode(value: &str) -> String {
    value.replace('%', "%25").replace('&', "%26").replace('+', "%2B").replace(' ', "+")
}
