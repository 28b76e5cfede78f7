#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end tests over the HTTP shell: login, gate redirects, page
//! rendering, JSON endpoints and operational endpoints.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};

use common::{TestApp, body_json, body_string, extract_cookies, location};
use dashgate_kernel::menu::MasterMenu;
use dashgate_kernel::models::Role;
use dashgate_kernel::permissions::{PageSet, RoleProfile, RoleRegistry};
use dashgate_test_utils::TEST_PASSWORD;

/// A profile that may not manage users.
fn profile(permitted_pages: PageSet) -> RoleProfile {
    RoleProfile {
        permitted_pages,
        can_manage_users: false,
        is_read_only: false,
        can_export_data: true,
    }
}

#[tokio::test]
async fn anonymous_visit_redirects_to_login() {
    let app = TestApp::new();

    for path in ["/", "/transaction/deposit", "/users"] {
        let response = app.get(path, "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), "/login", "{path}");
    }
}

#[tokio::test]
async fn login_page_is_public() {
    let app = TestApp::new();

    let response = app.get("/login", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains(r#"action="/login""#));
}

#[tokio::test]
async fn login_lands_on_overview() {
    let app = TestApp::new();

    let response = app.post_login("operator", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(!extract_cookies(&response).is_empty());
}

#[tokio::test]
async fn bad_password_rerenders_form() {
    let app = TestApp::new();

    let response = app.post_login("operator", "nope").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let body = body_string(response).await;
    assert!(body.contains("Invalid username or password"));
    assert!(body.contains(r#"value="operator""#));
}

#[tokio::test]
async fn unknown_role_cannot_log_in() {
    let app = TestApp::new();

    let response = app.post_login("ghost", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_string(response).await.contains("no dashboard access"));
}

#[tokio::test]
async fn login_lands_on_first_reachable_page_without_overview() {
    let registry = RoleRegistry::new()
        .with_profile(Role::Operator, profile(PageSet::only(["/bgo"])));
    let app = TestApp::with_parts(registry, MasterMenu::builtin());

    let response = app.post_login("operator", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/bgo");

    let cookies = extract_cookies(&response);
    let response = app.get("/bgo", &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_refuses_role_with_empty_page_set() {
    let registry = RoleRegistry::new().with_profile(Role::Operator, profile(PageSet::none()));
    let app = TestApp::with_parts(registry, MasterMenu::builtin());

    let response = app.post_login("operator", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn operator_sees_transaction_page_with_controls() {
    let app = TestApp::new();
    let cookies = app.login("operator").await;

    let response = app.get("/transaction/deposit", &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains(r#"<a class="active" href="/transaction/deposit">"#));
    assert!(body.contains("Transactions"));
    assert!(body.contains(r#"data-control="edit""#));
    assert!(body.contains(r#"data-control="export""#));
    assert!(!body.contains("Strategic Executive"));
    assert!(!body.contains("User Management"));
}

#[tokio::test]
async fn operator_is_bounced_from_executive_page() {
    let app = TestApp::new();
    let cookies = app.login("operator").await;

    let response = app.get("/strategic-executive", &cookies).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn user_role_has_no_export_control() {
    let app = TestApp::new();
    let cookies = app.login("user").await;

    let body = body_string(app.get("/transaction/deposit", &cookies).await).await;
    assert!(body.contains(r#"data-control="edit""#));
    assert!(!body.contains(r#"data-control="export""#));
}

#[tokio::test]
async fn manager_is_read_only() {
    let app = TestApp::new();
    let cookies = app.login("manager").await;

    let response = app.get("/strategic-executive", &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(!body.contains(r#"data-control="edit""#));
    assert!(body.contains(r#"data-control="export""#));
    assert!(!body.contains("Transactions"));
}

#[tokio::test]
async fn manager_cannot_reach_user_management() {
    let app = TestApp::new();
    let cookies = app.login("manager").await;

    let response = app.get("/users", &cookies).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn wildcard_without_capability_is_forbidden_on_users() {
    let registry = RoleRegistry::new().with_profile(Role::Executive, profile(PageSet::All));
    let app = TestApp::with_parts(registry, MasterMenu::builtin());
    let cookies = app.login("executive").await;

    let response = app.get("/users", &cookies).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The entry is not offered in the menu either.
    let json = body_json(app.get("/api/menu", &cookies).await).await;
    assert!(json.as_array().unwrap().iter().all(|node| node["page_id"] != "/users"));
}

#[tokio::test]
async fn admin_lists_accounts() {
    let app = TestApp::new();
    let cookies = app.login("admin").await;

    let response = app.get("/users", &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("User Management"));
    assert!(body.contains("executive"));
    assert!(body.contains("ghost"));
    assert!(body.contains(r#"<a class="active" href="/users">"#));
}

#[tokio::test]
async fn admin_gets_not_found_for_unknown_page() {
    let app = TestApp::new();
    let cookies = app.login("admin").await;

    let response = app.get("/no-such-page", &cookies).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = TestApp::new();
    let cookies = app.login("operator").await;

    let response = app
        .request_with_cookies(
            Request::post("/logout").body(Body::empty()).unwrap(),
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = app.get("/", &cookies).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn api_session_requires_login() {
    let app = TestApp::new();

    let response = app.get("/api/session", "").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "unauthenticated");
}

#[tokio::test]
async fn api_session_reports_capabilities() {
    let app = TestApp::new();
    let cookies = app.login("manager").await;

    let response = app.get("/api/session", &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["user"]["username"], "manager");
    assert_eq!(json["user"]["role"], "manager");
    assert_eq!(json["loading"], false);
    assert_eq!(json["has_access"], true);
    assert_eq!(json["can_manage_users"], false);
    assert_eq!(json["is_read_only"], true);
    assert_eq!(json["can_export_data"], true);
}

#[tokio::test]
async fn api_menu_is_projected_per_role() {
    let app = TestApp::new();

    let admin = app.login("admin").await;
    let json = body_json(app.get("/api/menu", &admin).await).await;
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 9);
    assert_eq!(entries.last().unwrap()["page_id"], "/users");

    let executive = app.login("executive").await;
    let json = body_json(app.get("/api/menu", &executive).await).await;
    let pages: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["page_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(pages, ["/", "/strategic-executive", "/business-flow"]);
}

#[tokio::test]
async fn health_reports_memory_backend() {
    let app = TestApp::new();

    let response = app.get("/health", "").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["backend"], "memory");
}

#[tokio::test]
async fn metrics_count_gate_decisions() {
    let app = TestApp::new();
    app.get("/", "").await;
    let cookies = app.login("operator").await;
    app.get("/", &cookies).await;

    let response = app.get("/metrics", "").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains(r#"gate_decisions_total{outcome="unauthenticated"} 1"#));
    assert!(body.contains(r#"gate_decisions_total{outcome="authorized"} 1"#));
    assert!(body.contains(r#"login_attempts_total{result="success"} 1"#));
}
