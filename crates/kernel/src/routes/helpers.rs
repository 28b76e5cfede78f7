//! Shared helpers for HTML route handlers.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::gate::AccessContext;
use crate::state::AppState;

/// Base template context for a page inside the dashboard shell.
///
/// The menu is projected for the caller's role on every render, so a role
/// change takes effect on the next page load.
pub fn shell_context(
    state: &AppState,
    access: &AccessContext,
    current_page: &str,
    title: &str,
) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("menu", &state.project_menu(access.user.role));
    context.insert("current_page", current_page);
    context.insert("title", title);
    context.insert("username", &access.user.username);
    context.insert("can_export_data", &access.can_export_data);
    context.insert("is_read_only", &access.is_read_only);
    context.insert("can_manage_users", &access.can_manage_users);
    context
}

/// Render a template, falling back to a bare error page on failure.
pub fn render_template(state: &AppState, template: &str, context: &tera::Context) -> Response {
    render_with_status(state, StatusCode::OK, template, context)
}

/// Render a template with an explicit status code.
pub fn render_with_status(
    state: &AppState,
    status: StatusCode,
    template: &str,
    context: &tera::Context,
) -> Response {
    match state.theme().render(template, context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, template = %template, "failed to render template");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!(
                    r#"<!DOCTYPE html>
<html><head><title>Error</title></head>
<body><h1>Template Error</h1><pre>{}</pre></body></html>"#,
                    html_escape(&format!("{e:#}"))
                )),
            )
                .into_response()
        }
    }
}

/// HTML-escape a string for safe output.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
