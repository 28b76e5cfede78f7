//! Authentication routes (login, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, warn};

use crate::permissions::pages;
use crate::routes::helpers::{render_template, render_with_status};
use crate::session::{clear_identity, store_identity};
use crate::state::AppState;

/// Form-based login request.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Typed login failure, mapped to a status code and a message for the form.
#[derive(Debug)]
enum LoginError {
    /// Wrong username or password (401).
    InvalidCredentials,
    /// Credentials fine, but the role reaches no page (403).
    NoAccess,
    /// Store or session failure (500).
    Internal,
}

impl LoginError {
    fn status_code(&self) -> StatusCode {
        match self {
            LoginError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            LoginError::NoAccess => StatusCode::FORBIDDEN,
            LoginError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            LoginError::InvalidCredentials => "Invalid username or password",
            LoginError::NoAccess => "This account has no dashboard access",
            LoginError::Internal => "Internal server error",
        }
    }

    fn metric(&self) -> &'static str {
        match self {
            LoginError::InvalidCredentials => "invalid",
            LoginError::NoAccess => "no_access",
            LoginError::Internal => "error",
        }
    }
}

/// GET /login
async fn login_form(State(state): State<AppState>) -> Response {
    render_template(&state, "login.html", &tera::Context::new())
}

/// POST /login
///
/// On success the session id is cycled, the identity markers are stored,
/// and the caller lands on the overview, or on the first menu page its role
/// can reach when the overview is out of bounds.
async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match do_login(&state, &session, &form).await {
        Ok(target) => {
            state.metrics().record_login("success");
            Redirect::to(&target).into_response()
        }
        Err(e) => {
            state.metrics().record_login(e.metric());
            let mut context = tera::Context::new();
            context.insert("error", e.message());
            context.insert("username", &form.username);
            render_with_status(&state, e.status_code(), "login.html", &context)
        }
    }
}

async fn do_login(
    state: &AppState,
    session: &Session,
    form: &LoginForm,
) -> Result<String, LoginError> {
    let account = match state.accounts().find_by_username(&form.username).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            info!(username = %form.username, "login failed: unknown account");
            return Err(LoginError::InvalidCredentials);
        }
        Err(e) => {
            tracing::error!(error = %e, "account lookup failed during login");
            return Err(LoginError::Internal);
        }
    };

    if !account.verify_password(&form.password) {
        info!(username = %form.username, "login failed: bad password");
        return Err(LoginError::InvalidCredentials);
    }

    let identity = account.identity();
    if identity.role.is_none() {
        warn!(username = %identity.username, role = %account.role, "account has unknown role tag");
    }

    let Some(target) = state.landing_page(identity.role) else {
        info!(username = %identity.username, "login refused: role reaches no page");
        return Err(LoginError::NoAccess);
    };

    store_identity(session, identity.id, &identity.username, &account.role)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to store identity in session");
            LoginError::Internal
        })?;

    info!(username = %account.username, role = %account.role, "user logged in");
    Ok(target)
}

/// GET|POST /logout
async fn logout(session: Session) -> Response {
    if let Err(e) = clear_identity(&session).await {
        warn!(error = %e, "failed to clear session on logout");
    }
    Redirect::to(pages::LOGIN).into_response()
}

/// Create the authentication router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(pages::LOGIN, get(login_form).post(login_submit))
        .route(pages::LOGOUT, get(logout).post(logout))
}
