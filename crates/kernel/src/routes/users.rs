//! User management listing.

use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::gate::AccessContext;
use crate::menu::MasterMenu;
use crate::routes::helpers::{render_template, shell_context};
use crate::state::AppState;

/// One row of the account table.
#[derive(Serialize)]
struct AccountRow {
    username: String,
    role: String,
    created: String,
}

/// GET /users (or the configured user-management page)
///
/// The gate admits only roles whose page set covers this page; the handler
/// also requires the user-management capability.
async fn list_users(
    State(state): State<AppState>,
    Extension(access): Extension<AccessContext>,
) -> AppResult<Response> {
    if !access.can_manage_users {
        return Err(AppError::Forbidden);
    }

    let rows: Vec<AccountRow> = state
        .accounts()
        .list()
        .await?
        .into_iter()
        .map(|account| AccountRow {
            created: account.created.format("%Y-%m-%d").to_string(),
            username: account.username,
            role: account.role,
        })
        .collect();

    let entry = state.menu().user_management();
    let mut context = shell_context(&state, &access, &entry.page_id, &entry.label);
    context.insert("accounts", &rows);

    Ok(render_template(&state, "users.html", &context))
}

/// Create the user management router at the menu's user-management entry.
pub fn router(menu: &MasterMenu) -> Router<AppState> {
    Router::new().route(&menu.user_management().page_id, get(list_users))
}
