//! Dashboard page routes.
//!
//! One GET route per leaf of the master menu. The access gate has already
//! run by the time a handler is reached, so handlers only render.

use axum::extract::State;
use axum::http::Uri;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};

use crate::gate::AccessContext;
use crate::menu::MasterMenu;
use crate::routes::helpers::{render_template, shell_context};
use crate::state::AppState;

/// Render the dashboard shell for the requested page.
async fn dashboard_page(
    State(state): State<AppState>,
    Extension(access): Extension<AccessContext>,
    uri: Uri,
) -> Response {
    let page_id = uri.path();
    let title = state
        .menu()
        .find_leaf(page_id)
        .map_or(page_id, |leaf| leaf.label.as_str());

    let context = shell_context(&state, &access, page_id, title);
    render_template(&state, "page.html", &context)
}

/// Create the page router for every leaf of `menu`.
pub fn router(menu: &MasterMenu) -> Router<AppState> {
    menu.leaves().fold(Router::new(), |router, leaf| {
        router.route(&leaf.page_id, get(dashboard_page))
    })
}
