//! Route definitions for the `/project-locks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::project_lock;
use crate::state::AppState;

/// Routes mounted at `/project-locks`.
///
/// ```text
/// GET    /              -> list
/// POST   /              -> request
/// GET    /status        -> status
/// GET    /{name}        -> get_by_project
/// POST   /release       -> release
/// POST   /deny          -> deny
/// POST   /revoke        -> revoke
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project_lock::list).post(project_lock::request))
        .route("/status", get(project_lock::status))
        .route("/release", post(project_lock::release))
        .route("/deny", post(project_lock::deny))
        .route("/revoke", post(project_lock::revoke))
        .route("/{name}", get(project_lock::get_by_project))
}
