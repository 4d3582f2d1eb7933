//! Route definitions for the `/projects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /              -> list
/// POST   /              -> create
/// GET    /{name}        -> get_by_name
/// PUT    /{name}        -> update
/// DELETE /{name}        -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{name}",
            get(project::get_by_name)
                .put(project::update)
                .delete(project::delete),
        )
}
