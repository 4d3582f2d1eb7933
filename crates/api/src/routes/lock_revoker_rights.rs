//! Route definitions for the `/lock-revoker-rights` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::lock_revoker_rights;
use crate::state::AppState;

/// Routes mounted at `/lock-revoker-rights`.
///
/// ```text
/// GET    /              -> list
/// DELETE /              -> remove_all (admin)
/// GET    /check         -> check
/// POST   /allow         -> allow (admin)
/// POST   /deny          -> deny (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(lock_revoker_rights::list).delete(lock_revoker_rights::remove_all),
        )
        .route("/check", get(lock_revoker_rights::check))
        .route("/allow", post(lock_revoker_rights::allow))
        .route("/deny", post(lock_revoker_rights::deny))
}
