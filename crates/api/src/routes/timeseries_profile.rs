//! Route definitions for the `/timeseries/profile` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::timeseries_profile;
use crate::state::AppState;

/// Routes mounted at `/timeseries/profile`.
///
/// ```text
/// GET    /                               -> list
/// POST   /                               -> create
/// GET    /{location_id}/{parameter_id}   -> get_by_key
/// DELETE /{location_id}/{parameter_id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(timeseries_profile::list).post(timeseries_profile::create),
        )
        .route(
            "/{location_id}/{parameter_id}",
            get(timeseries_profile::get_by_key).delete(timeseries_profile::delete),
        )
}
