//! Route definitions for the `/timeseries/profile-instance` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::timeseries_profile_instance;
use crate::state::AppState;

/// Routes mounted at `/timeseries/profile-instance`.
///
/// ```text
/// GET    /                                          -> list
/// POST   /                                          -> create
/// GET    /{location_id}/{parameter_id}/{version}    -> get_by_key
/// DELETE /{location_id}/{parameter_id}/{version}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(timeseries_profile_instance::list).post(timeseries_profile_instance::create),
        )
        .route(
            "/{location_id}/{parameter_id}/{version}",
            get(timeseries_profile_instance::get_by_key)
                .delete(timeseries_profile_instance::delete),
        )
}
