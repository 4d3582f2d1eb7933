//! Route definitions for the `/timeseries/profile-parser` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::timeseries_profile_parser;
use crate::state::AppState;

/// Routes mounted at `/timeseries/profile-parser`. The parser's location is
/// given as `?location-id=` next to `?office=`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /{parameter_id}    -> get_by_key
/// DELETE /{parameter_id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(timeseries_profile_parser::list).post(timeseries_profile_parser::create),
        )
        .route(
            "/{parameter_id}",
            get(timeseries_profile_parser::get_by_key).delete(timeseries_profile_parser::delete),
        )
}
