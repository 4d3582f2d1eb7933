pub mod health;
pub mod lock_revoker_rights;
pub mod project;
pub mod project_lock;
pub mod timeseries_profile;
pub mod timeseries_profile_instance;
pub mod timeseries_profile_parser;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                        catalog, store (GET, POST)
/// /projects/{name}                                 get, update, delete
///
/// /project-locks                                   catalog, request (GET, POST)
/// /project-locks/status                            lock on a key (GET)
/// /project-locks/{name}                            lock on a project (GET)
/// /project-locks/release                           release (POST)
/// /project-locks/deny                              deny revocation (POST)
/// /project-locks/revoke                            revoke (POST)
///
/// /lock-revoker-rights                             catalog, remove all (GET, DELETE)
/// /lock-revoker-rights/check                       check a user's rights (GET)
/// /lock-revoker-rights/allow                       grant (POST, admin only)
/// /lock-revoker-rights/deny                        deny (POST, admin only)
///
/// /timeseries/profile                              catalog, store (GET, POST)
/// /timeseries/profile/{location_id}/{parameter_id} get, delete
///
/// /timeseries/profile-parser                       catalog, store (GET, POST)
/// /timeseries/profile-parser/{parameter_id}        get, delete
///
/// /timeseries/profile-instance                     catalog, store (GET, POST)
/// /timeseries/profile-instance/{location_id}/{parameter_id}/{version}
///                                                  get, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/project-locks", project_lock::router())
        .nest("/lock-revoker-rights", lock_revoker_rights::router())
        .nest("/timeseries/profile", timeseries_profile::router())
        .nest("/timeseries/profile-parser", timeseries_profile_parser::router())
        .nest("/timeseries/profile-instance", timeseries_profile_instance::router())
}
