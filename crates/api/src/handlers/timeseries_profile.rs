//! Handlers for the `/timeseries/profile` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cda_core::error::CoreError;
use cda_core::pagination::Page;
use cda_core::validation::{validate_identifier, validate_office_id, validate_parameter_list};
use cda_db::models::timeseries_profile::{CreateTimeSeriesProfile, TimeSeriesProfile};
use cda_db::repositories::TimeSeriesProfileRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{self, OfficeParams, PageParams, StoreParams};
use crate::state::AppState;

/// Query parameters for the profile catalog.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogParams {
    pub office_mask: Option<String>,
    pub location_mask: Option<String>,
    pub parameter_id_mask: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<i64>,
}

/// GET /api/v1/timeseries/profile
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> AppResult<Json<Page<TimeSeriesProfile>>> {
    let office = query::mask(&params.office_mask)?;
    let location = query::mask(&params.location_mask)?;
    let parameter = query::mask(&params.parameter_id_mask)?;
    let request = query::profile_page_request(
        &state.config,
        &PageParams {
            page: params.page,
            page_size: params.page_size,
        },
    )?;
    let page =
        TimeSeriesProfileRepo::catalog(&state.pool, &office, &location, &parameter, &request)
            .await?;
    Ok(Json(page))
}

/// POST /api/v1/timeseries/profile
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<StoreParams>,
    Json(input): Json<CreateTimeSeriesProfile>,
) -> AppResult<(StatusCode, Json<TimeSeriesProfile>)> {
    validate_office_id(&input.office_id)?;
    validate_identifier("location-id", &input.location_id)?;
    validate_parameter_list(&input.key_parameter_id, &input.parameter_list)?;

    let fail_if_exists = params.fail_if_exists();
    if fail_if_exists
        && TimeSeriesProfileRepo::find(
            &state.pool,
            &input.office_id,
            &input.location_id,
            &input.key_parameter_id,
        )
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Time series profile {}/{}/{} already exists",
            input.office_id, input.location_id, input.key_parameter_id
        ))));
    }

    let profile = TimeSeriesProfileRepo::create(&state.pool, &input, fail_if_exists).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/v1/timeseries/profile/{location_id}/{parameter_id}
pub async fn get_by_key(
    State(state): State<AppState>,
    Path((location_id, parameter_id)): Path<(String, String)>,
    Query(params): Query<OfficeParams>,
) -> AppResult<Json<TimeSeriesProfile>> {
    let office = params.require()?;
    let profile = TimeSeriesProfileRepo::find(&state.pool, office, &location_id, &parameter_id)
        .await?
        .ok_or_else(|| profile_not_found(office, &location_id, &parameter_id))?;
    Ok(Json(profile))
}

/// DELETE /api/v1/timeseries/profile/{location_id}/{parameter_id}
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((location_id, parameter_id)): Path<(String, String)>,
    Query(params): Query<OfficeParams>,
) -> AppResult<StatusCode> {
    let office = params.require()?;
    if TimeSeriesProfileRepo::delete(&state.pool, office, &location_id, &parameter_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(profile_not_found(office, &location_id, &parameter_id))
    }
}

fn profile_not_found(office: &str, location_id: &str, parameter_id: &str) -> AppError {
    AppError::Core(CoreError::not_found(
        "TimeSeriesProfile",
        office,
        &format!("{location_id}/{parameter_id}"),
    ))
}
