//! Handlers for the `/timeseries/profile-instance` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cda_core::error::CoreError;
use cda_core::pagination::Page;
use cda_core::types::Timestamp;
use cda_core::validation::{validate_identifier, validate_office_id};
use cda_db::models::timeseries_profile_instance::{
    CreateTimeSeriesProfileInstance, InstanceKey, TimeSeriesProfileInstance,
};
use cda_db::repositories::TimeSeriesProfileInstanceRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{self, PageParams, StoreParams};
use crate::state::AppState;

/// Query parameters for the instance catalog.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogParams {
    pub office_mask: Option<String>,
    pub location_mask: Option<String>,
    pub parameter_id_mask: Option<String>,
    pub version_mask: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<i64>,
}

/// `?office=&version-date=` completing an instance key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstanceKeyParams {
    pub office: Option<String>,
    pub version_date: Option<Timestamp>,
}

impl InstanceKeyParams {
    fn require(&self) -> Result<(&str, Timestamp), CoreError> {
        let version_date = self.version_date.map(|d| d.to_rfc3339());
        cda_core::validation::require_params(&[
            ("office", self.office.as_deref()),
            ("version-date", version_date.as_deref()),
        ])?;
        Ok((query::param(&self.office), self.version_date.unwrap_or_default()))
    }
}

/// GET /api/v1/timeseries/profile-instance
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> AppResult<Json<Page<TimeSeriesProfileInstance>>> {
    let office = query::mask(&params.office_mask)?;
    let location = query::mask(&params.location_mask)?;
    let parameter = query::mask(&params.parameter_id_mask)?;
    let version = query::mask(&params.version_mask)?;
    let request = query::profile_page_request(
        &state.config,
        &PageParams {
            page: params.page,
            page_size: params.page_size,
        },
    )?;
    let page = TimeSeriesProfileInstanceRepo::catalog(
        &state.pool,
        &office,
        &location,
        &parameter,
        &version,
        &request,
    )
    .await?;
    Ok(Json(page))
}

/// POST /api/v1/timeseries/profile-instance
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<StoreParams>,
    Json(input): Json<CreateTimeSeriesProfileInstance>,
) -> AppResult<(StatusCode, Json<TimeSeriesProfileInstance>)> {
    validate_office_id(&input.office_id)?;
    validate_identifier("location-id", &input.location_id)?;
    validate_identifier("key-parameter-id", &input.key_parameter_id)?;
    validate_identifier("version-id", &input.version_id)?;
    if input.first_date > input.last_date {
        return Err(AppError::Core(CoreError::Validation(
            "first-date must not be after last-date".into(),
        )));
    }

    let key = InstanceKey {
        office_id: &input.office_id,
        location_id: &input.location_id,
        key_parameter_id: &input.key_parameter_id,
        version_id: &input.version_id,
        version_date: input.version_date,
    };
    let fail_if_exists = params.fail_if_exists();
    if fail_if_exists
        && TimeSeriesProfileInstanceRepo::find(&state.pool, &key)
            .await?
            .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Time series profile instance {}/{}/{}/{} already exists",
            input.office_id, input.location_id, input.key_parameter_id, input.version_id
        ))));
    }

    let instance =
        TimeSeriesProfileInstanceRepo::create(&state.pool, &input, fail_if_exists).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

/// GET /api/v1/timeseries/profile-instance/{location_id}/{parameter_id}/{version}
pub async fn get_by_key(
    State(state): State<AppState>,
    Path((location_id, parameter_id, version)): Path<(String, String, String)>,
    Query(params): Query<InstanceKeyParams>,
) -> AppResult<Json<TimeSeriesProfileInstance>> {
    let (office, version_date) = params.require()?;
    let key = InstanceKey {
        office_id: office,
        location_id: &location_id,
        key_parameter_id: &parameter_id,
        version_id: &version,
        version_date,
    };
    let instance = TimeSeriesProfileInstanceRepo::find(&state.pool, &key)
        .await?
        .ok_or_else(|| instance_not_found(&key))?;
    Ok(Json(instance))
}

/// DELETE /api/v1/timeseries/profile-instance/{location_id}/{parameter_id}/{version}
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((location_id, parameter_id, version)): Path<(String, String, String)>,
    Query(params): Query<InstanceKeyParams>,
) -> AppResult<StatusCode> {
    let (office, version_date) = params.require()?;
    let key = InstanceKey {
        office_id: office,
        location_id: &location_id,
        key_parameter_id: &parameter_id,
        version_id: &version,
        version_date,
    };
    if TimeSeriesProfileInstanceRepo::delete(&state.pool, &key).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(instance_not_found(&key))
    }
}

fn instance_not_found(key: &InstanceKey<'_>) -> AppError {
    AppError::Core(CoreError::not_found(
        "TimeSeriesProfileInstance",
        key.office_id,
        &format!(
            "{}/{}/{}@{}",
            key.location_id,
            key.key_parameter_id,
            key.version_id,
            key.version_date.to_rfc3339()
        ),
    ))
}
