//! Handlers for the `/timeseries/profile-parser` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cda_core::error::CoreError;
use cda_core::pagination::Page;
use cda_db::models::timeseries_profile_parser::{
    CreateTimeSeriesProfileParser, TimeSeriesProfileParserWithParameters,
};
use cda_db::repositories::TimeSeriesProfileParserRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{self, PageParams, StoreParams};
use crate::state::AppState;

/// Query parameters for the parser catalog.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogParams {
    pub office_mask: Option<String>,
    pub location_mask: Option<String>,
    pub parameter_id_mask: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<i64>,
}

/// `?office=&location-id=` naming the profile a parser belongs to.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParserKeyParams {
    pub office: Option<String>,
    pub location_id: Option<String>,
}

impl ParserKeyParams {
    fn require(&self) -> Result<(&str, &str), CoreError> {
        cda_core::validation::require_params(&[
            ("office", self.office.as_deref()),
            ("location-id", self.location_id.as_deref()),
        ])?;
        Ok((query::param(&self.office), query::param(&self.location_id)))
    }
}

/// GET /api/v1/timeseries/profile-parser
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> AppResult<Json<Page<TimeSeriesProfileParserWithParameters>>> {
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
        TimeSeriesProfileParserRepo::catalog(&state.pool, &office, &location, &parameter, &request)
            .await?;
    Ok(Json(page))
}

/// POST /api/v1/timeseries/profile-parser
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<StoreParams>,
    Json(input): Json<CreateTimeSeriesProfileParser>,
) -> AppResult<(StatusCode, Json<TimeSeriesProfileParserWithParameters>)> {
    input.validate()?;

    let fail_if_exists = params.fail_if_exists();
    if fail_if_exists
        && TimeSeriesProfileParserRepo::find(
            &state.pool,
            &input.office_id,
            &input.location_id,
            &input.key_parameter_id,
        )
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Time series profile parser {}/{}/{} already exists",
            input.office_id, input.location_id, input.key_parameter_id
        ))));
    }

    let parser = TimeSeriesProfileParserRepo::create(&state.pool, &input, fail_if_exists).await?;
    tracing::info!(
        office = %input.office_id,
        location = %input.location_id,
        parameter = %input.key_parameter_id,
        indexed = input.is_indexed(),
        "Profile parser stored"
    );
    Ok((StatusCode::CREATED, Json(parser)))
}

/// GET /api/v1/timeseries/profile-parser/{parameter_id}
pub async fn get_by_key(
    State(state): State<AppState>,
    Path(parameter_id): Path<String>,
    Query(params): Query<ParserKeyParams>,
) -> AppResult<Json<TimeSeriesProfileParserWithParameters>> {
    let (office, location_id) = params.require()?;
    let parser = TimeSeriesProfileParserRepo::find(&state.pool, office, location_id, &parameter_id)
        .await?
        .ok_or_else(|| parser_not_found(office, location_id, &parameter_id))?;
    Ok(Json(parser))
}

/// DELETE /api/v1/timeseries/profile-parser/{parameter_id}
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(parameter_id): Path<String>,
    Query(params): Query<ParserKeyParams>,
) -> AppResult<StatusCode> {
    let (office, location_id) = params.require()?;
    if TimeSeriesProfileParserRepo::delete(&state.pool, office, location_id, &parameter_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(parser_not_found(office, location_id, &parameter_id))
    }
}

fn parser_not_found(office: &str, location_id: &str, parameter_id: &str) -> AppError {
    AppError::Core(CoreError::not_found(
        "TimeSeriesProfileParser",
        office,
        &format!("{location_id}/{parameter_id}"),
    ))
}
