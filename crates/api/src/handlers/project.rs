//! Handlers for the `/projects` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cda_core::error::CoreError;
use cda_core::pagination::Page;
use cda_core::validation::{validate_identifier, validate_office_id};
use cda_db::models::project::{CreateProject, DeleteMethod, Project, UpdateProject};
use cda_db::repositories::ProjectRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{self, OfficeParams, PageParams, StoreParams};
use crate::state::AppState;

/// Query parameters for the project catalog.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogParams {
    pub office: Option<String>,
    pub id_mask: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<i64>,
}

/// Query parameters for deleting a project.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub office: Option<String>,
    pub method: Option<DeleteMethod>,
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> AppResult<Json<Page<Project>>> {
    let office = query::mask(&params.office)?;
    let name = query::mask(&params.id_mask)?;
    let request = query::page_request(
        &state.config,
        &PageParams {
            page: params.page,
            page_size: params.page_size,
        },
    )?;
    let page = ProjectRepo::catalog(&state.pool, &office, &name, &request).await?;
    Ok(Json(page))
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<StoreParams>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    validate_office_id(&input.office_id)?;
    validate_identifier("name", &input.name)?;

    let fail_if_exists = params.fail_if_exists();
    if fail_if_exists
        && ProjectRepo::find(&state.pool, &input.office_id, &input.name)
            .await?
            .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Project {}/{} already exists",
            input.office_id, input.name
        ))));
    }

    let project = ProjectRepo::create(&state.pool, &input, fail_if_exists).await?;
    tracing::info!(
        office = %project.office_id,
        project = %project.name,
        user = %user.user_id,
        "Project stored"
    );
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects/{name}
pub async fn get_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<OfficeParams>,
) -> AppResult<Json<Project>> {
    let office = params.require()?;
    let project = ProjectRepo::find(&state.pool, office, &name)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Project", office, &name)))?;
    Ok(Json(project))
}

/// PUT /api/v1/projects/{name}
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(name): Path<String>,
    Query(params): Query<OfficeParams>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    let office = params.require()?;
    let project = ProjectRepo::update(&state.pool, office, &name, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Project", office, &name)))?;
    Ok(Json(project))
}

/// DELETE /api/v1/projects/{name}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(name): Path<String>,
    Query(params): Query<DeleteParams>,
) -> AppResult<StatusCode> {
    cda_core::validation::require_params(&[("office", params.office.as_deref())])?;
    let office = query::param(&params.office);
    let method = params.method.unwrap_or_default();

    if ProjectRepo::delete(&state.pool, office, &name, method).await? {
        tracing::info!(office, project = %name, user = %user.user_id, ?method, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::not_found("Project", office, &name)))
    }
}
