//! Handlers for the `/project-locks` resource.
//!
//! Lock contention is not an error in the lock protocol; this layer turns a
//! lock that was not acquired into 409 Conflict.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cda_core::error::CoreError;
use cda_core::lock::{LockKey, LockRequest, ProjectLock};
use cda_core::validation::{require_params, validate_identifier, validate_office_id};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{self, param};
use crate::state::AppState;

/// Query parameters for the lock catalog.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogParams {
    pub office_mask: Option<String>,
    pub project_mask: Option<String>,
    pub application_mask: Option<String>,
}

/// Query parameters for placing a lock.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RequestParams {
    pub revoke_existing: Option<bool>,
    pub revoke_timeout: Option<u64>,
}

/// Body of a lock request. The session user is the authenticated caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LockRequestBody {
    pub office_id: String,
    pub project_id: String,
    pub application_id: String,
    pub os_user: Option<String>,
    pub session_program: Option<String>,
    pub session_machine: Option<String>,
}

/// Returned to the requester of a lock. The only place a lock id is exposed.
#[derive(Debug, Serialize)]
pub struct LockIdResponse {
    pub id: String,
}

/// Query parameters identifying a lock slot.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeyParams {
    pub office: Option<String>,
    pub project_id: Option<String>,
    pub application_id: Option<String>,
    pub revoke_timeout: Option<u64>,
}

impl KeyParams {
    fn require_key(&self) -> Result<LockKey, CoreError> {
        require_params(&[
            ("office", self.office.as_deref()),
            ("project-id", self.project_id.as_deref()),
            ("application-id", self.application_id.as_deref()),
        ])?;
        Ok(LockKey {
            office_id: param(&self.office).to_string(),
            project_id: param(&self.project_id).to_string(),
            application_id: param(&self.application_id).to_string(),
        })
    }
}

/// Query parameters for retrieving the lock on a named project.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectLockParams {
    pub office: Option<String>,
    pub application_id: Option<String>,
}

/// Query parameters naming a lock by id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LockIdParams {
    pub lock_id: Option<String>,
}

impl LockIdParams {
    fn require(&self) -> Result<&str, CoreError> {
        require_params(&[("lock-id", self.lock_id.as_deref())])?;
        Ok(param(&self.lock_id))
    }
}

/// GET /api/v1/project-locks
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> AppResult<Json<Vec<ProjectLock>>> {
    require_params(&[("office-mask", params.office_mask.as_deref())])?;
    let locks = state
        .locks
        .retrieve_locks(
            &query::mask(&params.office_mask)?,
            &query::mask(&params.project_mask)?,
            &query::mask(&params.application_mask)?,
        )
        .await?;
    Ok(Json(locks))
}

/// POST /api/v1/project-locks
pub async fn request(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<RequestParams>,
    Json(body): Json<LockRequestBody>,
) -> AppResult<(StatusCode, Json<LockIdResponse>)> {
    validate_office_id(&body.office_id)?;
    validate_identifier("project-id", &body.project_id)?;
    validate_identifier("application-id", &body.application_id)?;
    let timeout = query::revoke_timeout(&state.config, params.revoke_timeout)?;

    let request = LockRequest {
        key: LockKey {
            office_id: body.office_id,
            project_id: body.project_id,
            application_id: body.application_id,
        },
        session_user: user.user_id,
        os_user: body.os_user,
        session_program: body.session_program,
        session_machine: body.session_machine,
    };

    let acquired = state
        .locks
        .request_lock(&request, params.revoke_existing.unwrap_or(false), timeout)
        .await?;

    match acquired {
        Some(id) => Ok((StatusCode::CREATED, Json(LockIdResponse { id }))),
        None => Err(AppError::Core(CoreError::Conflict(format!(
            "Lock on {}/{} for {} was not acquired",
            request.key.office_id, request.key.project_id, request.key.application_id
        )))),
    }
}

/// GET /api/v1/project-locks/status
pub async fn status(
    State(state): State<AppState>,
    Query(params): Query<KeyParams>,
) -> AppResult<Json<ProjectLock>> {
    let key = params.require_key()?;
    let lock = state
        .locks
        .retrieve_lock(&key)
        .await?
        .ok_or_else(|| lock_not_found(&key))?;
    Ok(Json(lock))
}

/// GET /api/v1/project-locks/{name}
pub async fn get_by_project(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ProjectLockParams>,
) -> AppResult<Json<ProjectLock>> {
    require_params(&[
        ("office", params.office.as_deref()),
        ("application-id", params.application_id.as_deref()),
    ])?;
    let key = LockKey {
        office_id: param(&params.office).to_string(),
        project_id: name,
        application_id: param(&params.application_id).to_string(),
    };
    let lock = state
        .locks
        .retrieve_lock(&key)
        .await?
        .ok_or_else(|| lock_not_found(&key))?;
    Ok(Json(lock))
}

/// POST /api/v1/project-locks/release
pub async fn release(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<LockIdParams>,
) -> AppResult<StatusCode> {
    let lock_id = params.require()?;
    state.locks.release_lock(lock_id).await?;
    tracing::debug!(user = %user.user_id, "Project lock release requested");
    Ok(StatusCode::OK)
}

/// POST /api/v1/project-locks/deny
pub async fn deny(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<LockIdParams>,
) -> AppResult<StatusCode> {
    let lock_id = params.require()?;
    state.locks.deny_lock_revocation(lock_id).await?;
    Ok(StatusCode::OK)
}

/// POST /api/v1/project-locks/revoke
pub async fn revoke(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<KeyParams>,
) -> AppResult<StatusCode> {
    let key = params.require_key()?;
    let timeout = query::revoke_timeout(&state.config, params.revoke_timeout)?;
    state.locks.revoke_lock(&key, &user.user_id, timeout).await?;
    Ok(StatusCode::OK)
}

fn lock_not_found(key: &LockKey) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ProjectLock",
        id: format!("{}/{}/{}", key.office_id, key.project_id, key.application_id),
    })
}
