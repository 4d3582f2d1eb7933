//! Handlers for the `/lock-revoker-rights` resource.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use cda_core::error::CoreError;
use cda_core::lock::{LockKey, LockRevokerRights};
use cda_core::validation::{require_params, validate_office_id};
use cda_db::repositories::ProjectRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::{self, param};
use crate::state::AppState;

/// Query parameters for the rights catalog.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogParams {
    pub office_mask: Option<String>,
    pub project_mask: Option<String>,
    pub application_mask: Option<String>,
}

/// Query parameters for checking a user's rights on one project.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckParams {
    pub office: Option<String>,
    pub project_id: Option<String>,
    pub application_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckResponse {
    pub has_rights: bool,
}

/// Query parameters for granting or denying rights.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GrantParams {
    pub office: Option<String>,
    pub project_mask: Option<String>,
    pub application_id: Option<String>,
    pub user_id: Option<String>,
}

impl GrantParams {
    fn require_rights(&self) -> Result<LockRevokerRights, CoreError> {
        require_params(&[
            ("office", self.office.as_deref()),
            ("project-mask", self.project_mask.as_deref()),
            ("application-id", self.application_id.as_deref()),
            ("user-id", self.user_id.as_deref()),
        ])?;
        validate_office_id(param(&self.office))?;
        Ok(LockRevokerRights {
            office_id: param(&self.office).to_string(),
            project_mask: param(&self.project_mask).trim().to_string(),
            application_id: param(&self.application_id).to_string(),
            user_id: param(&self.user_id).to_string(),
        })
    }
}

/// Query parameters for removing all of a user's rights.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoveParams {
    pub office: Option<String>,
    pub application_id: Option<String>,
    pub user_id: Option<String>,
}

/// GET /api/v1/lock-revoker-rights
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> AppResult<Json<Vec<LockRevokerRights>>> {
    require_params(&[("office-mask", params.office_mask.as_deref())])?;
    let rights = state
        .locks
        .cat_lock_revoker_rights(
            &query::mask(&params.office_mask)?,
            params.project_mask.as_deref(),
            &query::mask(&params.application_mask)?,
        )
        .await?;
    Ok(Json(rights))
}

/// GET /api/v1/lock-revoker-rights/check
pub async fn check(
    State(state): State<AppState>,
    Query(params): Query<CheckParams>,
) -> AppResult<Json<CheckResponse>> {
    require_params(&[
        ("office", params.office.as_deref()),
        ("project-id", params.project_id.as_deref()),
        ("application-id", params.application_id.as_deref()),
        ("user-id", params.user_id.as_deref()),
    ])?;
    let key = LockKey {
        office_id: param(&params.office).to_string(),
        project_id: param(&params.project_id).to_string(),
        application_id: param(&params.application_id).to_string(),
    };

    if ProjectRepo::find(&state.pool, &key.office_id, &key.project_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::not_found(
            "Project",
            &key.office_id,
            &key.project_id,
        )));
    }

    let has_rights = state
        .locks
        .has_lock_revoker_rights(&key, param(&params.user_id))
        .await?;
    Ok(Json(CheckResponse { has_rights }))
}

/// POST /api/v1/lock-revoker-rights/allow
pub async fn allow(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(params): Query<GrantParams>,
) -> AppResult<StatusCode> {
    let rights = params.require_rights()?;
    state.locks.allow_lock_revoker_rights(&rights).await?;
    tracing::info!(admin = %admin.user_id, user = %rights.user_id, "Revoker rights granted");
    Ok(StatusCode::OK)
}

/// POST /api/v1/lock-revoker-rights/deny
pub async fn deny(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(params): Query<GrantParams>,
) -> AppResult<StatusCode> {
    let rights = params.require_rights()?;
    state.locks.deny_lock_revoker_rights(&rights).await?;
    tracing::info!(admin = %admin.user_id, user = %rights.user_id, "Revoker rights denied");
    Ok(StatusCode::OK)
}

/// DELETE /api/v1/lock-revoker-rights
pub async fn remove_all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<RemoveParams>,
) -> AppResult<StatusCode> {
    require_params(&[
        ("office", params.office.as_deref()),
        ("application-id", params.application_id.as_deref()),
        ("user-id", params.user_id.as_deref()),
    ])?;
    state
        .locks
        .remove_all_lock_revoker_rights(
            param(&params.office),
            param(&params.application_id),
            param(&params.user_id),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
