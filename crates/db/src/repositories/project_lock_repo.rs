//! Postgres-backed [`LockStore`] over `project_locks` and
//! `lock_revoker_rights`.
//!
//! Every primitive is one statement, so concurrent service instances see a
//! consistent lock table without in-process coordination.

use async_trait::async_trait;
use cda_core::error::CoreError;
use cda_core::lock::{
    LockKey, LockRequest, LockRevokerRights, LockStore, ProjectLock, RevocationStatus,
    RevokerEntry,
};
use cda_core::mask::Mask;
use sqlx::PgPool;

use crate::error::{is_foreign_key_violation, DbError};
use crate::models::project_lock::{ProjectLockRow, RevokerEntryRow};

/// Column list shared across lock queries.
const LOCK_COLUMNS: &str = "lock_id, office_id, project_id, application_id, \
    session_user_name, os_user, session_program, session_machine, acquire_time";

/// Column list shared across revoker-rights queries.
const RIGHTS_COLUMNS: &str = "office_id, application_id, user_id, project_mask, allow";

/// Lock store over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgLockStore {
    pool: PgPool,
}

/// Counts reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct LockCensus {
    /// Locks currently held.
    pub held: i64,
    /// Held locks with a revocation request that has not been denied.
    pub pending_revocations: i64,
}

impl PgLockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Count held locks and outstanding revocation requests.
    pub async fn census(&self) -> Result<LockCensus, sqlx::Error> {
        sqlx::query_as::<_, LockCensus>(
            "SELECT COUNT(*) AS held,
                    COUNT(*) FILTER (
                        WHERE revoke_requested_by IS NOT NULL AND NOT revoke_denied
                    ) AS pending_revocations
             FROM project_locks",
        )
        .fetch_one(&self.pool)
        .await
    }
}

#[async_trait]
impl LockStore for PgLockStore {
    type Error = DbError;

    async fn try_acquire(&self, request: &LockRequest, lock_id: &str) -> Result<bool, DbError> {
        let key = &request.key;
        let result = sqlx::query(
            "INSERT INTO project_locks (lock_id, office_id, project_id, application_id,
                session_user_name, os_user, session_program, session_machine)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT ON CONSTRAINT uq_project_locks_key DO NOTHING",
        )
        .bind(lock_id)
        .bind(&key.office_id)
        .bind(&key.project_id)
        .bind(&key.application_id)
        .bind(&request.session_user)
        .bind(&request.os_user)
        .bind(&request.session_program)
        .bind(&request.session_machine)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            Err(err) if is_foreign_key_violation(&err) => {
                tracing::debug!(
                    office = %key.office_id,
                    project = %key.project_id,
                    "Lock requested on unknown project"
                );
                Err(CoreError::not_found("Project", &key.office_id, &key.project_id).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_lock(&self, key: &LockKey) -> Result<Option<ProjectLock>, DbError> {
        let query = format!(
            "SELECT {LOCK_COLUMNS} FROM project_locks
             WHERE office_id = $1 AND project_id = $2 AND application_id = $3"
        );
        let row = sqlx::query_as::<_, ProjectLockRow>(&query)
            .bind(&key.office_id)
            .bind(&key.project_id)
            .bind(&key.application_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ProjectLock::from))
    }

    async fn list_locks(
        &self,
        office: &Mask,
        project: &Mask,
        application: &Mask,
    ) -> Result<Vec<ProjectLock>, DbError> {
        let query = format!(
            "SELECT {LOCK_COLUMNS} FROM project_locks
             WHERE ($1::text IS NULL OR office_id ~ $1)
               AND ($2::text IS NULL OR project_id ~ $2)
               AND ($3::text IS NULL OR application_id ~ $3)
             ORDER BY office_id, project_id, application_id"
        );
        let rows = sqlx::query_as::<_, ProjectLockRow>(&query)
            .bind(office.to_pg_regex())
            .bind(project.to_pg_regex())
            .bind(application.to_pg_regex())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ProjectLock::from).collect())
    }

    async fn request_revocation(
        &self,
        lock_id: &str,
        requested_by: &str,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE project_locks SET
                revoke_requested_by = $2,
                revoke_requested_at = NOW(),
                revoke_denied = FALSE
             WHERE lock_id = $1",
        )
        .bind(lock_id)
        .bind(requested_by)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn revocation_status(&self, lock_id: &str) -> Result<RevocationStatus, DbError> {
        let denied: Option<(bool,)> =
            sqlx::query_as("SELECT revoke_denied FROM project_locks WHERE lock_id = $1")
                .bind(lock_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(match denied {
            None => RevocationStatus::Gone,
            Some((true,)) => RevocationStatus::Denied,
            Some((false,)) => RevocationStatus::Pending,
        })
    }

    async fn deny_revocation(&self, lock_id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE project_locks SET revoke_denied = TRUE WHERE lock_id = $1")
            .bind(lock_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_lock(&self, lock_id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM project_locks WHERE lock_id = $1")
            .bind(lock_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_revoker_entry(
        &self,
        rights: &LockRevokerRights,
        allow: bool,
    ) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO lock_revoker_rights (office_id, application_id, user_id, project_mask, allow)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_lock_revoker_rights_entry DO NOTHING",
        )
        .bind(&rights.office_id)
        .bind(&rights.application_id)
        .bind(&rights.user_id)
        .bind(&rights.project_mask)
        .bind(allow)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_revoker_entries(
        &self,
        office_id: &str,
        application_id: &str,
        user_id: &str,
    ) -> Result<u64, DbError> {
        let result = sqlx::query(
            "DELETE FROM lock_revoker_rights
             WHERE office_id = $1 AND application_id = $2 AND user_id = $3",
        )
        .bind(office_id)
        .bind(application_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn revoker_entries_for(
        &self,
        office_id: &str,
        application_id: &str,
        user_id: &str,
    ) -> Result<Vec<RevokerEntry>, DbError> {
        let query = format!(
            "SELECT {RIGHTS_COLUMNS} FROM lock_revoker_rights
             WHERE office_id = $1 AND application_id = $2 AND user_id = $3
             ORDER BY project_mask, allow"
        );
        let rows = sqlx::query_as::<_, RevokerEntryRow>(&query)
            .bind(office_id)
            .bind(application_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(RevokerEntry::from).collect())
    }

    async fn revoker_entries(
        &self,
        office: &Mask,
        application: &Mask,
    ) -> Result<Vec<RevokerEntry>, DbError> {
        let query = format!(
            "SELECT {RIGHTS_COLUMNS} FROM lock_revoker_rights
             WHERE ($1::text IS NULL OR office_id ~ $1)
               AND ($2::text IS NULL OR application_id ~ $2)
             ORDER BY office_id, application_id, user_id, project_mask, allow"
        );
        let rows = sqlx::query_as::<_, RevokerEntryRow>(&query)
            .bind(office.to_pg_regex())
            .bind(application.to_pg_regex())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(RevokerEntry::from).collect())
    }
}
