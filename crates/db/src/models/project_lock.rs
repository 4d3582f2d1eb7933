//! Project lock and revoker-rights rows.

use cda_core::lock::{LockKey, LockRevokerRights, ProjectLock, RevokerEntry};
use cda_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `project_locks` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectLockRow {
    pub lock_id: String,
    pub office_id: String,
    pub project_id: String,
    pub application_id: String,
    pub session_user_name: String,
    pub os_user: Option<String>,
    pub session_program: Option<String>,
    pub session_machine: Option<String>,
    pub acquire_time: Timestamp,
}

impl From<ProjectLockRow> for ProjectLock {
    fn from(row: ProjectLockRow) -> Self {
        ProjectLock {
            key: LockKey {
                office_id: row.office_id,
                project_id: row.project_id,
                application_id: row.application_id,
            },
            lock_id: row.lock_id,
            acquire_time: row.acquire_time,
            session_user: row.session_user_name,
            os_user: row.os_user,
            session_program: row.session_program,
            session_machine: row.session_machine,
        }
    }
}

/// A row from the `lock_revoker_rights` table.
#[derive(Debug, Clone, FromRow)]
pub struct RevokerEntryRow {
    pub office_id: String,
    pub application_id: String,
    pub user_id: String,
    pub project_mask: String,
    pub allow: bool,
}

impl From<RevokerEntryRow> for RevokerEntry {
    fn from(row: RevokerEntryRow) -> Self {
        RevokerEntry {
            rights: LockRevokerRights {
                office_id: row.office_id,
                project_mask: row.project_mask,
                application_id: row.application_id,
                user_id: row.user_id,
            },
            allow: row.allow,
        }
    }
}
