//! Project-lock protocol.
//!
//! A project lock is advisory: at most one holder per
//! `(office, project, application)`. A requester may ask for an existing
//! lock to be revoked, in which case the holder has a window to deny the
//! request before the lock is forcibly taken over.
//!
//! - [`store::LockStore`] -- atomic persistence primitives.
//! - [`manager::LockManager`] -- the request/deny/revoke/release state machine.
//! - [`rights`] -- revoker-rights evaluation (allow and deny masks).
//! - [`memory::MemoryLockStore`] -- in-process store.

pub mod manager;
pub mod memory;
pub mod rights;
pub mod store;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

pub use manager::LockManager;
pub use memory::MemoryLockStore;
pub use store::LockStore;

/// Default revoke window when the caller does not specify one.
pub const DEFAULT_REVOKE_TIMEOUT_SECS: u64 = 10;

/// Default interval between revocation status checks.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Identifies the single lock slot for an application on a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LockKey {
    pub office_id: String,
    pub project_id: String,
    pub application_id: String,
}

/// Everything needed to place a lock.
#[derive(Debug, Clone)]
pub struct LockRequest {
    pub key: LockKey,
    /// Authenticated user placing the lock.
    pub session_user: String,
    pub os_user: Option<String>,
    pub session_program: Option<String>,
    pub session_machine: Option<String>,
}

/// A held lock.
///
/// `lock_id` is only handed to the requester; it never leaves the service
/// through catalog listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectLock {
    #[serde(flatten)]
    pub key: LockKey,
    #[serde(skip_serializing)]
    pub lock_id: String,
    pub acquire_time: Timestamp,
    pub session_user: String,
    pub os_user: Option<String>,
    pub session_program: Option<String>,
    pub session_machine: Option<String>,
}

/// State of a revocation request on a held lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationStatus {
    /// Requested, not yet answered.
    Pending,
    /// The holder refused to give up the lock.
    Denied,
    /// The lock no longer exists (released or revoked).
    Gone,
}

/// One revoker-rights grant as listed in the rights catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LockRevokerRights {
    pub office_id: String,
    pub project_mask: String,
    pub application_id: String,
    pub user_id: String,
}

/// A stored rights entry: a grant on the allow list or the deny list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokerEntry {
    pub rights: LockRevokerRights,
    pub allow: bool,
}

/// Generate a fresh lock id: 32 lowercase hex characters.
pub fn new_lock_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
