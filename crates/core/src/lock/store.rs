//! Persistence seam for project locks.

use async_trait::async_trait;

use super::{LockKey, LockRequest, LockRevokerRights, ProjectLock, RevocationStatus, RevokerEntry};
use crate::error::CoreError;
use crate::mask::Mask;

/// Atomic primitives the lock protocol is built from.
///
/// Every method must be a single atomic operation against shared state, so
/// several service processes can run the protocol against one store and
/// observe each other's denies and releases.
#[async_trait]
pub trait LockStore: Send + Sync {
    type Error: From<CoreError> + std::error::Error + Send + Sync + 'static;

    /// Insert a lock under `lock_id` if the slot is free. `false` if held.
    async fn try_acquire(&self, request: &LockRequest, lock_id: &str) -> Result<bool, Self::Error>;

    async fn find_lock(&self, key: &LockKey) -> Result<Option<ProjectLock>, Self::Error>;

    /// Locks whose office, project and application match the masks, in key order.
    async fn list_locks(
        &self,
        office: &Mask,
        project: &Mask,
        application: &Mask,
    ) -> Result<Vec<ProjectLock>, Self::Error>;

    /// Post a revocation request on a lock, clearing any earlier denial.
    /// `false` if the lock no longer exists.
    async fn request_revocation(&self, lock_id: &str, requested_by: &str)
        -> Result<bool, Self::Error>;

    async fn revocation_status(&self, lock_id: &str) -> Result<RevocationStatus, Self::Error>;

    /// Mark the revocation request on a lock as denied. `false` if unknown.
    async fn deny_revocation(&self, lock_id: &str) -> Result<bool, Self::Error>;

    /// Delete a lock. `false` if it was already gone.
    async fn remove_lock(&self, lock_id: &str) -> Result<bool, Self::Error>;

    /// Add a grant to the allow (`allow = true`) or deny list. Idempotent.
    async fn add_revoker_entry(
        &self,
        rights: &LockRevokerRights,
        allow: bool,
    ) -> Result<(), Self::Error>;

    /// Remove every allow and deny entry of a user for an application.
    async fn clear_revoker_entries(
        &self,
        office_id: &str,
        application_id: &str,
        user_id: &str,
    ) -> Result<u64, Self::Error>;

    /// Entries of one user for one application.
    async fn revoker_entries_for(
        &self,
        office_id: &str,
        application_id: &str,
        user_id: &str,
    ) -> Result<Vec<RevokerEntry>, Self::Error>;

    /// Entries whose office and application match the masks.
    async fn revoker_entries(
        &self,
        office: &Mask,
        application: &Mask,
    ) -> Result<Vec<RevokerEntry>, Self::Error>;
}
