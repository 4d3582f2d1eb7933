//! Lock request / deny / revoke / release state machine.
//!
//! ```text
//! Unlocked --request--> Locked
//! Locked   --request(revoke)--> Requesting --deny-------> Denied   (requester gets nothing)
//!                                          --release----> Locked   (requester)
//!                                          --timeout----> Locked   (requester, holder revoked)
//! Locked   --release--> Unlocked
//! ```
//!
//! Waiting is done by polling the store, never by in-process signalling, so
//! a deny or release issued through any service instance ends the wait.

use std::time::Duration;

use tokio::time::Instant;

use super::rights;
use super::store::LockStore;
use super::{new_lock_id, LockKey, LockRequest, LockRevokerRights, ProjectLock, RevocationStatus};
use crate::error::CoreError;
use crate::mask::Mask;

/// How a revocation wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RevocationOutcome {
    /// The holder released (or someone else revoked) the lock.
    Released,
    /// The holder denied the revocation.
    Denied,
    /// Nobody answered in time; the lock was revoked.
    TimedOut,
}

/// Runs the lock protocol against a [`LockStore`].
pub struct LockManager<S> {
    store: S,
    poll_interval: Duration,
}

impl<S: LockStore> LockManager<S> {
    pub fn new(store: S, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Locks
    // -----------------------------------------------------------------------

    /// Request a lock, returning its id, or `None` if it was not acquired.
    ///
    /// With `revoke_existing` a held lock is asked to give way: the holder
    /// has `revoke_timeout` to deny, after which the lock is revoked and
    /// handed to this request. The requester must hold revoker rights.
    pub async fn request_lock(
        &self,
        request: &LockRequest,
        revoke_existing: bool,
        revoke_timeout: Duration,
    ) -> Result<Option<String>, S::Error> {
        let key = &request.key;
        let lock_id = new_lock_id();

        if self.store.try_acquire(request, &lock_id).await? {
            tracing::info!(
                office = %key.office_id,
                project = %key.project_id,
                application = %key.application_id,
                user = %request.session_user,
                "Project lock acquired"
            );
            return Ok(Some(lock_id));
        }

        if !revoke_existing {
            tracing::debug!(office = %key.office_id, project = %key.project_id, "Project already locked");
            return Ok(None);
        }

        if !self
            .has_lock_revoker_rights(key, &request.session_user)
            .await?
        {
            tracing::info!(
                office = %key.office_id,
                project = %key.project_id,
                user = %request.session_user,
                "Lock revocation refused: user lacks revoker rights"
            );
            return Ok(None);
        }

        if let Some(existing) = self.store.find_lock(key).await? {
            let outcome = self
                .await_revocation(&existing, &request.session_user, revoke_timeout)
                .await?;
            if outcome == RevocationOutcome::Denied {
                return Ok(None);
            }
        }

        if self.store.try_acquire(request, &lock_id).await? {
            tracing::info!(
                office = %key.office_id,
                project = %key.project_id,
                user = %request.session_user,
                "Project lock acquired after revocation"
            );
            Ok(Some(lock_id))
        } else {
            // Another requester got there first.
            Ok(None)
        }
    }

    pub async fn is_locked(&self, key: &LockKey) -> Result<bool, S::Error> {
        Ok(self.store.find_lock(key).await?.is_some())
    }

    pub async fn retrieve_lock(&self, key: &LockKey) -> Result<Option<ProjectLock>, S::Error> {
        self.store.find_lock(key).await
    }

    pub async fn retrieve_locks(
        &self,
        office: &Mask,
        project: &Mask,
        application: &Mask,
    ) -> Result<Vec<ProjectLock>, S::Error> {
        self.store.list_locks(office, project, application).await
    }

    /// Release a lock. Unknown or already released ids are not an error.
    pub async fn release_lock(&self, lock_id: &str) -> Result<(), S::Error> {
        let removed = self.store.remove_lock(lock_id).await?;
        tracing::debug!(lock_id, removed, "Project lock release");
        Ok(())
    }

    /// Refuse a pending revocation request on a lock the caller holds.
    pub async fn deny_lock_revocation(&self, lock_id: &str) -> Result<(), S::Error> {
        if !self.store.deny_revocation(lock_id).await? {
            return Err(CoreError::NotFound {
                entity: "ProjectLock",
                id: lock_id.to_string(),
            }
            .into());
        }
        tracing::info!(lock_id, "Lock revocation denied");
        Ok(())
    }

    /// Revoke someone else's lock, giving the holder `timeout` to deny.
    ///
    /// Requires revoker rights. A zero timeout revokes immediately; a lock
    /// that does not exist is a no-op.
    pub async fn revoke_lock(
        &self,
        key: &LockKey,
        user_id: &str,
        timeout: Duration,
    ) -> Result<(), S::Error> {
        if !self.has_lock_revoker_rights(key, user_id).await? {
            return Err(CoreError::Forbidden(format!(
                "User {user_id} may not revoke locks on {}/{} for {}",
                key.office_id, key.project_id, key.application_id
            ))
            .into());
        }

        let Some(existing) = self.store.find_lock(key).await? else {
            return Ok(());
        };

        match self.await_revocation(&existing, user_id, timeout).await? {
            RevocationOutcome::Denied => Err(CoreError::Conflict(format!(
                "Lock holder denied revocation of {}/{}",
                key.office_id, key.project_id
            ))
            .into()),
            RevocationOutcome::Released | RevocationOutcome::TimedOut => Ok(()),
        }
    }

    async fn await_revocation(
        &self,
        lock: &ProjectLock,
        requested_by: &str,
        timeout: Duration,
    ) -> Result<RevocationOutcome, S::Error> {
        if !self
            .store
            .request_revocation(&lock.lock_id, requested_by)
            .await?
        {
            return Ok(RevocationOutcome::Released);
        }

        tracing::debug!(
            office = %lock.key.office_id,
            project = %lock.key.project_id,
            holder = %lock.session_user,
            requested_by,
            timeout_ms = timeout.as_millis() as u64,
            "Waiting on lock revocation"
        );

        let deadline = Instant::now() + timeout;
        loop {
            match self.store.revocation_status(&lock.lock_id).await? {
                RevocationStatus::Denied => return Ok(RevocationOutcome::Denied),
                RevocationStatus::Gone => return Ok(RevocationOutcome::Released),
                RevocationStatus::Pending => {}
            }

            let now = Instant::now();
            if now >= deadline {
                self.store.remove_lock(&lock.lock_id).await?;
                tracing::warn!(
                    office = %lock.key.office_id,
                    project = %lock.key.project_id,
                    application = %lock.key.application_id,
                    holder = %lock.session_user,
                    requested_by,
                    "Project lock revoked after timeout"
                );
                return Ok(RevocationOutcome::TimedOut);
            }

            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    // -----------------------------------------------------------------------
    // Revoker rights
    // -----------------------------------------------------------------------

    /// Add a grant to the allow or deny list.
    ///
    /// Denying the `*` mask removes every entry of the user for the
    /// application, on both lists.
    pub async fn update_lock_revoker_rights(
        &self,
        rights: &LockRevokerRights,
        allow: bool,
    ) -> Result<(), S::Error> {
        if !allow && rights.project_mask.trim() == "*" {
            self.remove_all_lock_revoker_rights(
                &rights.office_id,
                &rights.application_id,
                &rights.user_id,
            )
            .await?;
            return Ok(());
        }

        Mask::parse(Some(rights.project_mask.as_str()))?;
        self.store.add_revoker_entry(rights, allow).await?;
        tracing::info!(
            office = %rights.office_id,
            project_mask = %rights.project_mask,
            application = %rights.application_id,
            user = %rights.user_id,
            allow,
            "Lock revoker rights updated"
        );
        Ok(())
    }

    pub async fn allow_lock_revoker_rights(
        &self,
        rights: &LockRevokerRights,
    ) -> Result<(), S::Error> {
        self.update_lock_revoker_rights(rights, true).await
    }

    pub async fn deny_lock_revoker_rights(
        &self,
        rights: &LockRevokerRights,
    ) -> Result<(), S::Error> {
        self.update_lock_revoker_rights(rights, false).await
    }

    /// Remove every allow and deny entry of a user for an application.
    pub async fn remove_all_lock_revoker_rights(
        &self,
        office_id: &str,
        application_id: &str,
        user_id: &str,
    ) -> Result<u64, S::Error> {
        let removed = self
            .store
            .clear_revoker_entries(office_id, application_id, user_id)
            .await?;
        tracing::info!(
            office = %office_id,
            application = %application_id,
            user = %user_id,
            removed,
            "Lock revoker rights removed"
        );
        Ok(removed)
    }

    pub async fn has_lock_revoker_rights(
        &self,
        key: &LockKey,
        user_id: &str,
    ) -> Result<bool, S::Error> {
        let entries = self
            .store
            .revoker_entries_for(&key.office_id, &key.application_id, user_id)
            .await?;
        Ok(rights::has_rights(&entries, &key.project_id))
    }

    /// Effective grants matching the masks. See [`rights::effective_rights`]
    /// for how `project_mask` selects grants.
    pub async fn cat_lock_revoker_rights(
        &self,
        office: &Mask,
        project_mask: Option<&str>,
        application: &Mask,
    ) -> Result<Vec<LockRevokerRights>, S::Error> {
        let entries = self.store.revoker_entries(office, application).await?;
        Ok(rights::effective_rights(entries, project_mask)?)
    }
}
