//! In-process [`LockStore`] backed by a mutex-guarded table.
//!
//! Only shares state within one process. Useful for tests and single-node
//! tooling.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::store::LockStore;
use super::{LockKey, LockRequest, LockRevokerRights, ProjectLock, RevocationStatus, RevokerEntry};
use crate::error::CoreError;
use crate::mask::Mask;

#[derive(Debug)]
struct HeldLock {
    lock: ProjectLock,
    revoke_requested_by: Option<String>,
    revoke_denied: bool,
}

#[derive(Debug, Default)]
struct Tables {
    locks: BTreeMap<LockKey, HeldLock>,
    revoker_entries: Vec<RevokerEntry>,
}

impl Tables {
    fn held_mut(&mut self, lock_id: &str) -> Option<&mut HeldLock> {
        self.locks.values_mut().find(|h| h.lock.lock_id == lock_id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryLockStore {
    tables: Mutex<Tables>,
}

impl MemoryLockStore {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, CoreError> {
        self.tables
            .lock()
            .map_err(|_| CoreError::Internal("lock store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl LockStore for MemoryLockStore {
    type Error = CoreError;

    async fn try_acquire(&self, request: &LockRequest, lock_id: &str) -> Result<bool, CoreError> {
        let mut tables = self.tables()?;
        if tables.locks.contains_key(&request.key) {
            return Ok(false);
        }
        let lock = ProjectLock {
            key: request.key.clone(),
            lock_id: lock_id.to_string(),
            acquire_time: chrono::Utc::now(),
            session_user: request.session_user.clone(),
            os_user: request.os_user.clone(),
            session_program: request.session_program.clone(),
            session_machine: request.session_machine.clone(),
        };
        tables.locks.insert(
            request.key.clone(),
            HeldLock {
                lock,
                revoke_requested_by: None,
                revoke_denied: false,
            },
        );
        Ok(true)
    }

    async fn find_lock(&self, key: &LockKey) -> Result<Option<ProjectLock>, CoreError> {
        Ok(self.tables()?.locks.get(key).map(|h| h.lock.clone()))
    }

    async fn list_locks(
        &self,
        office: &Mask,
        project: &Mask,
        application: &Mask,
    ) -> Result<Vec<ProjectLock>, CoreError> {
        Ok(self
            .tables()?
            .locks
            .values()
            .filter(|h| {
                office.matches(&h.lock.key.office_id)
                    && project.matches(&h.lock.key.project_id)
                    && application.matches(&h.lock.key.application_id)
            })
            .map(|h| h.lock.clone())
            .collect())
    }

    async fn request_revocation(
        &self,
        lock_id: &str,
        requested_by: &str,
    ) -> Result<bool, CoreError> {
        let mut tables = self.tables()?;
        Ok(match tables.held_mut(lock_id) {
            Some(held) => {
                held.revoke_requested_by = Some(requested_by.to_string());
                held.revoke_denied = false;
                true
            }
            None => false,
        })
    }

    async fn revocation_status(&self, lock_id: &str) -> Result<RevocationStatus, CoreError> {
        let mut tables = self.tables()?;
        Ok(match tables.held_mut(lock_id) {
            None => RevocationStatus::Gone,
            Some(held) if held.revoke_denied => RevocationStatus::Denied,
            Some(_) => RevocationStatus::Pending,
        })
    }

    async fn deny_revocation(&self, lock_id: &str) -> Result<bool, CoreError> {
        let mut tables = self.tables()?;
        Ok(match tables.held_mut(lock_id) {
            Some(held) => {
                held.revoke_denied = true;
                true
            }
            None => false,
        })
    }

    async fn remove_lock(&self, lock_id: &str) -> Result<bool, CoreError> {
        let mut tables = self.tables()?;
        let before = tables.locks.len();
        tables.locks.retain(|_, h| h.lock.lock_id != lock_id);
        Ok(tables.locks.len() < before)
    }

    async fn add_revoker_entry(
        &self,
        rights: &LockRevokerRights,
        allow: bool,
    ) -> Result<(), CoreError> {
        let entry = RevokerEntry {
            rights: rights.clone(),
            allow,
        };
        let mut tables = self.tables()?;
        if !tables.revoker_entries.contains(&entry) {
            tables.revoker_entries.push(entry);
        }
        Ok(())
    }

    async fn clear_revoker_entries(
        &self,
        office_id: &str,
        application_id: &str,
        user_id: &str,
    ) -> Result<u64, CoreError> {
        let mut tables = self.tables()?;
        let before = tables.revoker_entries.len();
        tables.revoker_entries.retain(|e| {
            !(e.rights.office_id == office_id
                && e.rights.application_id == application_id
                && e.rights.user_id == user_id)
        });
        Ok((before - tables.revoker_entries.len()) as u64)
    }

    async fn revoker_entries_for(
        &self,
        office_id: &str,
        application_id: &str,
        user_id: &str,
    ) -> Result<Vec<RevokerEntry>, CoreError> {
        Ok(self
            .tables()?
            .revoker_entries
            .iter()
            .filter(|e| {
                e.rights.office_id == office_id
                    && e.rights.application_id == application_id
                    && e.rights.user_id == user_id
            })
            .cloned()
            .collect())
    }

    async fn revoker_entries(
        &self,
        office: &Mask,
        application: &Mask,
    ) -> Result<Vec<RevokerEntry>, CoreError> {
        Ok(self
            .tables()?
            .revoker_entries
            .iter()
            .filter(|e| office.matches(&e.rights.office_id) && application.matches(&e.rights.application_id))
            .cloned()
            .collect())
    }
}
