use std::sync::Arc;

use cda_core::lock::LockManager;
use cda_db::repositories::PgLockStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: cda_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Project-lock protocol over the shared lock tables.
    pub locks: Arc<LockManager<PgLockStore>>,
}

impl AppState {
    pub fn new(pool: cda_db::DbPool, config: ServerConfig) -> Self {
        let locks = LockManager::new(
            PgLockStore::new(pool.clone()),
            std::time::Duration::from_millis(config.lock_poll_interval_ms),
        );
        Self {
            pool,
            config: Arc::new(config),
            locks: Arc::new(locks),
        }
    }
}
