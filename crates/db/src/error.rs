use cda_core::error::CoreError;

/// Error type for repositories that can fail on the database or on
/// domain rules (malformed cursors, missing parents, lock conflicts).
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// PostgreSQL foreign-key violation.
pub(crate) const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Whether `err` is a foreign-key violation.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION))
}
