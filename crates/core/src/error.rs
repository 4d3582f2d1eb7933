#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a `NotFound` keyed by an office-scoped identifier.
    pub fn not_found(entity: &'static str, office_id: &str, id: &str) -> Self {
        CoreError::NotFound {
            entity,
            id: format!("{office_id}/{id}"),
        }
    }
}
