use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A singleton record ("latest capture", "latest preferences") does not exist yet.
    #[error("No {0} found")]
    Missing(&'static str),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Field-level validation failures from a `validator` derive.
    #[error("Validation failed: {0}")]
    InvalidFields(#[from] validator::ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(String),
}
