use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Invalid argument: {0}")]
    Validation(String),

    #[error("Unauthenticated: {0}")]
    Unauthorized(String),
}
