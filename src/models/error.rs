use thiserror::Error;

use crate::database::DatabaseError;

/// Failure kinds surfaced by the query helpers and models.
///
/// `BadRequest` and `NotFound` are the two recoverable kinds callers are
/// expected to match on; everything else is a storage failure passed
/// through untouched.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ModelError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ModelError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ModelError::NotFound(message.into())
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
