use thiserror::Error;

use crate::repository::RepositoryError;

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Request parameters or body failed validation.
    #[error("{0}")]
    Validation(String),
    /// Requested resource was not found.
    #[error("{0}")]
    NotFound(String),
    /// A product with the same identifier already exists.
    #[error("{0}")]
    DuplicateId(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound(id) => {
                Self::NotFound(format!("Product with ID {id} not found"))
            }
            RepositoryError::DuplicateId(id) => {
                Self::DuplicateId(format!("Product with ID {id} already exists"))
            }
            RepositoryError::OrdinalIdsExhausted => Self::Validation(
                "product_id is required: no ordinal id is left to assign".to_string(),
            ),
            RepositoryError::LockPoisoned => {
                log::error!("Product table lock is poisoned");
                Self::Internal
            }
        }
    }
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
