mod applications;
mod users;
mod vacancies;

pub use applications::ApplicationService;
pub use users::{UserService, UserUploads};
pub use vacancies::VacancyService;

use std::fmt::Display;

use super::domain::UnknownStatus;
use super::repository::RepositoryError;
use super::uploads::UploadError;

pub(crate) const ALREADY_APPLIED: &str = "User already applied to this vacancy";
pub(crate) const MISSING_REFERENCE: &str = "Referenced user or vacancy does not exist";

/// Error raised by the recruitment services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),
    #[error(transparent)]
    Upload(UploadError),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl Display) -> Self {
        Self::NotFound(format!("Could not find {entity} with Id: {id}"))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Maps a store failure while addressing one record, keeping the record in the message.
    pub(crate) fn from_store(err: RepositoryError, entity: &str, id: impl Display) -> Self {
        match err {
            RepositoryError::NotFound => Self::not_found(entity, id),
            other => other.into(),
        }
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict => Self::Conflict(ALREADY_APPLIED.to_string()),
            RepositoryError::MissingReference => Self::Conflict(MISSING_REFERENCE.to_string()),
            RepositoryError::NotFound => Self::NotFound("Record not found".to_string()),
            RepositoryError::Unavailable(reason) => Self::Internal(reason),
        }
    }
}

impl From<UploadError> for ServiceError {
    fn from(value: UploadError) -> Self {
        match value {
            UploadError::Io { .. } => Self::Internal(value.to_string()),
            other => Self::Upload(other),
        }
    }
}

impl From<UnknownStatus> for ServiceError {
    fn from(value: UnknownStatus) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}
