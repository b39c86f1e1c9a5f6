use thiserror::Error;

use crate::api::HttpError;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Phone {phone} already has an active appointment")]
    DuplicateActiveBooking { phone: String },

    #[error("Storage backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl DataError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        DataError::NotFound(what.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFound(_))
    }
}

impl From<HttpError> for DataError {
    fn from(err: HttpError) -> Self {
        DataError::BackendUnavailable(err.to_string())
    }
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::BackendUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::BackendUnavailable(format!("Stored collection is unreadable: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
