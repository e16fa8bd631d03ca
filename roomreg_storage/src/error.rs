use thiserror::Error;

/// Failure of a store call, shared by every storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be reached or failed while serving the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("room {0:?} already exists")]
    DuplicateName(String),

    #[error("store rejected the request: {0}")]
    Rejected(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(value: sqlx::Error) -> Self {
        Self::Unavailable(value.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Self::Unavailable(value.to_string())
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(value: reqwest::Error) -> Self {
        Self::Unavailable(value.to_string())
    }
}
