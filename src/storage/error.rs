use thiserror::Error;

use crate::utils::time::TimeError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    InvalidFormat(#[from] TimeError),
    #[error("A project with TODO id '{0}' already exists")]
    DuplicateKey(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Turns a unique constraint violation into [StorageError::DuplicateKey].
    pub(crate) fn from_insert(error: sqlx::Error, key: &str) -> Self {
        match &error {
            sqlx::Error::Database(e) if e.is_unique_violation() => Self::DuplicateKey(key.into()),
            _ => Self::Database(error),
        }
    }
}
