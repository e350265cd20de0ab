//! Storage-specific error types for the JSON file store.
//!
//! Filesystem and serialization failures are wrapped here and converted to
//! the backend-agnostic types of `papertrade_core` before reaching callers.

use std::path::PathBuf;

use papertrade_core::errors::{DatabaseError, Error};
use thiserror::Error;

/// Errors raised while reading or replacing the store file.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },

    #[error("Failed to serialize ledger: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Serialization(e) => Error::Database(DatabaseError::Internal(e.to_string())),
            StorageError::LockPoisoned => Error::Unexpected("Store lock poisoned".to_string()),
            other => Error::Database(DatabaseError::Io(other.to_string())),
        }
    }
}
