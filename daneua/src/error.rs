//! Error types for D(ane)ua
//!
//! All errors use thiserror for structured error handling.
//! `RemoteError` covers everything the backend reports; `AppError` adds the
//! client-side failures (permissions, missing rows, local I/O).

use crate::models::Table;
use thiserror::Error;

/// Failure reported by the backend collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rejected by backend: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RemoteError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() || db.is_check_violation() => {
                RemoteError::Validation(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                RemoteError::Validation(db.message().to_string())
            }
            _ => RemoteError::Network(err.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{table} row not found: {id}")]
    NotFound { table: Table, id: String },

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Blob store error: {0}")]
    BlobStore(String),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    pub fn not_found(table: Table, id: impl Into<String>) -> Self {
        AppError::NotFound {
            table,
            id: id.into(),
        }
    }

    /// Whether the failure is worth a dismissible notification rather than
    /// an empty-state screen.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Remote(RemoteError::Network(_)))
    }
}

// Database errors only arise inside the local backend, where they are
// backend failures from the client's point of view.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Remote(err.into())
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
