//! Error types for store and command operations.
//!
//! The pure core (permissions, metrics) never errors: missing or malformed
//! optional fields coerce to zero and unknown roles resolve to no
//! capabilities. Errors here come from the store itself or from the command
//! layer rejecting a request (permission, validation, missing row).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl AppError {
    /// True for errors caused by the request itself (bad input, missing
    /// capability, missing row) rather than by the store or environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::PermissionDenied(_) | AppError::Validation(_) | AppError::NotFound { .. }
        )
    }

    pub fn permission(action: &str) -> Self {
        AppError::PermissionDenied(format!("current role may not {action}"))
    }

    pub fn required(field: &str) -> Self {
        AppError::Validation(format!("{field} is required"))
    }
}
