//! # AppError
//!
//! Centralized error handling for anonboard.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;
use uuid::Uuid;

/// The primary error type for all ab-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Thread, Reply)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Validation failure (e.g., empty text, missing delete password)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Delete key did not match the stored hash
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Storage backend unreachable or a query failed
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Infrastructure failure outside storage (e.g., key hashing, rendering)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn thread_not_found(id: Uuid) -> Self {
        AppError::NotFound("thread", id.to_string())
    }

    pub fn reply_not_found(id: Uuid) -> Self {
        AppError::NotFound("reply", id.to_string())
    }

    /// Outcomes a delete request must not tell apart: an unknown target and a
    /// wrong key look the same to the caller.
    pub fn is_refused_delete(&self) -> bool {
        matches!(self, AppError::NotFound(..) | AppError::Unauthorized(_))
    }
}

/// Port traits report failures through `anyhow`; anything they raise is a
/// storage failure from the core's point of view.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::StorageUnavailable(format!("{err:#}"))
    }
}

/// A specialized Result type for anonboard logic.
pub type Result<T> = std::result::Result<T, AppError>;
