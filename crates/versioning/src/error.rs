//! Boundary error type for the versioning services.
//!
//! Wraps [`CoreError`] for domain errors and `sqlx::Error` for storage
//! errors, so callers see one error kind per failure and storage details
//! never leak past this crate unwrapped.

use vellum_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum VersioningError {
    /// A domain-level error from `vellum-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for service return values.
pub type VersioningResult<T> = Result<T, VersioningError>;
