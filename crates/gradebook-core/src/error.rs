//! Core error types.
//!
//! Field-level failures are not errors here: they are [`FieldError`] values
//! collected per row. `CoreError` covers the failures a caller must handle.
//!
//! [`FieldError`]: crate::model::FieldError

use thiserror::Error;

/// Errors returned by core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No rejected row carries the requested numero.
    #[error("no rejected record with numero '{numero}'")]
    NotFound { numero: String },

    /// A grade segment is not of the form `Subject[assignments:exam]`.
    #[error("malformed grade segment '{segment}': {reason}")]
    MalformedGradeSegment { segment: String, reason: String },
}
