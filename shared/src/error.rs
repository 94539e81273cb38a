//! Domain errors raised by the dashboard core

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced by the synchronous domain operations
///
/// None of these are fatal: each one aborts only the operation that raised it
/// and leaves the owning store untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Bad user input (blank name, malformed ring, unknown field)
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    /// An operation would break a store invariant
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Time {requested} is outside the timeline window [{start}, {end}]")]
    OutOfBounds {
        requested: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid range [{range_start}, {range_end}] for window [{start}, {end}]")]
    InvalidRange {
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

impl DomainError {
    /// Shorthand for a validation error on a named field
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
