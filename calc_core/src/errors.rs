//! # Error Types
//!
//! Structured error types for calc_core. Every calculation is a single
//! fallible operation: the first failed lookup or violated physical
//! precondition aborts the calculation and surfaces here, with enough
//! context to name the table, key, or quantity involved.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::errors::{CalcError, CalcResult};
//!
//! fn validate_thickness(thickness_in: f64) -> CalcResult<()> {
//!     if thickness_in <= 0.0 {
//!         return Err(CalcError::domain_invalid(
//!             "thickness",
//!             "material thickness must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for calc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
///
/// Each variant provides specific context about what went wrong,
/// enabling programmatic handling by whatever transport sits in front
/// of the engine (HTTP 400 vs 500, CLI error section, etc.).
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A material/model/key string has no entry in the named lookup table
    #[error("Lookup failed: no entry '{key}' in table '{table}'")]
    LookupNotFound { table: String, key: String },

    /// A supplied or computed value violates a physical precondition
    /// (zero density, zero coil OD, zero gear ratio, ...)
    #[error("Invalid domain value at '{stage}': {detail}")]
    DomainInvalid { stage: String, detail: String },

    /// An enum-like string input matches none of the recognized
    /// categories (brake model, roll count, yes/no flag, ...)
    #[error("Configuration mismatch for '{field}': unrecognized value '{value}'")]
    ConfigurationMismatch { field: String, value: String },

    /// RFQ store I/O error
    #[error("Store error: {operation} on '{path}' - {reason}")]
    StoreError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create a LookupNotFound error
    pub fn lookup_not_found(table: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::LookupNotFound {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Create a DomainInvalid error
    pub fn domain_invalid(stage: impl Into<String>, detail: impl Into<String>) -> Self {
        CalcError::DomainInvalid {
            stage: stage.into(),
            detail: detail.into(),
        }
    }

    /// Create a ConfigurationMismatch error
    pub fn configuration_mismatch(field: impl Into<String>, value: impl Into<String>) -> Self {
        CalcError::ConfigurationMismatch {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a StoreError
    pub fn store_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::StoreError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is attributable to the request (a 400-class
    /// failure) rather than to the engine or its environment.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            CalcError::LookupNotFound { .. }
                | CalcError::DomainInvalid { .. }
                | CalcError::ConfigurationMismatch { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::LookupNotFound { .. } => "LOOKUP_NOT_FOUND",
            CalcError::DomainInvalid { .. } => "DOMAIN_INVALID",
            CalcError::ConfigurationMismatch { .. } => "CONFIGURATION_MISMATCH",
            CalcError::StoreError { .. } => "STORE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
