//! # Error Types
//!
//! Domain-specific error types for vt-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vt-core errors (this file)                                            │
//! │  ├── CoreError        - Catalog / configuration-time failures          │
//! │  ├── TierTableError   - Why a tier table failed to parse               │
//! │  └── ValidationError  - Quote input failures (fail fast)               │
//! │                                                                         │
//! │  vt-render errors (separate crate)                                     │
//! │  └── RenderError      - Encoding the PDF / PNG artifacts               │
//! │                                                                         │
//! │  quoter errors (app)                                                   │
//! │  └── ApiError         - The single message the user sees               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → User                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A quantity below every tier minimum is NOT an error. It resolves to a
//! zero price and an empty label (see [`crate::tier`]).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A product's tier table could not be parsed at load time.
    #[error("Invalid tier table for {product}: {source}")]
    InvalidTierTable {
        product: String,
        #[source]
        source: TierTableError,
    },

    /// The same product id appears twice in the catalog.
    #[error("Duplicate product id in catalog: {0}")]
    DuplicateProduct(String),

    /// A monetary setting that cannot be used for pricing.
    #[error("Invalid price for {field}: {reason}")]
    InvalidPrice { field: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Tier Table Error
// =============================================================================

/// Reasons a tier table is rejected.
#[derive(Debug, Error)]
pub enum TierTableError {
    /// The string form is not valid JSON or has the wrong shape.
    #[error("malformed tier data: {0}")]
    Malformed(String),

    /// A rule whose maximum is below its minimum.
    #[error("rule {index} has max {max} below min {min}")]
    InvertedBounds { index: usize, min: u32, max: u32 },

    /// A rule with a negative price.
    #[error("rule {index} has a negative price")]
    NegativePrice { index: usize },
}

impl From<serde_json::Error> for TierTableError {
    fn from(err: serde_json::Error) -> Self {
        TierTableError::Malformed(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur before any order is computed; the action stops and the user
/// corrects the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g., unparseable date, bad product id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value outside the accepted range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// No product has a positive quantity.
    #[error("at least one product is required")]
    EmptyOrder,
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidTierTable {
            product: "imanes_3d".to_string(),
            source: TierTableError::InvertedBounds {
                index: 1,
                min: 100,
                max: 50,
            },
        };
        assert_eq!(
            err.to_string(),
            "Invalid tier table for imanes_3d: rule 1 has max 50 below min 100"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("client_name").to_string(),
            "client_name is required"
        );
        assert_eq!(
            ValidationError::EmptyOrder.to_string(),
            "at least one product is required"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("date").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
