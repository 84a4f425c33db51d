//! # Error Types
//!
//! Domain-specific error types for atelier-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  atelier-core errors (this file)                                       │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  atelier-db errors (separate crate)                                    │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── CheckoutError    - What a failed checkout reports to the caller   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → UI                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No cart line at the requested position.
    #[error("Cart has no line at position {position} (cart has {len} lines)")]
    CartLineNotFound { position: usize, len: usize },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// The daily bill sequence ran past `NNNN` = 9999.
    ///
    /// ## When This Occurs
    /// The 10,000th checkout of a calendar day. The id format only has four
    /// digits, so this is a hard stop rather than a wrap-around.
    #[error("Bill sequence for {date} exhausted: {requested} exceeds {max}")]
    BillSequenceExhausted {
        date: String,
        requested: u32,
        max: u32,
    },

    /// A string did not parse as `B-YYYYMMDD-NNNN`.
    #[error("Invalid bill id '{value}': {reason}")]
    InvalidBillId { value: String, reason: String },

    /// A status change that the state machine does not allow.
    #[error("Cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        entity: String,
        from: String,
        to: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything is written, so returning one of these never leaves
/// state behind.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// The cart has no lines.
    #[error("Cart is empty")]
    EmptyCart,
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::BillSequenceExhausted {
            date: "20260214".to_string(),
            requested: 10_000,
            max: 9999,
        };
        assert_eq!(
            err.to_string(),
            "Bill sequence for 20260214 exhausted: 10000 exceeds 9999"
        );

        let err = CoreError::CartLineNotFound { position: 3, len: 2 };
        assert_eq!(
            err.to_string(),
            "Cart has no line at position 3 (cart has 2 lines)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("customer").to_string(), "customer is required");
        assert_eq!(ValidationError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::EmptyCart.into();
        assert!(matches!(core_err, CoreError::Validation(ValidationError::EmptyCart)));
    }
}
