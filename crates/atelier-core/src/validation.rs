//! # Validation Module
//!
//! Input validation utilities for Atelier.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin UI                                                      │
//! │  ├── Dropdowns for customer/seller/payment/channel                     │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart + CheckoutPlan (Rust)                                   │
//! │  └── THIS MODULE: quantities, names, notes, amounts                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── PRIMARY KEY on bills.bill_id                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here runs before the checkout opens a transaction, so a
//! failure never leaves rows behind.
//!
//! ## Usage
//! ```rust
//! use atelier_core::validation::{validate_name, validate_quantity};
//!
//! validate_quantity(2).unwrap();
//! validate_name("product_name", "Knife Skills 101").unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_ITEM_QUANTITY, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest product, package or person name accepted.
pub const MAX_NAME_LEN: usize = 200;

/// Longest free-text sale note accepted.
pub const MAX_NOTE_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product, package, customer, employee).
///
/// ## Rules
/// - Must not be blank
/// - At most `MAX_NAME_LEN` characters (counted as chars, Thai text is fine)
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Normalizes an optional sale note.
///
/// Blank notes become `None`; surrounding whitespace is trimmed.
pub fn normalize_note(note: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if note.chars().count() > MAX_NOTE_LEN {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_NOTE_LEN,
        });
    }

    Ok(Some(note.to_string()))
}

/// Validates a search query and returns it trimmed.
///
/// Empty is allowed (lists everything).
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed MAX_ITEM_QUANTITY
///
/// ```text
///   add(product, qty) ──► validate_quantity(qty)
///                              │
///                              ├── qty < 1   → OutOfRange
///                              ├── qty > 999 → OutOfRange
///                              └── OK → line appended
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a catalog price. Zero is allowed (free workshops).
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() || price > MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_UNIT_PRICE.satang(),
        });
    }

    Ok(())
}

/// Validates a bill subtotal before a discount is taken from it.
///
/// A package whose adjustment outweighs every other line could drive the
/// subtotal below zero; such a bill would break `0 <= discount <= total`.
pub fn validate_subtotal(subtotal: Money) -> ValidationResult<()> {
    if subtotal.is_negative() {
        return Err(ValidationError::MustBePositive {
            field: "subtotal".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("product_name", "Knife Skills 101").is_ok());
        assert!(validate_name("product_name", "ขนมไทย").is_ok());
        assert!(validate_name("product_name", "").is_err());
        assert!(validate_name("product_name", "   ").is_err());
        assert!(validate_name("product_name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_thai_name_length_counts_chars() {
        // 150 Thai chars are 450 bytes but well inside the limit
        assert!(validate_name("full_name", &"ก".repeat(150)).is_ok());
    }

    #[test]
    fn test_normalize_note() {
        assert_eq!(normalize_note(None).unwrap(), None);
        assert_eq!(normalize_note(Some("   ")).unwrap(), None);
        assert_eq!(
            normalize_note(Some("  paid by spouse ")).unwrap(),
            Some("paid by spouse".to_string())
        );
        assert!(normalize_note(Some(&"x".repeat(501))).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("price", Money::zero()).is_ok());
        assert!(validate_price("price", Money::from_baht(1500)).is_ok());
        assert!(validate_price("price", Money::from_baht(-1)).is_err());
        assert!(validate_price("price", MAX_UNIT_PRICE).is_ok());
        assert!(validate_price("price", MAX_UNIT_PRICE + Money::from_satang(1)).is_err());
    }

    #[test]
    fn test_validate_subtotal() {
        assert!(validate_subtotal(Money::zero()).is_ok());
        assert!(validate_subtotal(Money::from_satang(-1)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  knife ").unwrap(), "knife");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }
}
