//! # Database Error Types
//!
//! Error types for database operations and for the checkout transaction.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CheckoutError ← What the checkout form shows                          │
//! │       ├── Validation           nothing was written                     │
//! │       ├── IdentifierCollision  retried, still colliding                │
//! │       ├── Persistence          rolled back, cart kept                  │
//! │       └── Core                 domain rule (e.g. 9999 bills today)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use atelier_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Two checkouts ending up with the same bill id
    /// - Adding the same product to a package twice
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Checkout for a customer or seller id that doesn't exist
    /// - Crediting a course product that doesn't exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed (including CHECK constraints and triggers).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A domain rule rejected data read from or about to be written to the
    /// store.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True if this is a UNIQUE violation on `table.column`.
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field == column)
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .trim()
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Domain(CoreError::Validation(err))
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Checkout Error
// =============================================================================

/// Why a checkout did not complete.
///
/// Whatever the variant, nothing from the attempt is visible in the store and
/// the caller's cart is unchanged.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Rejected before any write.
    #[error("Checkout rejected: {0}")]
    Validation(ValidationError),

    /// The allocated bill id kept colliding with an existing bill.
    #[error("Bill id {bill_id} still collided after {attempts} attempts; please retry")]
    IdentifierCollision { bill_id: String, attempts: u32 },

    /// The store failed mid-transaction; everything was rolled back.
    #[error("Checkout did not complete: {0}")]
    Persistence(DbError),

    /// A domain rule failed during the commit.
    #[error("Checkout failed: {0}")]
    Core(CoreError),
}

impl CheckoutError {
    /// True if the same request may succeed when submitted again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::IdentifierCollision { .. } | CheckoutError::Persistence(_)
        )
    }
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Validation(err)
    }
}

impl From<CoreError> for CheckoutError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => CheckoutError::Validation(v),
            other => CheckoutError::Core(other),
        }
    }
}

impl From<DbError> for CheckoutError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            other => CheckoutError::Persistence(other),
        }
    }
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        DbError::from(err).into()
    }
}

/// Result type for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_helper() {
        let err = DbError::duplicate("bills.bill_id", "B-20260214-0001");
        assert!(err.is_unique_violation_on("bills.bill_id"));
        assert!(!err.is_unique_violation_on("products.product_id"));
        assert!(!DbError::PoolExhausted.is_unique_violation_on("bills.bill_id"));
    }

    #[test]
    fn test_checkout_error_routing() {
        let err: CheckoutError = CoreError::from(ValidationError::EmptyCart).into();
        assert!(matches!(err, CheckoutError::Validation(ValidationError::EmptyCart)));
        assert!(!err.is_retryable());

        let err: CheckoutError = DbError::Domain(CoreError::BillSequenceExhausted {
            date: "20260214".to_string(),
            requested: 10_000,
            max: 9999,
        })
        .into();
        assert!(matches!(err, CheckoutError::Core(_)));
        assert!(!err.is_retryable());

        let err: CheckoutError = DbError::PoolExhausted.into();
        assert!(err.is_retryable());
    }
}
