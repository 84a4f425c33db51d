//! # atelier-db: Database Layer for Atelier
//!
//! SQLite storage for the cooking-school back office, and the one place a
//! cart becomes a bill.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Atelier Data Flow                                │
//! │                                                                         │
//! │  Admin UI / seed binary                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    atelier-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌──────────────┐     │   │
//! │  │   │   Database    │   │ Repositories  │   │  Checkout    │     │   │
//! │  │   │   (pool.rs)   │   │               │   │              │     │   │
//! │  │   │               │   │ products      │   │ one tx:      │     │   │
//! │  │   │ SqlitePool    │◄──│ parties       │   │ bill, items, │     │   │
//! │  │   │ migrations    │   │ packages      │   │ credits,     │     │   │
//! │  │   │ config        │   │ bills/credits │   │ legacy rows  │     │   │
//! │  │   └───────────────┘   └───────────────┘   └──────────────┘     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/atelier/atelier.db (Linux)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and repository access
//! - [`config`] - TOML + environment configuration
//! - [`checkout`] - The checkout transaction
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and checkout error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atelier_db::{AtelierConfig, Database};
//!
//! let config = AtelierConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let checkout = db
//!     .checkout(config.checkout.credit_policy())
//!     .max_attempts(config.checkout.max_commit_attempts);
//! let receipt = checkout.commit(&mut cart, &request).await?;
//! println!("{}", receipt.to_text());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{Checkout, DEFAULT_MAX_ATTEMPTS};
pub use config::{AtelierConfig, CheckoutSettings, ConfigError, DatabaseSettings};
pub use error::{CheckoutError, CheckoutResult, DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::bill::BillRepository;
pub use repository::credit::CreditRepository;
pub use repository::package::PackageRepository;
pub use repository::party::{NewCustomer, PartyRepository};
pub use repository::product::ProductRepository;
pub use repository::refund::RefundRepository;
pub use repository::sales_history::SalesHistoryRepository;
