//! # atelier-core: Pure Checkout Logic for Atelier
//!
//! This crate is the **heart** of the Atelier cooking-school back office. It
//! contains the checkout's business rules as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Atelier Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Admin UI (out of scope)                      │   │
//! │  │    Catalog ──► Cart ──► Checkout form ──► Receipt               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ atelier-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  money   │ │   cart   │ │ checkout │ │  credit  │          │   │
//! │  │   │  Money   │ │   Cart   │ │   Plan   │ │  Policy  │          │   │
//! │  │   │ Discount │ │ packages │ │ Receipt  │ │  Status  │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS AT CHECKOUT             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  atelier-db (Database Layer)                    │   │
//! │  │     SQLite, migrations, repositories, the checkout transaction  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog, party and bill records
//! - [`money`] - Integer satang money and discount rates
//! - [`bill_id`] - `B-YYYYMMDD-NNNN` identifiers
//! - [`cart`] - The in-progress sale and package expansion
//! - [`checkout`] - Validation and amounts for a commit
//! - [`credit`] - Course credit policy and state machine
//! - [`receipt`] - Receipt summary
//! - [`validation`] - Field rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use atelier_core::{Cart, Money, Package, Product};
//!
//! let bread = Product {
//!     product_id: 1,
//!     product_name: "Bread Basics".to_string(),
//!     category: None,
//!     price: Money::from_baht(4000),
//!     is_active: true,
//! };
//! let pastry = Product { product_id: 2, product_name: "Pastry Lab".to_string(), price: Money::from_baht(6000), ..bread.clone() };
//! let bundle = Package {
//!     package_id: 1,
//!     package_name: "Baker Bundle".to_string(),
//!     base_price: Money::from_baht(10_000),
//!     discounted_price: Money::from_baht(8000),
//!     note: None,
//! };
//!
//! let mut cart = Cart::new();
//! cart.load_package(&bundle, &[bread, pastry]).unwrap();
//! assert_eq!(cart.subtotal(), Money::from_baht(8000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bill_id;
pub mod cart;
pub mod checkout;
pub mod credit;
pub mod error;
pub mod money;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use bill_id::{BillId, MAX_DAILY_SEQUENCE};
pub use cart::{Cart, CartLine};
pub use checkout::{CheckoutPlan, CheckoutRequest};
pub use credit::{
    CheckInOutcome, CourseCredit, CreditPolicy, CreditStatus, ExpiryCounting, NewCourseCredit,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{DiscountRate, Money};
pub use receipt::{Receipt, ReceiptLine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity on a single cart line.
///
/// ## Business Reason
/// Catches typos like 100 seats instead of 10 before they mint credits.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price a catalog row or cart line may carry (฿100,000,000).
///
/// Keeps `MAX_CART_LINES * MAX_ITEM_QUANTITY * price` well inside `i64`.
pub const MAX_UNIT_PRICE: Money = Money::from_satang(10_000_000_000);

/// Product id carried by package adjustment lines.
///
/// Catalog ids start at 1, so 0 never names a real product. Bill items and
/// sales_history rows keep it as-is, which is why those columns carry no
/// foreign key to `products`.
pub const PACKAGE_ADJUSTMENT_PRODUCT_ID: ProductId = 0;
