//! # Repository Module
//!
//! Database repository implementations for Atelier.
//!
//! ## Two Kinds of Access
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Repositories (hold a SqlitePool, one statement or tx per call)         │
//! │       db.products().search("knife", 20)                                 │
//! │       db.credits().check_in(credit_id)                                  │
//! │                                                                         │
//! │  Checkout writers (pub(crate) fns taking &mut SqliteConnection)         │
//! │       bill::allocate_bill_id / insert_bill / insert_item                │
//! │       credit::insert_credit                                             │
//! │       sales_history::insert_entry                                       │
//! │       Only checkout.rs calls these, all on one transaction.             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog search and upkeep
//! - [`PartyRepository`](party::PartyRepository) - Customers and employees
//! - [`PackageRepository`](package::PackageRepository) - Bundles and constituents
//! - [`BillRepository`](bill::BillRepository) - Committed bills and summaries
//! - [`CreditRepository`](credit::CreditRepository) - Course credits and check-in
//! - [`SalesHistoryRepository`](sales_history::SalesHistoryRepository) - Legacy report rows
//! - [`RefundRepository`](refund::RefundRepository) - Refund requests

pub mod bill;
pub mod credit;
pub mod package;
pub mod party;
pub mod product;
pub mod refund;
pub mod sales_history;
