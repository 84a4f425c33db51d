//! # Checkout Committer
//!
//! Persists a cart as one bill, atomically.
//!
//! ## Transaction Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutPlan::build()            validation, amounts, credits (pure)   │
//! │        │  error → CheckoutError::Validation, nothing written            │
//! │        ▼                                                                │
//! │  BEGIN ──────────────────────────────────────────────────────────────┐  │
//! │  │ 1. bill_sequences upsert  → B-YYYYMMDD-NNNN                      │  │
//! │  │ 2. INSERT bills            (UNIQUE bill_id)                       │  │
//! │  │ 3. INSERT bill_items       one per cart line                     │  │
//! │  │ 4. INSERT course_credits   one per course seat                   │  │
//! │  │ 5. INSERT sales_history    one per cart line                     │  │
//! │  COMMIT ─────────────────────────────────────────────────────────────┘  │
//! │        │                                                                │
//! │        ├── ok              → cart cleared, Receipt returned             │
//! │        ├── bill_id clash   → rolled back, whole transaction retried     │
//! │        └── any other error → rolled back, cart untouched                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dropping the `Transaction` without committing rolls it back, so every
//! early `?` return inside [`Checkout::write`] leaves no partial bill.

use atelier_core::{
    BillId, Cart, CheckoutPlan, CheckoutRequest, CreditPolicy, PackageId, ProductId, Receipt,
};
use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::error::{CheckoutError, CheckoutResult, DbError, DbResult};
use crate::pool::Database;
use crate::repository::{bill, credit, sales_history};

/// Attempts per checkout when the bill id collides.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

const BILL_ID_COLUMN: &str = "bills.bill_id";

/// Builds carts from the catalog and commits them.
///
/// ## Usage
/// ```rust,ignore
/// let checkout = db.checkout(config.checkout.credit_policy())
///     .max_attempts(config.checkout.max_commit_attempts);
///
/// let mut cart = Cart::new();
/// checkout.add_product(&mut cart, knife_id, 2, true).await?;
///
/// let request = CheckoutRequest::new(customer, seller, PaymentMethod::Cash, SaleChannel::LineOa)
///     .with_discount(DiscountRate::from_percent(10));
/// let receipt = checkout.commit(&mut cart, &request).await?;
/// assert!(cart.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Checkout {
    db: Database,
    policy: CreditPolicy,
    max_attempts: u32,
}

impl Checkout {
    pub fn new(db: Database, policy: CreditPolicy) -> Self {
        Checkout {
            db,
            policy,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets how many times a colliding bill id is retried (at least once).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn policy(&self) -> &CreditPolicy {
        &self.policy
    }

    // =========================================================================
    // Cart Building
    // =========================================================================

    /// Adds a catalog product to the cart at its current price.
    ///
    /// ## Errors
    /// `DbError::NotFound` for a missing or inactive product, and
    /// `DbError::Domain` when the cart rejects the line.
    pub async fn add_product(
        &self,
        cart: &mut Cart,
        product_id: ProductId,
        quantity: i64,
        is_course: bool,
    ) -> DbResult<()> {
        let product = self.db.products().get(product_id).await?;
        if !product.is_active {
            return Err(DbError::not_found("Product", product_id));
        }

        cart.add(&product, quantity, is_course)?;
        debug!(product_id, quantity, is_course, lines = cart.len(), "Added to cart");
        Ok(())
    }

    /// Replaces the cart with a package's constituents and adjustment line.
    ///
    /// Returns the number of lines that were discarded.
    pub async fn load_package(&self, cart: &mut Cart, package_id: PackageId) -> DbResult<usize> {
        let (package, products) = self.db.packages().get_with_products(package_id).await?;

        let discarded = cart.load_package(&package, &products)?;
        if discarded > 0 {
            warn!(package_id, discarded, "Loading a package replaced existing cart lines");
        }

        debug!(package_id, lines = cart.len(), subtotal = %cart.subtotal(), "Package loaded");
        Ok(discarded)
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Commits the cart with the current local time as the sale time.
    pub async fn commit(
        &self,
        cart: &mut Cart,
        request: &CheckoutRequest,
    ) -> CheckoutResult<Receipt> {
        self.commit_at(cart, request, Local::now().naive_local()).await
    }

    /// Commits the cart as of `now`.
    ///
    /// On success the cart is emptied and the receipt for the new bill is
    /// returned. On any error nothing was written and the cart is unchanged.
    ///
    /// ## Errors
    /// - `Validation` - empty cart, missing selection, bad quantity or note
    /// - `IdentifierCollision` - the bill id still clashed after every attempt
    /// - `Core` - the day has used all 9999 bill numbers
    /// - `Persistence` - the store failed; safe to retry
    pub async fn commit_at(
        &self,
        cart: &mut Cart,
        request: &CheckoutRequest,
        now: NaiveDateTime,
    ) -> CheckoutResult<Receipt> {
        let plan = CheckoutPlan::build(cart, request, now, &self.policy)?;

        debug!(
            cart_id = %cart.id(),
            lines = plan.lines.len(),
            credits = plan.credit_count(),
            final_amount = %plan.final_amount,
            "Checkout plan built"
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut allocated = None;

            match self.write(&plan, &mut allocated).await {
                Ok(bill_id) => {
                    cart.clear();
                    info!(
                        bill_id = %bill_id,
                        customer_id = plan.customer.customer_id,
                        final_amount = %plan.final_amount,
                        credits = plan.credit_count(),
                        "Checkout committed"
                    );
                    return Ok(plan.receipt(bill_id));
                }
                Err(err) if err.is_unique_violation_on(BILL_ID_COLUMN) => {
                    let bill_id = allocated.map(|id| id.to_string()).unwrap_or_default();
                    if attempt >= self.max_attempts {
                        warn!(
                            bill_id = %bill_id,
                            attempts = attempt,
                            "Bill id collision, giving up"
                        );
                        return Err(CheckoutError::IdentifierCollision {
                            bill_id,
                            attempts: attempt,
                        });
                    }
                    warn!(bill_id = %bill_id, attempt, "Bill id collision, retrying");
                }
                Err(err) => {
                    warn!(error = %err, "Checkout rolled back");
                    return Err(err.into());
                }
            }
        }
    }

    /// Runs one attempt of the checkout transaction.
    ///
    /// `allocated` receives the bill id as soon as it is allocated, so the
    /// caller can report it if the insert then collides.
    async fn write(&self, plan: &CheckoutPlan, allocated: &mut Option<BillId>) -> DbResult<BillId> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let bill_id = bill::allocate_bill_id(&mut *tx, plan.commit_date()).await?;
        *allocated = Some(bill_id);

        bill::insert_bill(&mut *tx, bill_id, plan).await?;

        for line in &plan.lines {
            bill::insert_item(&mut *tx, bill_id, line).await?;
        }

        for new_credit in &plan.credits {
            credit::insert_credit(&mut *tx, bill_id, new_credit).await?;
        }

        for line in &plan.lines {
            sales_history::insert_entry(&mut *tx, plan, line).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(bill_id)
    }
}
