//! # Cart
//!
//! The in-progress sale. A cart is an explicit value owned by whoever runs
//! the checkout session; it never touches the database.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Operations                                 │
//! │                                                                         │
//! │  Action                    Method                 Effect                │
//! │  ──────                    ──────                 ──────                │
//! │                                                                         │
//! │  Add product ────────────► add() ───────────────► lines.push(snapshot) │
//! │                                                                         │
//! │  Remove a line ──────────► remove(position) ────► lines.remove(i)      │
//! │                                                                         │
//! │  Pick a package ─────────► load_package() ──────► lines = constituents │
//! │                                                     + adjustment line   │
//! │                                                                         │
//! │  Successful checkout ────► clear() ─────────────► lines.clear()        │
//! │                                                                         │
//! │  NOTE: subtotal() is recomputed from the lines on every call.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshots
//! A line freezes the product's name and price at the moment it is added.
//! Catalog edits after that point never reach an open cart, and through the
//! cart they never reach a committed bill.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Package, Product, ProductId};
use crate::validation::{validate_price, validate_quantity};
use crate::{MAX_CART_LINES, PACKAGE_ADJUSTMENT_PRODUCT_ID};

// =============================================================================
// Cart Line
// =============================================================================

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// Catalog id, or `PACKAGE_ADJUSTMENT_PRODUCT_ID` for a package adjustment.
    pub product_id: ProductId,

    /// Name at time of adding (frozen).
    pub product_name: String,

    /// Price at time of adding (frozen). Negative for a bundle discount.
    pub unit_price: Money,

    /// Always at least 1.
    pub quantity: i64,

    /// Committing this line mints `quantity` course credits.
    pub is_course: bool,
}

impl CartLine {
    /// Creates a line from a catalog product.
    pub fn from_product(product: &Product, quantity: i64, is_course: bool) -> Self {
        CartLine {
            product_id: product.product_id,
            product_name: product.product_name.clone(),
            unit_price: product.price,
            quantity,
            is_course,
        }
    }

    /// The synthetic line that reconciles a package's constituents with its
    /// selling price.
    pub fn package_adjustment(package: &Package, amount: Money) -> Self {
        CartLine {
            product_id: PACKAGE_ADJUSTMENT_PRODUCT_ID,
            product_name: format!("Package discount: {}", package.package_name),
            unit_price: amount,
            quantity: 1,
            is_course: false,
        }
    }

    /// `unit_price × quantity`.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// True for a package adjustment line (not a catalog product).
    pub fn is_adjustment(&self) -> bool {
        self.product_id == PACKAGE_ADJUSTMENT_PRODUCT_ID
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines stay in insertion order; the same product may appear twice
/// - Every line has quantity `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_LINES` lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    #[ts(as = "String")]
    id: Uuid,
    lines: Vec<CartLine>,
    #[ts(as = "String")]
    created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            id: Uuid::new_v4(),
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Session identity, handy for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Appends a line, snapshotting the product's current name and price.
    ///
    /// ## Errors
    /// - `ValidationError::OutOfRange` if quantity is outside `1..=MAX_ITEM_QUANTITY`
    ///   or the price is outside `0..=MAX_UNIT_PRICE`
    /// - `CoreError::CartTooLarge` if the cart is full
    pub fn add(&mut self, product: &Product, quantity: i64, is_course: bool) -> CoreResult<()> {
        validate_quantity(quantity)?;
        validate_price("price", product.price)?;
        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine::from_product(product, quantity, is_course));
        Ok(())
    }

    /// Removes the line at `position`; later lines shift up by one.
    pub fn remove(&mut self, position: usize) -> CoreResult<CartLine> {
        if position >= self.lines.len() {
            return Err(CoreError::CartLineNotFound {
                position,
                len: self.lines.len(),
            });
        }
        Ok(self.lines.remove(position))
    }

    /// Sum of line totals. Adjustment lines count (and may be negative).
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Replaces the cart with a package.
    ///
    /// ## Result Layout
    /// ```text
    ///   [0..n)  one line per constituent, live price, qty 1, is_course
    ///   [n]     "Package discount: <name>", discounted_price - Σ prices
    /// ```
    ///
    /// Anything already in the cart is discarded. The return value is the
    /// number of lines thrown away so the caller can warn about it.
    ///
    /// The adjustment is kept even when it is zero, so a receipt always
    /// shows which package the lines came from.
    pub fn load_package(
        &mut self,
        package: &Package,
        constituents: &[Product],
    ) -> CoreResult<usize> {
        if constituents.len() + 1 > MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }
        validate_price("discounted_price", package.discounted_price)?;
        for product in constituents {
            validate_price("price", product.price)?;
        }

        let list_total: Money = constituents.iter().map(|p| p.price).sum();
        let adjustment = package.discounted_price - list_total;

        let discarded = self.lines.len();
        self.lines.clear();
        self.lines.extend(
            constituents
                .iter()
                .map(|product| CartLine::from_product(product, 1, true)),
        );
        self.lines.push(CartLine::package_adjustment(package, adjustment));

        Ok(discarded)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAX_ITEM_QUANTITY, MAX_UNIT_PRICE};

    fn course(id: ProductId, name: &str, baht: i64) -> Product {
        Product {
            product_id: id,
            product_name: name.to_string(),
            category: Some("course".to_string()),
            price: Money::from_baht(baht),
            is_active: true,
        }
    }

    fn package(name: &str, discounted_baht: i64) -> Package {
        Package {
            package_id: 1,
            package_name: name.to_string(),
            base_price: Money::from_baht(10_000),
            discounted_price: Money::from_baht(discounted_baht),
            note: None,
        }
    }

    #[test]
    fn test_add_and_subtotal() {
        let mut cart = Cart::new();
        cart.add(&course(1, "Knife Skills 101", 1500), 2, true).unwrap();
        cart.add(&course(2, "Apron", 350), 1, false).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[0].line_total(), Money::from_baht(3000));
        assert_eq!(cart.subtotal(), Money::from_baht(3350));
    }

    #[test]
    fn test_add_keeps_duplicates_in_order() {
        let mut cart = Cart::new();
        let knife = course(1, "Knife Skills 101", 1500);
        cart.add(&knife, 1, true).unwrap();
        cart.add(&course(2, "Thai Curry", 1800), 1, true).unwrap();
        cart.add(&knife, 1, true).unwrap();

        let ids: Vec<_> = cart.lines().iter().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![1, 2, 1]);
    }

    #[test]
    fn test_add_rejects_bad_quantity() {
        let mut cart = Cart::new();
        let knife = course(1, "Knife Skills 101", 1500);

        for qty in [0, -1, MAX_ITEM_QUANTITY + 1] {
            let err = cart.add(&knife, qty, true).unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)));
        }
        assert!(cart.is_empty());
    }

    #[test]
    fn test_price_is_snapshotted() {
        let mut cart = Cart::new();
        let mut knife = course(1, "Knife Skills 101", 1500);
        cart.add(&knife, 1, true).unwrap();

        knife.price = Money::from_baht(1900);
        knife.product_name = "Knife Skills (new)".to_string();

        assert_eq!(cart.lines()[0].unit_price, Money::from_baht(1500));
        assert_eq!(cart.lines()[0].product_name, "Knife Skills 101");
    }

    #[test]
    fn test_remove_by_position() {
        let mut cart = Cart::new();
        cart.add(&course(1, "A", 100), 1, true).unwrap();
        cart.add(&course(2, "B", 200), 1, true).unwrap();
        cart.add(&course(3, "C", 300), 1, true).unwrap();

        let removed = cart.remove(1).unwrap();
        assert_eq!(removed.product_id, 2);
        assert_eq!(cart.lines()[1].product_id, 3);
        assert_eq!(cart.subtotal(), Money::from_baht(400));

        assert!(matches!(
            cart.remove(5),
            Err(CoreError::CartLineNotFound { position: 5, len: 2 })
        ));
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = Cart::new();
        let item = course(1, "A", 1);
        for _ in 0..MAX_CART_LINES {
            cart.add(&item, 1, false).unwrap();
        }
        assert!(matches!(
            cart.add(&item, 1, false),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(&course(1, "A", 100), 1, true).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::zero());
    }

    #[test]
    fn test_package_reconciles_to_selling_price() {
        let mut cart = Cart::new();
        let constituents = [
            course(1, "Bread Basics", 4000),
            course(2, "Pastry Lab", 6000),
        ];

        let discarded = cart
            .load_package(&package("Baker Bundle", 8000), &constituents)
            .unwrap();
        assert_eq!(discarded, 0);

        assert_eq!(cart.len(), 3);
        assert!(cart.lines()[..2].iter().all(|l| l.is_course && l.quantity == 1));

        let adjustment = &cart.lines()[2];
        assert!(adjustment.is_adjustment());
        assert!(!adjustment.is_course);
        assert_eq!(adjustment.product_name, "Package discount: Baker Bundle");
        assert_eq!(adjustment.unit_price, Money::from_baht(-2000));

        assert_eq!(cart.subtotal(), Money::from_baht(8000));
    }

    #[test]
    fn test_package_replaces_existing_lines() {
        let mut cart = Cart::new();
        cart.add(&course(9, "Apron", 350), 1, false).unwrap();
        cart.add(&course(8, "Knife", 900), 1, false).unwrap();

        let discarded = cart
            .load_package(&package("Solo", 1500), &[course(1, "Knife Skills 101", 1500)])
            .unwrap();

        assert_eq!(discarded, 2);
        assert_eq!(cart.len(), 2);
        assert!(cart.lines().iter().all(|l| l.product_id != 9 && l.product_id != 8));
        assert_eq!(cart.lines()[1].unit_price, Money::zero());
    }

    #[test]
    fn test_package_adjustment_can_be_positive() {
        let mut cart = Cart::new();
        cart.load_package(&package("Premium", 2000), &[course(1, "A", 1500)])
            .unwrap();
        assert_eq!(cart.lines()[1].unit_price, Money::from_baht(500));
        assert_eq!(cart.subtotal(), Money::from_baht(2000));
    }

    #[test]
    fn test_package_keeps_satang_exact() {
        let mut cart = Cart::new();
        let mut pkg = package("Odd", 0);
        pkg.discounted_price = Money::from_satang(99_999);
        cart.load_package(&pkg, &[course(1, "A", 1000), course(2, "B", 1000)])
            .unwrap();
        assert_eq!(cart.subtotal(), Money::from_satang(99_999));
        assert_eq!(cart.lines()[2].unit_price, Money::from_satang(-100_001));
    }

    #[test]
    fn test_add_rejects_price_that_would_overflow() {
        let mut cart = Cart::new();
        let mut gold = course(1, "Gold Leaf Masterclass", 0);
        gold.price = Money::from_satang(i64::MAX / 10);

        let err = cart.add(&gold, 20, true).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::zero());

        gold.price = MAX_UNIT_PRICE;
        cart.add(&gold, MAX_ITEM_QUANTITY, true).unwrap();
        assert_eq!(
            cart.subtotal(),
            Money::from_satang(MAX_UNIT_PRICE.satang() * MAX_ITEM_QUANTITY)
        );
    }

    #[test]
    fn test_package_rejects_out_of_range_price() {
        let mut cart = Cart::new();
        let mut huge = course(1, "Bread Basics", 0);
        huge.price = Money::from_satang(i64::MAX / 2);

        let err = cart
            .load_package(&package("Baker Bundle", 8000), &[huge.clone(), huge])
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(cart.is_empty());
    }
}
