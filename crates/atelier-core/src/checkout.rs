//! # Checkout Planning
//!
//! Turns a cart plus sale metadata into every value the checkout will write,
//! without touching the database.
//!
//! ## Planning vs Committing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Pipeline                                │
//! │                                                                         │
//! │   Cart + CheckoutRequest                                                │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   CheckoutPlan::build()   ◄── THIS MODULE (pure)                        │
//! │     • validation (empty cart, customer, seller, payment, channel)       │
//! │     • subtotal, discount (half up), final amount                        │
//! │     • one NewCourseCredit per unit of every course line                 │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   atelier-db Checkout::commit()  (one SQLite transaction)               │
//! │     1. allocate bill id   2. bill   3. bill items                       │
//! │     4. course credits     5. sales_history rows                         │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   CheckoutPlan::receipt(bill_id)   (no queries)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A plan that builds successfully can only fail to commit for storage
//! reasons; every business rule is checked here first.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::bill_id::BillId;
use crate::cart::{Cart, CartLine};
use crate::credit::{CreditPolicy, NewCourseCredit};
use crate::error::{CoreResult, ValidationError};
use crate::money::{DiscountRate, Money};
use crate::receipt::{Receipt, ReceiptLine};
use crate::types::{Customer, Employee, PaymentMethod, SaleChannel};
use crate::validation::{normalize_note, validate_quantity, validate_subtotal};

// =============================================================================
// Request
// =============================================================================

/// Sale metadata chosen on the checkout form.
///
/// Every field the form may leave unset is an `Option`, so a missing
/// selection is reported as a validation error rather than being
/// impossible to express.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer: Option<Customer>,
    pub seller: Option<Employee>,
    pub discount: DiscountRate,
    pub payment_method: Option<PaymentMethod>,
    pub sale_channel: Option<SaleChannel>,
    pub note: Option<String>,
}

impl CheckoutRequest {
    /// A fully specified request with no discount and no note.
    pub fn new(
        customer: Customer,
        seller: Employee,
        payment_method: PaymentMethod,
        sale_channel: SaleChannel,
    ) -> Self {
        CheckoutRequest {
            customer: Some(customer),
            seller: Some(seller),
            discount: DiscountRate::zero(),
            payment_method: Some(payment_method),
            sale_channel: Some(sale_channel),
            note: None,
        }
    }

    pub fn with_discount(mut self, discount: DiscountRate) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

// =============================================================================
// Plan
// =============================================================================

/// Everything a checkout will write, computed up front.
///
/// ## Invariants
/// - `lines` is non-empty and in cart order
/// - `subtotal == Σ line totals`, and `subtotal >= 0`
/// - `0 <= discount <= subtotal`
/// - `final_amount == subtotal - discount`
/// - `credits.len() == Σ quantity of course lines`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutPlan {
    pub customer: Customer,
    pub seller: Employee,
    pub sale_date: NaiveDateTime,
    pub lines: Vec<CartLine>,
    pub subtotal: Money,
    pub discount_rate: DiscountRate,
    pub discount: Money,
    pub final_amount: Money,
    pub payment_method: PaymentMethod,
    pub sale_channel: SaleChannel,
    pub note: Option<String>,
    pub credits: Vec<NewCourseCredit>,
}

impl CheckoutPlan {
    /// Validates the request against the cart and computes the bill.
    ///
    /// `now` is the commit timestamp; its date names the bill and starts
    /// every credit's validity window.
    ///
    /// ## Errors
    /// `CoreError::Validation` for an empty cart, a missing customer, seller,
    /// payment method or sale channel, a line quantity below 1, a negative
    /// subtotal or an over-long note.
    pub fn build(
        cart: &Cart,
        request: &CheckoutRequest,
        now: NaiveDateTime,
        policy: &CreditPolicy,
    ) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }
        let customer = request
            .customer
            .clone()
            .ok_or_else(|| ValidationError::required("customer"))?;
        let seller = request
            .seller
            .clone()
            .ok_or_else(|| ValidationError::required("seller"))?;
        let payment_method = request
            .payment_method
            .ok_or_else(|| ValidationError::required("payment_method"))?;
        let sale_channel = request
            .sale_channel
            .ok_or_else(|| ValidationError::required("sale_channel"))?;

        for line in cart.lines() {
            validate_quantity(line.quantity)?;
        }

        let subtotal = cart.subtotal();
        validate_subtotal(subtotal)?;

        let note = normalize_note(request.note.as_deref())?;

        // DiscountRate is clamped to 0..=100% on construction, so this can
        // never exceed the subtotal.
        let discount = subtotal.percentage(request.discount);
        let final_amount = subtotal - discount;

        let customer_id = customer.customer_id;
        let buy_date = now.date();
        let expiry_date = policy.expiry_for(buy_date);
        let credits = cart
            .lines()
            .iter()
            .filter(|line| line.is_course)
            .flat_map(|line| {
                (0..line.quantity).map(move |_| NewCourseCredit {
                    customer_id,
                    product_id: line.product_id,
                    buy_date,
                    expiry_date,
                })
            })
            .collect();

        Ok(CheckoutPlan {
            customer,
            seller,
            sale_date: now,
            lines: cart.lines().to_vec(),
            subtotal,
            discount_rate: request.discount,
            discount,
            final_amount,
            payment_method,
            sale_channel,
            note,
            credits,
        })
    }

    /// The calendar date the bill id is allocated for.
    pub fn commit_date(&self) -> NaiveDate {
        self.sale_date.date()
    }

    /// Number of course credits this checkout mints.
    pub fn credit_count(&self) -> usize {
        self.credits.len()
    }

    /// Builds the receipt for the committed bill from already-computed values.
    pub fn receipt(&self, bill_id: BillId) -> Receipt {
        Receipt {
            bill_id,
            issued_at: self.sale_date,
            customer_name: self.customer.display_name().to_string(),
            seller_name: self.seller.display_name().to_string(),
            lines: self
                .lines
                .iter()
                .map(|line| ReceiptLine {
                    product_name: line.product_name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total: line.line_total(),
                })
                .collect(),
            subtotal: self.subtotal,
            discount_rate: self.discount_rate,
            discount: self.discount,
            final_amount: self.final_amount,
            payment_method: self.payment_method,
            sale_channel: self.sale_channel,
            note: self.note.clone(),
            credits_minted: self.credits.len(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credit::ExpiryCounting;
    use crate::error::CoreError;
    use crate::types::{Package, Product};

    fn knife_skills() -> Product {
        Product {
            product_id: 11,
            product_name: "Knife Skills 101".to_string(),
            category: Some("course".to_string()),
            price: Money::from_baht(1500),
            is_active: true,
        }
    }

    fn customer() -> Customer {
        Customer {
            customer_id: 42,
            full_name: "Somchai Jaidee".to_string(),
            nickname: Some("Chai".to_string()),
            phone: None,
            line_id: None,
            assigned_sales_id: Some(7),
        }
    }

    fn seller() -> Employee {
        Employee {
            emp_id: 7,
            emp_name: "Napat Srisuk".to_string(),
            emp_nickname: None,
            position: Some("Sales".to_string()),
        }
    }

    fn valentine_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest::new(customer(), seller(), PaymentMethod::Cash, SaleChannel::LineOa)
            .with_discount(DiscountRate::from_percent(10))
    }

    #[test]
    fn test_plan_amounts_and_credits() {
        let mut cart = Cart::new();
        cart.add(&knife_skills(), 2, true).unwrap();

        let plan =
            CheckoutPlan::build(&cart, &request(), valentine_noon(), &CreditPolicy::default())
                .unwrap();

        assert_eq!(plan.subtotal, Money::from_baht(3000));
        assert_eq!(plan.discount, Money::from_baht(300));
        assert_eq!(plan.final_amount, Money::from_baht(2700));
        assert_eq!(plan.credit_count(), 2);
        for credit in &plan.credits {
            assert_eq!(credit.customer_id, 42);
            assert_eq!(credit.product_id, 11);
            assert_eq!(credit.buy_date, valentine_noon().date());
            assert_eq!(credit.expiry_date, NaiveDate::from_ymd_opt(2028, 2, 14).unwrap());
        }
    }

    #[test]
    fn test_inclusive_policy_expiry() {
        let mut cart = Cart::new();
        cart.add(&knife_skills(), 1, true).unwrap();
        let policy = CreditPolicy::new(730, ExpiryCounting::Inclusive);

        let plan = CheckoutPlan::build(&cart, &request(), valentine_noon(), &policy).unwrap();
        assert_eq!(
            plan.credits[0].expiry_date,
            NaiveDate::from_ymd_opt(2028, 2, 13).unwrap()
        );
    }

    #[test]
    fn test_non_course_lines_mint_nothing() {
        let mut cart = Cart::new();
        cart.add(&knife_skills(), 3, false).unwrap();

        let plan =
            CheckoutPlan::build(&cart, &request(), valentine_noon(), &CreditPolicy::default())
                .unwrap();
        assert!(plan.credits.is_empty());
    }

    #[test]
    fn test_validation_order() {
        let policy = CreditPolicy::default();
        let empty = Cart::new();
        let err = CheckoutPlan::build(&empty, &request(), valentine_noon(), &policy).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::EmptyCart)));

        let mut cart = Cart::new();
        cart.add(&knife_skills(), 1, true).unwrap();

        let mut no_customer = request();
        no_customer.customer = None;
        let err =
            CheckoutPlan::build(&cart, &no_customer, valentine_noon(), &policy).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: customer is required");

        let mut no_seller = request();
        no_seller.seller = None;
        let err = CheckoutPlan::build(&cart, &no_seller, valentine_noon(), &policy).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: seller is required");

        let mut no_payment = request();
        no_payment.payment_method = None;
        assert!(CheckoutPlan::build(&cart, &no_payment, valentine_noon(), &policy).is_err());

        let mut no_channel = request();
        no_channel.sale_channel = None;
        assert!(CheckoutPlan::build(&cart, &no_channel, valentine_noon(), &policy).is_err());
    }

    #[test]
    fn test_full_discount() {
        let mut cart = Cart::new();
        cart.add(&knife_skills(), 1, true).unwrap();
        let req = request().with_discount(DiscountRate::from_percent(250));

        let plan =
            CheckoutPlan::build(&cart, &req, valentine_noon(), &CreditPolicy::default()).unwrap();
        assert_eq!(plan.discount, plan.subtotal);
        assert_eq!(plan.final_amount, Money::zero());
    }

    #[test]
    fn test_negative_subtotal_is_rejected() {
        let mut cart = Cart::new();
        let giveaway = Package {
            package_id: 1,
            package_name: "Broken".to_string(),
            base_price: Money::zero(),
            discounted_price: Money::from_baht(-100),
            note: None,
        };
        cart.load_package(&giveaway, &[knife_skills()]).unwrap();

        let err = CheckoutPlan::build(&cart, &request(), valentine_noon(), &CreditPolicy::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_receipt_uses_display_names() {
        let mut cart = Cart::new();
        cart.add(&knife_skills(), 2, true).unwrap();
        let plan = CheckoutPlan::build(
            &cart,
            &request().with_note("  gift voucher "),
            valentine_noon(),
            &CreditPolicy::default(),
        )
        .unwrap();

        let bill_id = BillId::first_of_day(plan.commit_date());
        let receipt = plan.receipt(bill_id);

        assert_eq!(receipt.bill_id.to_string(), "B-20260214-0001");
        assert_eq!(receipt.customer_name, "Chai");
        assert_eq!(receipt.seller_name, "Napat Srisuk");
        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(receipt.lines[0].line_total, Money::from_baht(3000));
        assert_eq!(receipt.final_amount, Money::from_baht(2700));
        assert_eq!(receipt.note.as_deref(), Some("gift voucher"));
        assert_eq!(receipt.credits_minted, 2);
    }
}
