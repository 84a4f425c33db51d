//! # Domain Types
//!
//! Core domain types shared by the cart, the checkout and the database layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog (read-only to checkout)      Sale records (written once)       │
//! │  ─────────────────────────────       ─────────────────────────────      │
//! │  Product   (id, name, price)          Bill          (B-YYYYMMDD-NNNN)   │
//! │  Package   (bundle price)             BillItem      (snapshot line)     │
//! │  Customer  / Employee                 SalesHistoryEntry (legacy mirror) │
//! │                                       CourseCredit  (see credit.rs)     │
//! │                                       RefundRequest (never edits Bill)  │
//! │                                                                         │
//! │  Closed enums: PaymentMethod, SaleChannel, RefundStatus                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::bill_id::BillId;
use crate::error::ValidationError;
use crate::money::Money;

/// Catalog product identifier.
pub type ProductId = i64;
/// Customer identifier.
pub type CustomerId = i64;
/// Employee (seller) identifier.
pub type EmployeeId = i64;
/// Package identifier.
pub type PackageId = i64;

// =============================================================================
// Catalog
// =============================================================================

/// A product (usually a course) available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub product_id: ProductId,
    /// Display name shown to staff and on receipts.
    pub product_name: String,
    pub category: Option<String>,
    /// Current catalog price.
    pub price: Money,
    /// Soft delete flag.
    pub is_active: bool,
}

/// A catalog-defined bundle of products sold at a combined price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Package {
    pub package_id: PackageId,
    pub package_name: String,
    /// Informational list price.
    pub base_price: Money,
    /// What the customer actually pays for the bundle.
    pub discounted_price: Money,
    pub note: Option<String>,
}

/// A customer record (only the fields the checkout needs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub full_name: String,
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub line_id: Option<String>,
    /// Employee who owns this customer relationship.
    pub assigned_sales_id: Option<EmployeeId>,
}

impl Customer {
    /// Name for receipts: the nickname when set, otherwise the full name.
    pub fn display_name(&self) -> &str {
        non_blank(self.nickname.as_deref()).unwrap_or(&self.full_name)
    }
}

/// A staff member who can close a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Employee {
    pub emp_id: EmployeeId,
    pub emp_name: String,
    pub emp_nickname: Option<String>,
    pub position: Option<String>,
}

impl Employee {
    /// Name for receipts: the nickname when set, otherwise the full name.
    pub fn display_name(&self) -> &str {
        non_blank(self.emp_nickname.as_deref()).unwrap_or(&self.emp_name)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Cash,
}

impl PaymentMethod {
    /// All accepted methods, in menu order.
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::BankTransfer, PaymentMethod::Cash];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "Bank transfer",
            PaymentMethod::Cash => "Cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    /// Accepts the stored form, the label, and the Thai labels used at the
    /// counter ("โอนเงิน", "เงินสด").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bank_transfer" | "bank transfer" | "transfer" | "โอนเงิน" => {
                Ok(PaymentMethod::BankTransfer)
            }
            "cash" | "เงินสด" => Ok(PaymentMethod::Cash),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.label().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Sale Channel
// =============================================================================

/// The marketing source a sale is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleChannel {
    FacebookAds,
    LineOa,
    Instagram,
    Tiktok,
    Website,
    WalkIn,
    Referral,
    Other,
}

impl SaleChannel {
    /// All channels, in menu order.
    pub const ALL: [SaleChannel; 8] = [
        SaleChannel::FacebookAds,
        SaleChannel::LineOa,
        SaleChannel::Instagram,
        SaleChannel::Tiktok,
        SaleChannel::Website,
        SaleChannel::WalkIn,
        SaleChannel::Referral,
        SaleChannel::Other,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SaleChannel::FacebookAds => "Facebook Ads",
            SaleChannel::LineOa => "Line OA",
            SaleChannel::Instagram => "Instagram",
            SaleChannel::Tiktok => "TikTok",
            SaleChannel::Website => "Website",
            SaleChannel::WalkIn => "Walk-in",
            SaleChannel::Referral => "Referral",
            SaleChannel::Other => "Other",
        }
    }
}

impl fmt::Display for SaleChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SaleChannel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['_', '-'], " ");
        SaleChannel::ALL
            .into_iter()
            .find(|c| c.label().to_lowercase().replace('-', " ") == wanted)
            .or(match wanted.as_str() {
                "facebook" | "fb" => Some(SaleChannel::FacebookAds),
                "line" => Some(SaleChannel::LineOa),
                "onsite" | "ออนไซต์" => Some(SaleChannel::WalkIn),
                "online" | "ออนไลน์" => Some(SaleChannel::Website),
                _ => None,
            })
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "sale_channel".to_string(),
                allowed: SaleChannel::ALL.iter().map(|c| c.label().to_string()).collect(),
            })
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A persisted bill header. Immutable once written.
///
/// ## Invariants
/// - `final_amount == total_amount - discount`
/// - `0 <= discount <= total_amount`
/// - `total_amount == Σ items.subtotal`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Bill {
    #[ts(as = "String")]
    pub bill_id: BillId,
    pub customer_id: CustomerId,
    pub seller_id: EmployeeId,
    /// Pre-discount subtotal.
    pub total_amount: Money,
    pub discount: Money,
    pub final_amount: Money,
    pub payment_method: PaymentMethod,
    pub sale_channel: SaleChannel,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub sale_date: NaiveDateTime,
}

/// One line of a bill. Uses the snapshot pattern: name and price are frozen
/// at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BillItem {
    pub item_id: i64,
    #[ts(as = "String")]
    pub bill_id: BillId,
    pub product_id: ProductId,
    pub product_name: String,
    pub qty: i64,
    pub unit_price: Money,
    /// `qty × unit_price`.
    pub subtotal: Money,
}

/// A row of the pre-bill `sales_history` table, kept for old reports.
///
/// Written alongside every bill item; never read by the checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesHistoryEntry {
    pub sale_id: i64,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub sale_channel: SaleChannel,
    pub sale_note: Option<String>,
    pub closed_by_emp_id: EmployeeId,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
}

/// Aggregates over a date range of bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub bill_count: i64,
    pub gross: Money,
    pub discounts: Money,
    pub net: Money,
}

// =============================================================================
// Refund Requests
// =============================================================================

/// Refund workflow state. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RefundStatus {
    /// Checks if no further decision can be made.
    pub fn is_final(&self) -> bool {
        !matches!(self, RefundStatus::Pending)
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefundStatus::Pending => write!(f, "pending"),
            RefundStatus::Approved => write!(f, "approved"),
            RefundStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A request to refund a bill. The bill itself is never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RefundRequest {
    pub request_id: i64,
    #[ts(as = "String")]
    pub bill_id: BillId,
    pub reason: String,
    pub status: RefundStatus,
    #[ts(as = "String")]
    pub requested_at: NaiveDateTime,
    #[ts(as = "Option<String>")]
    pub decided_at: Option<NaiveDateTime>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(nickname: Option<&str>) -> Customer {
        Customer {
            customer_id: 42,
            full_name: "Somchai Jaidee".to_string(),
            nickname: nickname.map(str::to_string),
            phone: None,
            line_id: None,
            assigned_sales_id: None,
        }
    }

    #[test]
    fn test_display_name_prefers_nickname() {
        assert_eq!(customer(Some("Chai")).display_name(), "Chai");
        assert_eq!(customer(Some("  ")).display_name(), "Somchai Jaidee");
        assert_eq!(customer(None).display_name(), "Somchai Jaidee");

        let seller = Employee {
            emp_id: 7,
            emp_name: "Napat Srisuk".to_string(),
            emp_nickname: Some("Nan".to_string()),
            position: Some("Sales".to_string()),
        };
        assert_eq!(seller.display_name(), "Nan");
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("เงินสด".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!(
            "Bank transfer".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::BankTransfer
        );
        assert_eq!("โอนเงิน".parse::<PaymentMethod>().unwrap(), PaymentMethod::BankTransfer);
        assert!("credit card".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_sale_channel_parsing() {
        assert_eq!("Line OA".parse::<SaleChannel>().unwrap(), SaleChannel::LineOa);
        assert_eq!("line_oa".parse::<SaleChannel>().unwrap(), SaleChannel::LineOa);
        assert_eq!("Facebook Ads".parse::<SaleChannel>().unwrap(), SaleChannel::FacebookAds);
        assert_eq!("walk-in".parse::<SaleChannel>().unwrap(), SaleChannel::WalkIn);
        assert_eq!("ออนไซต์".parse::<SaleChannel>().unwrap(), SaleChannel::WalkIn);
        assert!("carrier pigeon".parse::<SaleChannel>().is_err());
    }

    #[test]
    fn test_labels_round_trip() {
        for channel in SaleChannel::ALL {
            assert_eq!(channel.label().parse::<SaleChannel>().unwrap(), channel);
        }
        for method in PaymentMethod::ALL {
            assert_eq!(method.label().parse::<PaymentMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_refund_status() {
        assert_eq!(RefundStatus::default(), RefundStatus::Pending);
        assert!(!RefundStatus::Pending.is_final());
        assert!(RefundStatus::Approved.is_final());
        assert!(RefundStatus::Rejected.is_final());
    }
}
