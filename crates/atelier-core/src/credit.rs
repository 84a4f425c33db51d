//! # Course Credits
//!
//! A course credit is the right to attend one session of a course. Buying
//! `n` seats of a course mints `n` credits; attending consumes one.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Course Credit State Machine                         │
//! │                                                                         │
//! │     checkout commit                                                     │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   ┌─────────────┐    check_in()     ┌─────────────┐                     │
//! │   │  Available  │ ────────────────► │    Used     │  (terminal)         │
//! │   └─────────────┘                   └─────────────┘                     │
//! │                                                                         │
//! │   Expiry is informational: an expired credit is still Available and    │
//! │   can still be checked in. Reports filter on expiry_date instead.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::bill_id::BillId;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{CustomerId, ProductId};

/// Default validity window of a freshly minted credit.
pub const DEFAULT_VALIDITY_DAYS: u32 = 730;

// =============================================================================
// Status
// =============================================================================

/// Where a credit is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CreditStatus {
    #[default]
    Available,
    Used,
}

impl CreditStatus {
    /// The only transition: `Available → Used`.
    ///
    /// ## Errors
    /// `CoreError::InvalidTransition` when the credit is already used.
    pub fn check_in(self) -> CoreResult<CreditStatus> {
        match self {
            CreditStatus::Available => Ok(CreditStatus::Used),
            CreditStatus::Used => Err(CoreError::InvalidTransition {
                entity: "course credit".to_string(),
                from: self.to_string(),
                to: CreditStatus::Used.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CreditStatus::Available => "available",
            CreditStatus::Used => "used",
        }
    }
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Expiry Policy
// =============================================================================

/// How the validity window is counted from the purchase date.
///
/// ```text
///   buy = 2026-02-14, validity = 730 days
///
///   Exclusive:  expiry = buy + 730      = 2028-02-14
///   Inclusive:  expiry = buy + 730 - 1  = 2028-02-13   (buy day is day 1)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ExpiryCounting {
    #[default]
    Exclusive,
    Inclusive,
}

impl FromStr for ExpiryCounting {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclusive" => Ok(ExpiryCounting::Exclusive),
            "inclusive" => Ok(ExpiryCounting::Inclusive),
            _ => Err(ValidationError::NotAllowed {
                field: "expiry_counting".to_string(),
                allowed: vec!["exclusive".to_string(), "inclusive".to_string()],
            }),
        }
    }
}

/// Rules for minting credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditPolicy {
    pub validity_days: u32,
    pub counting: ExpiryCounting,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        CreditPolicy {
            validity_days: DEFAULT_VALIDITY_DAYS,
            counting: ExpiryCounting::default(),
        }
    }
}

impl CreditPolicy {
    pub fn new(validity_days: u32, counting: ExpiryCounting) -> Self {
        CreditPolicy {
            validity_days,
            counting,
        }
    }

    /// Expiry date for a credit bought on `buy_date`.
    ///
    /// A zero-day inclusive window collapses to the purchase date itself.
    /// Dates past `NaiveDate::MAX` saturate.
    pub fn expiry_for(&self, buy_date: NaiveDate) -> NaiveDate {
        let days = match self.counting {
            ExpiryCounting::Exclusive => self.validity_days,
            ExpiryCounting::Inclusive => self.validity_days.saturating_sub(1),
        };
        buy_date
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX)
    }
}

// =============================================================================
// Records
// =============================================================================

/// A stored course credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CourseCredit {
    pub credit_id: i64,
    pub customer_id: CustomerId,
    #[ts(as = "String")]
    pub bill_id: BillId,
    pub product_id: ProductId,
    #[ts(as = "String")]
    pub buy_date: NaiveDate,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
    pub status: CreditStatus,
}

impl CourseCredit {
    /// True once `today` is past the expiry date.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today > self.expiry_date
    }

    /// Available and not expired on `today`.
    pub fn is_usable(&self, today: NaiveDate) -> bool {
        self.status == CreditStatus::Available && !self.is_expired(today)
    }
}

/// A credit about to be written by the checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourseCredit {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub buy_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Result of a check-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CheckInOutcome {
    /// The credit moved from Available to Used.
    CheckedIn,
    /// The credit was already Used; nothing changed.
    AlreadyUsed,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_check_in_transition() {
        assert_eq!(CreditStatus::Available.check_in().unwrap(), CreditStatus::Used);
        assert!(matches!(
            CreditStatus::Used.check_in(),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_exclusive_expiry() {
        let policy = CreditPolicy::default();
        assert_eq!(policy.expiry_for(date(2026, 2, 14)), date(2028, 2, 14));
    }

    #[test]
    fn test_inclusive_expiry() {
        let policy = CreditPolicy::new(730, ExpiryCounting::Inclusive);
        assert_eq!(policy.expiry_for(date(2026, 2, 14)), date(2028, 2, 13));
    }

    #[test]
    fn test_zero_day_inclusive_window() {
        let policy = CreditPolicy::new(0, ExpiryCounting::Inclusive);
        assert_eq!(policy.expiry_for(date(2026, 2, 14)), date(2026, 2, 14));
    }

    #[test]
    fn test_expiry_counting_from_str() {
        assert_eq!("Inclusive".parse::<ExpiryCounting>().unwrap(), ExpiryCounting::Inclusive);
        assert_eq!(" exclusive ".parse::<ExpiryCounting>().unwrap(), ExpiryCounting::Exclusive);
        assert!("sometimes".parse::<ExpiryCounting>().is_err());
    }

    #[test]
    fn test_expired_credit_is_still_available() {
        let credit = CourseCredit {
            credit_id: 1,
            customer_id: 7,
            bill_id: "B-20240101-0001".parse().unwrap(),
            product_id: 3,
            buy_date: date(2024, 1, 1),
            expiry_date: date(2025, 12, 31),
            status: CreditStatus::Available,
        };
        assert!(credit.is_expired(date(2026, 1, 1)));
        assert!(!credit.is_usable(date(2026, 1, 1)));
        assert!(credit.is_usable(date(2025, 12, 31)));
        assert_eq!(credit.status.check_in().unwrap(), CreditStatus::Used);
    }
}
