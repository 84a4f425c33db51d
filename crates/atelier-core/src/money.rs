//! # Money Module
//!
//! Provides the `Money` type for handling baht amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A bill is only correct when                                            │
//! │    final_amount == total_amount - discount                              │
//! │  holds EXACTLY, and Σ bill_items.subtotal == total_amount holds         │
//! │  EXACTLY. Floats cannot promise either.                                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Satang (1 baht = 100 satang)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use atelier_core::money::{DiscountRate, Money};
//!
//! let price = Money::from_baht(1500);
//! let line = price * 2;
//! assert_eq!(line, Money::from_baht(3000));
//!
//! let discount = line.percentage(DiscountRate::from_percent(10));
//! assert_eq!(discount, Money::from_baht(300));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in satang (1/100 baht).
///
/// Signed, because package adjustment lines carry negative prices.
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► CartLine.unit_price ──► CartLine.line_total
///                                                 │
///                      Cart.subtotal ◄────────────┘
///                           │
///                           ├──► Bill.total_amount
///                           ├──► Bill.discount   (percentage of total)
///                           └──► Bill.final_amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from satang (the smallest currency unit).
    ///
    /// ```rust
    /// use atelier_core::money::Money;
    ///
    /// let price = Money::from_satang(150_050); // ฿1,500.50
    /// assert_eq!(price.satang(), 150_050);
    /// ```
    #[inline]
    pub const fn from_satang(satang: i64) -> Self {
        Money(satang)
    }

    /// Creates a Money value from whole baht.
    #[inline]
    pub const fn from_baht(baht: i64) -> Self {
        Money(baht * 100)
    }

    /// Returns the value in satang.
    #[inline]
    pub const fn satang(&self) -> i64 {
        self.0
    }

    /// Returns the whole-baht portion (truncated toward zero).
    #[inline]
    pub const fn baht(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the satang portion (always 0-99).
    #[inline]
    pub const fn satang_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use atelier_core::money::Money;
    ///
    /// let unit_price = Money::from_baht(1500);
    /// assert_eq!(unit_price.multiply_quantity(3), Money::from_baht(4500));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `rate` percent of this amount, rounded half up to the satang.
    ///
    /// ## Implementation
    /// Integer math over basis points: `(amount * bps + 5000) / 10000`.
    /// Only meaningful for non-negative amounts, which is the only way the
    /// checkout calls it (discounts are taken on a non-negative subtotal).
    ///
    /// ```rust
    /// use atelier_core::money::{DiscountRate, Money};
    ///
    /// // ฿999.99 at 12.5% = ฿124.99875 → ฿125.00
    /// let amount = Money::from_satang(99_999);
    /// let cut = amount.percentage(DiscountRate::from_bps(1250));
    /// assert_eq!(cut.satang(), 12_500);
    /// ```
    pub fn percentage(&self, rate: DiscountRate) -> Money {
        let part = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_satang(part as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as baht, e.g. `฿1500.00` or `-฿2000.00`.
///
/// Debug/log formatting only; the admin UI localizes its own display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}฿{}.{:02}", sign, self.baht().abs(), self.satang_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A bill-level discount percentage in basis points (1000 = 10%).
///
/// Always within 0%..=100%: every constructor clamps, so a `DiscountRate`
/// can never produce a discount larger than the amount it is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// 100% in basis points.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a rate from basis points, clamped to 100%.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > Self::MAX_BPS {
            DiscountRate(Self::MAX_BPS)
        } else {
            DiscountRate(bps)
        }
    }

    /// Creates a rate from a whole percentage, clamped to 0..=100.
    pub fn from_percent(pct: i64) -> Self {
        let clamped = pct.clamp(0, 100) as u32;
        DiscountRate(clamped * 100)
    }

    /// Creates a rate from a fractional percentage as typed into a form.
    ///
    /// NaN and negative values become 0%, values above 100 become 100%.
    pub fn from_percentage(pct: f64) -> Self {
        if pct.is_nan() || pct <= 0.0 {
            return DiscountRate(0);
        }
        let bps = (pct * 100.0).round().min(Self::MAX_BPS as f64);
        DiscountRate(bps as u32)
    }

    /// No discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_baht_and_satang() {
        let money = Money::from_baht(1500);
        assert_eq!(money.satang(), 150_000);
        assert_eq!(money.baht(), 1500);
        assert_eq!(money.satang_part(), 0);

        let odd = Money::from_satang(1099);
        assert_eq!(odd.baht(), 10);
        assert_eq!(odd.satang_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_baht(1500).to_string(), "฿1500.00");
        assert_eq!(Money::from_satang(1099).to_string(), "฿10.99");
        assert_eq!(Money::from_baht(-2000).to_string(), "-฿2000.00");
        assert_eq!(Money::zero().to_string(), "฿0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_baht(10);
        let b = Money::from_baht(4);

        assert_eq!(a + b, Money::from_baht(14));
        assert_eq!(a - b, Money::from_baht(6));
        assert_eq!(a * 3, Money::from_baht(30));
        assert_eq!(-b, Money::from_baht(-4));
    }

    #[test]
    fn test_sum_keeps_negative_lines() {
        let lines = [
            Money::from_baht(4000),
            Money::from_baht(6000),
            Money::from_baht(-2000),
        ];
        let total: Money = lines.iter().sum();
        assert_eq!(total, Money::from_baht(8000));
    }

    #[test]
    fn test_percentage_exact() {
        let subtotal = Money::from_baht(3000);
        let discount = subtotal.percentage(DiscountRate::from_percent(10));
        assert_eq!(discount, Money::from_baht(300));
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // ฿0.05 at 50% = 2.5 satang → 3 satang
        let amount = Money::from_satang(5);
        assert_eq!(amount.percentage(DiscountRate::from_percent(50)).satang(), 3);

        // ฿0.33 at 33% = 10.89 satang → 11 satang
        let amount = Money::from_satang(33);
        assert_eq!(amount.percentage(DiscountRate::from_percent(33)).satang(), 11);
    }

    #[test]
    fn test_full_discount_never_exceeds_amount() {
        let amount = Money::from_satang(123_457);
        let discount = amount.percentage(DiscountRate::from_percent(100));
        assert_eq!(discount, amount);
    }

    #[test]
    fn test_discount_rate_clamping() {
        assert_eq!(DiscountRate::from_percent(-5).bps(), 0);
        assert_eq!(DiscountRate::from_percent(150).bps(), 10_000);
        assert_eq!(DiscountRate::from_bps(20_000).bps(), 10_000);
        assert_eq!(DiscountRate::from_percentage(12.5).bps(), 1250);
        assert_eq!(DiscountRate::from_percentage(f64::NAN).bps(), 0);
        assert_eq!(DiscountRate::from_percentage(250.0).bps(), 10_000);
        assert!((DiscountRate::from_bps(1250).percent() - 12.5).abs() < f64::EPSILON);
    }
}
