//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Integer Minor Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    65000 × 0.11 = 7150.000000000001                                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    65000 × 1100 bps / 10000 = 7150 exactly                              │
//! │    Rounding happens once, at the tax step, and nowhere else             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store trades in Rupiah, whose smallest circulating unit is the rupiah
//! itself, so one minor unit is one rupiah.
//!
//! ## Usage
//! ```rust
//! use kasir_core::money::Money;
//!
//! let price = Money::from_minor(65_000);
//! let doubled = price * 2;
//! assert_eq!(doubled.minor(), 130_000);
//! assert_eq!(price.to_string(), "Rp65.000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: net profit can go negative after large expense imports
/// - **Single field tuple struct**: serializes as a bare number
/// - **Saturating arithmetic**: sums clamp at the `i64` bounds instead of
///   panicking or wrapping. Inputs are bounded by [`crate::MAX_MONEY`] well
///   before that.
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► CartLine.unit_price ──► Cart.subtotal                │
/// │                                               │                         │
/// │                                               ├──► tax (11%)           │
/// │                                               ▼                         │
/// │                                           Cart.total ──► cash / change  │
/// │                                                                         │
/// │  StagedRecord.total_amount ──► ExpenseEntry.amount ──► Summary.expenses │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(38_000).minor(), 38_000);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Converts a parsed decimal amount (CSV cell, OCR total) into Money.
    ///
    /// Rounds half away from zero. Returns `None` for NaN, infinities and
    /// values outside the `i64` range.
    ///
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(65000.4), Some(Money::from_minor(65_000)));
    /// assert_eq!(Money::from_decimal(12.5), Some(Money::from_minor(13)));
    /// assert_eq!(Money::from_decimal(f64::NAN), None);
    /// ```
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let rounded = value.round();
        if rounded >= i64::MAX as f64 || rounded <= i64::MIN as f64 {
            return None;
        }
        Some(Money(rounded as i64))
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount.
    ///
    /// Integer math with half-up rounding: `(amount × bps + 5000) / 10000`.
    /// `i128` intermediates keep large carts from overflowing.
    ///
    /// ```rust
    /// use kasir_core::money::Money;
    /// use kasir_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_minor(65_000);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(1100));
    /// assert_eq!(tax.minor(), 7_150);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(tax as i64)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns `self - other`, floored at zero.
    ///
    /// Used for cash change once the payment gate has already guaranteed
    /// `self >= other`.
    #[inline]
    pub fn saturating_sub_floor(&self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    /// Returns the value as f64 for display and ratio calculations only.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Rupiah display with dot thousands separators: `Rp1.234.500`.
///
/// For logs and tests. The front end formats with the user's locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        write!(f, "{}Rp{}", sign, grouped)
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
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
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_minor(0).to_string(), "Rp0");
        assert_eq!(Money::from_minor(999).to_string(), "Rp999");
        assert_eq!(Money::from_minor(65_000).to_string(), "Rp65.000");
        assert_eq!(Money::from_minor(2_000_000).to_string(), "Rp2.000.000");
        assert_eq!(Money::from_minor(-5_500).to_string(), "-Rp5.500");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(10_000);
        let b = Money::from_minor(2_500);

        assert_eq!((a + b).minor(), 12_500);
        assert_eq!((a - b).minor(), 7_500);
        assert_eq!((a * 3).minor(), 30_000);
        assert_eq!((-b).minor(), -2_500);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_minor(100), Money::from_minor(250), Money::from_minor(50)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.minor(), 400);
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Money::from_minor(5_000_000_000_000_000_000);

        assert_eq!((huge + huge).minor(), i64::MAX);
        assert_eq!((-huge - huge).minor(), i64::MIN);
        assert_eq!((huge * 3).minor(), i64::MAX);

        let mut expenses = huge;
        expenses += huge;
        assert_eq!(expenses.minor(), i64::MAX);

        let mut net = Money::zero();
        net -= huge;
        net -= huge;
        assert_eq!(net.minor(), i64::MIN);
        assert_eq!((-net).minor(), i64::MAX);
    }

    #[test]
    fn test_tax_eleven_percent() {
        let rate = TaxRate::from_bps(1100);
        assert_eq!(Money::from_minor(100_000).calculate_tax(rate).minor(), 11_000);
        // 3500 × 0.11 = 385 exactly
        assert_eq!(Money::from_minor(3_500).calculate_tax(rate).minor(), 385);
        // 4 × 0.11 = 0.44 → 0; 5 × 0.11 = 0.55 → 1
        assert_eq!(Money::from_minor(4).calculate_tax(rate).minor(), 0);
        assert_eq!(Money::from_minor(5).calculate_tax(rate).minor(), 1);
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(Money::from_decimal(0.0), Some(Money::zero()));
        assert_eq!(Money::from_decimal(-5.0), Some(Money::from_minor(-5)));
        assert_eq!(Money::from_decimal(f64::INFINITY), None);
        assert_eq!(Money::from_decimal(1e300), None);
    }

    #[test]
    fn test_saturating_sub_floor() {
        let cash = Money::from_minor(100_000);
        let total = Money::from_minor(72_150);
        assert_eq!(cash.saturating_sub_floor(total).minor(), 27_850);
        assert_eq!(total.saturating_sub_floor(cash), Money::zero());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_negative());
        assert!(Money::from_minor(-1).is_negative());
    }
}
