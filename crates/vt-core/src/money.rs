//! # Money Module
//!
//! Provides the `Money` type for handling peso amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    (1000 + 210) × 0.16 = 193.60000000000002                             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    121000 cents × 1600 bps = 19360 cents, rounded exactly once          │
//! │                                                                         │
//! │  Subtotal, delivery, IVA, total and deposit are all summed in cents    │
//! │  and rounded once per displayed figure.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vt_core::money::Money;
//!
//! let unit = Money::from_cents(800); // $8.00
//! let line = unit.multiply_quantity(50);
//! assert_eq!(line.to_string(), "$400.00");
//! assert_eq!(line.with_currency(), "$400.00 MXN");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

use crate::types::TaxRate;
use crate::CURRENCY_CODE;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos (1/100 MXN).
///
/// ## Where Money is Used
/// ```text
/// TierRule.price ──► LineItem.unit_price ──► LineItem.line_total
///                                                   │
///                                                   ▼
///          OrderTotals.subtotal + delivery ──► IVA ──► grand_total ──► deposit
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ```rust
    /// use vt_core::money::Money;
    ///
    /// let fee = Money::from_cents(21000); // $210.00
    /// assert_eq!(fee.pesos(), 210);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole pesos.
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos * 100)
    }

    /// Converts a decimal peso amount (as written in a price table) to cents.
    ///
    /// Returns `None` for negative, NaN or infinite input. This is the only
    /// place a float enters the engine, and it happens once at load time.
    ///
    /// ```rust
    /// use vt_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(6.5), Some(Money::from_cents(650)));
    /// assert_eq!(Money::from_decimal(-1.0), None);
    /// ```
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        Some(Money((value * 100.0).round() as i64))
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-peso portion.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns the amount as decimal pesos (for serialization only).
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Calculates tax on this amount, rounding half up to the centavo.
    ///
    /// ## Example
    /// ```rust
    /// use vt_core::money::Money;
    /// use vt_core::types::TaxRate;
    ///
    /// // IVA 16% on $1,210.00
    /// let base = Money::from_cents(121000);
    /// assert_eq!(base.calculate_tax(TaxRate::from_bps(1600)).cents(), 19360);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.portion_bps(rate.bps())
    }

    /// Returns the given fraction (in basis points) of this amount, rounded
    /// half up to the centavo.
    ///
    /// ```rust
    /// use vt_core::money::Money;
    ///
    /// // 50% deposit of $1,403.61 → $701.81 (701.805 rounds up)
    /// assert_eq!(Money::from_cents(140361).portion_bps(5000).cents(), 70181);
    /// ```
    pub fn portion_bps(&self, bps: u32) -> Money {
        // i128 keeps large order totals from overflowing
        let cents = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money(cents as i64)
    }

    /// Multiplies a unit price by a quantity, saturating at the `i64` range.
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Formats with the trailing currency marker, e.g. `"$610.00 MXN"`.
    pub fn with_currency(&self) -> String {
        format!("{} {}", self, CURRENCY_CODE)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Two-decimal display without thousands separators, e.g. `"$1403.60"`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.pesos().abs(), self.cents_part())
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Decimal (de)serialization
// =============================================================================

/// Serde adapter for prices written as decimal pesos in configuration.
///
/// Accepts `8`, `6.5` or `"6.50"` and stores integer cents. Negative or
/// non-numeric prices are rejected at parse time.
pub mod decimal {
    use super::Money;
    use serde::de::{self, Deserializer, Unexpected, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(money.as_decimal())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }

    struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = Money;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative decimal price")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
            Ok(Money::from_cents(v as i64 * 100))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
            if v < 0 {
                return Err(E::invalid_value(Unexpected::Signed(v), &self));
            }
            Ok(Money::from_cents(v * 100))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
            Money::from_decimal(v).ok_or_else(|| E::invalid_value(Unexpected::Float(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
            let parsed: f64 = v
                .trim()
                .parse()
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))?;
            self.visit_f64(parsed)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(140360);
        assert_eq!(money.cents(), 140360);
        assert_eq!(money.pesos(), 1403);
        assert_eq!(money.cents_part(), 60);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(61000).to_string(), "$610.00");
        assert_eq!(Money::from_cents(140360).to_string(), "$1403.60");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::zero().to_string(), "$0.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
    }

    #[test]
    fn test_with_currency() {
        assert_eq!(Money::from_pesos(210).with_currency(), "$210.00 MXN");
    }

    #[test]
    fn test_iva_rounding() {
        // $1,210.00 × 16% = $193.60 exactly
        let base = Money::from_cents(121000);
        assert_eq!(base.calculate_tax(TaxRate::from_bps(1600)).cents(), 19360);

        // $0.03 × 16% = 0.48 centavos → rounds to 0
        assert_eq!(Money::from_cents(3).calculate_tax(TaxRate::from_bps(1600)).cents(), 0);

        // $0.04 × 16% = 0.64 centavos → rounds to 1
        assert_eq!(Money::from_cents(4).calculate_tax(TaxRate::from_bps(1600)).cents(), 1);
    }

    #[test]
    fn test_half_deposit_rounds_half_up() {
        assert_eq!(Money::from_cents(140360).portion_bps(5000).cents(), 70180);
        assert_eq!(Money::from_cents(1).portion_bps(5000).cents(), 1);
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(Money::from_decimal(8.0), Some(Money::from_cents(800)));
        assert_eq!(Money::from_decimal(0.1 + 0.2), Some(Money::from_cents(30)));
        assert_eq!(Money::from_decimal(f64::NAN), None);
        assert_eq!(Money::from_decimal(-0.01), None);
    }

    #[test]
    fn test_sum() {
        let items = [Money::from_cents(40000), Money::from_cents(60000)];
        let total: Money = items.iter().sum();
        assert_eq!(total.cents(), 100000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let unit = Money::from_cents(i64::MAX / 2);
        assert_eq!(unit.multiply_quantity(u32::MAX).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MAX) + Money::from_cents(1)).cents(), i64::MAX);
        assert_eq!(Money::from_cents(800).multiply_quantity(50).cents(), 40000);
    }

    #[test]
    fn test_decimal_adapter() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(with = "decimal")]
            price: Money,
        }

        let row: Row = serde_json::from_str(r#"{"price": 6.5}"#).unwrap();
        assert_eq!(row.price.cents(), 650);

        let row: Row = serde_json::from_str(r#"{"price": 8}"#).unwrap();
        assert_eq!(row.price.cents(), 800);

        let row: Row = serde_json::from_str(r#"{"price": "12.25"}"#).unwrap();
        assert_eq!(row.price.cents(), 1225);

        assert!(serde_json::from_str::<Row>(r#"{"price": -3}"#).is_err());
        assert!(serde_json::from_str::<Row>(r#"{"price": "abc"}"#).is_err());
    }
}
