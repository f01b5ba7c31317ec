//! # Money Module
//!
//! Provides the `Money` type for Bangladeshi taka amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  WooCommerce reports totals as decimal strings: "1250.50"              │
//! │  Summing hundreds of those as f64 drifts:                               │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Poisha (1 taka = 100 poisha)                     │
//! │    "1250.50" ──parse_decimal──► Money(125050)                           │
//! │    Revenue, expenses and profit are exact sums of i64                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Every remote collaborator (WooCommerce, the settings store, the courier
//! proxies) speaks plain JSON numbers in taka. `Money` serializes as a taka
//! number (`1250.5`) and deserializes from either a number or a decimal
//! string, so stored records round-trip unchanged.
//!
//! ## Usage
//! ```rust
//! use dokan_core::money::Money;
//!
//! let total = Money::parse_decimal("1250.50");
//! assert_eq!(total.poisha(), 125050);
//! assert_eq!(total.to_string(), "৳1,250.50");
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in poisha (1/100 taka).
///
/// ## Where Money Flows
/// ```text
/// WooCommerce "total" ──► Order.total ──┬──► DashboardStats.total_revenue
///                                       │
/// Expense.amount ───────────────────────┴──► DashboardStats.net_profit
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from poisha.
    #[inline]
    pub const fn from_poisha(poisha: i64) -> Self {
        Money(poisha)
    }

    /// Creates a Money value from whole taka.
    ///
    /// ## Example
    /// ```rust
    /// use dokan_core::money::Money;
    ///
    /// assert_eq!(Money::from_taka(350).poisha(), 35000);
    /// ```
    #[inline]
    pub const fn from_taka(taka: i64) -> Self {
        Money(taka.saturating_mul(100))
    }

    /// Whole taka to poisha, `None` when the result does not fit.
    pub const fn checked_from_taka(taka: i64) -> Option<Self> {
        match taka.checked_mul(100) {
            Some(poisha) => Some(Money(poisha)),
            None => None,
        }
    }

    /// Converts a float taka amount, rounding to the nearest poisha.
    ///
    /// Only used at the JSON boundary where the remote side sends numbers.
    pub fn from_taka_f64(taka: f64) -> Self {
        if !taka.is_finite() {
            return Money::zero();
        }
        Money((taka * 100.0).round() as i64)
    }

    /// Parses a decimal string as WooCommerce reports it (`"1250.50"`).
    ///
    /// ## Rules
    /// - Leading/trailing whitespace is ignored
    /// - An optional leading `-` or `+` sign is honoured
    /// - More than two fraction digits are rounded half-up on the third
    /// - Empty or malformed input yields zero, the same fallback WooCommerce
    ///   clients use for missing totals
    ///
    /// ## Example
    /// ```rust
    /// use dokan_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("99.5").poisha(), 9950);
    /// assert_eq!(Money::parse_decimal("0.125").poisha(), 13);
    /// assert_eq!(Money::parse_decimal("").poisha(), 0);
    /// assert_eq!(Money::parse_decimal("abc").poisha(), 0);
    /// ```
    pub fn parse_decimal(input: &str) -> Self {
        Self::try_parse_decimal(input).unwrap_or_default()
    }

    /// Strict variant of [`Money::parse_decimal`]: `None` on malformed input.
    pub fn try_parse_decimal(input: &str) -> Option<Self> {
        let s = input.trim();
        let (negative, digits) = match s.as_bytes().first()? {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut frac_digits = fraction.bytes().map(|b| (b - b'0') as i64);
        let tens = frac_digits.next().unwrap_or(0);
        let ones = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().map(|d| d >= 5).unwrap_or(false);

        let mut poisha = whole.checked_mul(100)? + tens * 10 + ones;
        if round_up {
            poisha += 1;
        }
        Some(Money(if negative { -poisha } else { poisha }))
    }

    /// Returns the value in poisha.
    #[inline]
    pub const fn poisha(&self) -> i64 {
        self.0
    }

    /// Returns the whole taka portion (truncated toward zero).
    #[inline]
    pub const fn taka(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the poisha portion (always 0-99).
    #[inline]
    pub const fn poisha_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the amount as float taka, for JSON output only.
    #[inline]
    pub fn as_taka_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero taka.
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

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns a share of this amount expressed in basis points.
    ///
    /// 4500 bps = 45%. Rounds half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use dokan_core::money::Money;
    ///
    /// let revenue = Money::from_taka(1000);
    /// assert_eq!(revenue.percent_bps(4500), Money::from_taka(450));
    /// ```
    pub fn percent_bps(&self, bps: u32) -> Money {
        let scaled = self.0 as i128 * bps as i128;
        let rounded = if scaled >= 0 {
            (scaled + 5000) / 10000
        } else {
            (scaled - 5000) / 10000
        };
        Money(rounded as i64)
    }

    /// Rounds to a whole taka (half away from zero) and returns the taka count.
    ///
    /// Courier partners only accept whole-taka collect amounts.
    ///
    /// ## Example
    /// ```rust
    /// use dokan_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("1249.50").round_to_taka(), 1250);
    /// assert_eq!(Money::parse_decimal("1249.49").round_to_taka(), 1249);
    /// ```
    pub fn round_to_taka(&self) -> i64 {
        if self.0 >= 0 {
            (self.0 + 50) / 100
        } else {
            (self.0 - 50) / 100
        }
    }

    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount as `৳1,250.50` with lakh-free thousands grouping.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let whole = self.taka().unsigned_abs().to_string();

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(f, "{}৳{}.{:02}", sign, grouped, self.poisha_part())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Serde (taka numbers on the wire)
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.taka())
        } else {
            serializer.serialize_f64(self.as_taka_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a taka amount as a number or decimal string")
    }

    // Out-of-range integers read as zero, like any other unusable amount.
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money::checked_from_taka(v).unwrap_or_default())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(i64::try_from(v)
            .ok()
            .and_then(Money::checked_from_taka)
            .unwrap_or_default())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Ok(Money::from_taka_f64(v))
    }

    /// Malformed strings read as zero so one bad price never fails a list.
    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Ok(Money::parse_decimal(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::zero())
    }

    fn visit_none<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::zero())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
