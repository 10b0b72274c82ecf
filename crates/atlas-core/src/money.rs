//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In binary floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  A drawer balance or a settlement decision must never depend on     │
//! │  float equality. OUR SOLUTION: integer minor units (cents).         │
//! │    1000 cents / 3 = 333 cents (×3 = 999 cents)                      │
//! │    We KNOW we lost 1 cent, and handle it explicitly                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use atlas_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // 10.99
//!
//! // Decimal input is parsed at the boundary, once
//! let counted = Money::parse_decimal("120.50").unwrap();
//!
//! // Arithmetic operations
//! let line = price.multiply_quantity(2);           // 21.98
//! let discounted = line.sub_clamped(Money::from_cents(2500)); // 0.00, not negative
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for reconciliation deltas
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary field in the system (prices, discounts, payments,
/// balances, movements) flows through this type. Comparisons and equality
/// always operate on the integer representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -5.50, not -4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Parses a decimal string (`"10"`, `"10.5"`, `"10.99"`) into Money.
    ///
    /// This is the ONLY place external decimal input enters the integer
    /// domain; anything past the minor unit is rounded half-away-from-zero
    /// here, once. Callers never re-round.
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("10.99").unwrap().cents(), 1099);
    /// assert_eq!(Money::parse_decimal("10.5").unwrap().cents(), 1050);
    /// assert_eq!(Money::parse_decimal("10.999").unwrap().cents(), 1100);
    /// assert_eq!(Money::parse_decimal("-3.25").unwrap().cents(), -325);
    /// assert!(Money::parse_decimal("abc").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();

        let invalid = || ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a decimal amount", input.trim()),
        };

        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let major: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };

        // First two fraction digits are the minor unit; the third decides
        // rounding, the rest is noise.
        let mut digits = frac_part.chars();
        let d1 = digits.next().and_then(|c| c.to_digit(10)).unwrap_or(0) as i64;
        let d2 = digits.next().and_then(|c| c.to_digit(10)).unwrap_or(0) as i64;
        let d3 = digits.next().and_then(|c| c.to_digit(10)).unwrap_or(0) as i64;

        let mut minor = d1 * 10 + d2;
        if d3 >= 5 {
            minor += 1;
        }

        let mut cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(invalid)?;
        if negative {
            cents = -cents;
        }

        Ok(Money(cents))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99, absolute).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Subtracts, clamping the result at zero.
    ///
    /// This is the subtraction the sale math uses wherever the domain
    /// forbids a negative total: a discount can wipe out a line or a sale,
    /// never push it below zero.
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// let line = Money::from_cents(500);
    /// assert_eq!(line.sub_clamped(Money::from_cents(200)).cents(), 300);
    /// assert_eq!(line.sub_clamped(Money::from_cents(900)).cents(), 0);
    /// ```
    #[inline]
    pub const fn sub_clamped(&self, other: Self) -> Self {
        let diff = self.0 - other.0;
        Money(if diff < 0 { 0 } else { diff })
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // 2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // 8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values (unclamped; see `sub_clamped`).
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
