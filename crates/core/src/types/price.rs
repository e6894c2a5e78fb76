//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog records carry prices as bare JSON numbers (`"price": 9.99`), and the
//! persisted cart keeps that shape. In memory the amount is a [`Decimal`], so
//! totals like `9.99 * 2` are exact.
//!
//! Amounts are kept to [`Price::MAX_SCALE`] decimal places and below
//! [`Price::max_amount`]. That is at most 15 significant digits, which an
//! `f64` carries exactly, so a price reads back equal to what was written.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The amount does not fit in a JSON number without losing digits.
    #[error("price is too large (got {0})")]
    TooLarge(Decimal),
}

/// A non-negative amount in the store currency.
///
/// ```
/// use rust_decimal::Decimal;
/// use shopfront_core::Price;
///
/// let unit = Price::new(Decimal::new(999, 2)).unwrap();
/// assert_eq!(unit.times(2).to_string(), "$19.98");
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Decimal places kept; finer amounts are rounded half away from zero.
    pub const MAX_SCALE: u32 = 4;

    /// The largest representable amount, `99999999999.9999`.
    #[must_use]
    pub fn max_amount() -> Decimal {
        Decimal::new(999_999_999_999_999, Self::MAX_SCALE)
    }

    /// Create a price from a decimal amount, rounded to [`Price::MAX_SCALE`]
    /// decimal places.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero and
    /// [`PriceError::TooLarge`] if it exceeds [`Price::max_amount`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        let rounded = amount
            .round_dp_with_strategy(Self::MAX_SCALE, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        if rounded > Self::max_amount() {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(rounded))
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Scale by a non-negative rate (e.g. a tax rate of `0.08`).
    ///
    /// The result is not rounded; see [`Price::round_to_cents`].
    #[must_use]
    pub fn scale(self, rate: Decimal) -> Self {
        Self(self.0.saturating_mul(rate.max(Decimal::ZERO)))
    }

    /// Round to two decimal places, halves away from zero.
    #[must_use]
    pub fn round_to_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

/// Formats as a dollar amount with two decimals, e.g. `$9.99`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim().trim_start_matches('$'))
            .map_err(|e| PriceError::Invalid(e.to_string()))?;
        Self::new(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Parsing the decimal text gives the nearest f64, which prints back as
        // the same digits when there are 15 or fewer of them.
        let amount = self
            .0
            .normalize()
            .to_string()
            .parse::<f64>()
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_f64(amount)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}
