//! Minor-unit money representation with exact decimal conversion.
//!
//! The canonical unit for every amount in this workspace is the currency's
//! minor unit (cents for USD). Wire payloads carry decimal-dollar strings;
//! those are converted exactly at the API boundary and never mixed into
//! arithmetic. All rounding is half-up to the minor unit and happens here,
//! not in display code.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fractional digits in the minor unit.
const MINOR_UNIT_SCALE: u32 = 2;

/// Errors converting between wire amounts and [`Money`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount string did not parse as a decimal number.
    #[error("unparseable amount: {0:?}")]
    Unparseable(String),

    /// The amount has sub-minor-unit precision (more than two fractional
    /// digits) and cannot be represented exactly.
    #[error("amount {0} has sub-minor-unit precision")]
    SubMinorPrecision(String),

    /// The amount does not fit the minor-unit range.
    #[error("amount {0} out of range")]
    OutOfRange(String),

    /// Unknown ISO 4217 currency code.
    #[error("unknown currency code: {0:?}")]
    UnknownCurrency(String),
}

/// A monetary amount in minor units (e.g., cents for USD).
///
/// `Money` is currency-agnostic; the currency in effect travels in
/// configuration and wire payloads. Arithmetic saturates instead of wrapping
/// so totals stay well-formed even for absurd inputs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero of any currency.
    pub const ZERO: Self = Self(0);

    /// Create from a raw minor-unit amount.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// The raw minor-unit amount.
    #[must_use]
    pub const fn as_minor(self) -> i64 {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// The amount as an exact decimal in major units (e.g., `12.50`).
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    /// Convert an exact decimal major-unit amount.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::SubMinorPrecision`] if the value has more than
    /// two meaningful fractional digits, or [`MoneyError::OutOfRange`] if it
    /// does not fit in minor units.
    pub fn from_decimal(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.round_dp(MINOR_UNIT_SCALE) != amount {
            return Err(MoneyError::SubMinorPrecision(amount.to_string()));
        }
        (amount * Decimal::from(100))
            .to_i64()
            .map(Self)
            .ok_or_else(|| MoneyError::OutOfRange(amount.to_string()))
    }

    /// Convert a decimal major-unit amount, rounding half-up to the minor
    /// unit. This is the single rounding rule for computed amounts (taxes,
    /// percentage tips); exact wire conversions use [`Money::from_decimal`].
    #[must_use]
    pub fn from_decimal_rounded(amount: Decimal) -> Self {
        let rounded =
            amount.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero);
        // Saturate rather than panic at the i64 boundary.
        (rounded * Decimal::from(100))
            .to_i64()
            .map_or(Self(i64::MAX), Self)
    }

    /// Parse a decimal-dollar wire string (e.g., `"12.50"`) exactly.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Unparseable`] for non-numeric input, otherwise
    /// the errors of [`Money::from_decimal`].
    pub fn parse_decimal_str(s: &str) -> Result<Self, MoneyError> {
        let amount = s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| MoneyError::Unparseable(s.to_owned()))?;
        Self::from_decimal(amount)
    }

    /// Format with a currency symbol, e.g. `$12.50`.
    #[must_use]
    pub fn display(self, currency: CurrencyCode) -> String {
        format!("{}{}", currency.symbol(), self.to_decimal())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Decimal created with scale 2 always renders two fractional digits.
        write!(f, "{}", self.to_decimal())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// ISO 4217 currency codes supported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The ISO 4217 code, e.g. `"USD"`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// The display symbol, e.g. `"$"`.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            other => Err(MoneyError::UnknownCurrency(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_str_exact() {
        assert_eq!(Money::parse_decimal_str("12.50").unwrap(), Money::from_minor(1250));
        assert_eq!(Money::parse_decimal_str("4.99").unwrap(), Money::from_minor(499));
        assert_eq!(Money::parse_decimal_str("0").unwrap(), Money::ZERO);
        // Trailing zeros beyond the minor unit are still exact.
        assert_eq!(Money::parse_decimal_str("12.500").unwrap(), Money::from_minor(1250));
    }

    #[test]
    fn test_parse_decimal_str_rejects_sub_minor_precision() {
        let err = Money::parse_decimal_str("12.505").unwrap_err();
        assert!(matches!(err, MoneyError::SubMinorPrecision(_)));
    }

    #[test]
    fn test_parse_decimal_str_rejects_garbage() {
        let err = Money::parse_decimal_str("twelve").unwrap_err();
        assert!(matches!(err, MoneyError::Unparseable(_)));
    }

    #[test]
    fn test_rounding_is_half_up() {
        let taxes: Decimal = "2.325".parse().unwrap();
        assert_eq!(Money::from_decimal_rounded(taxes), Money::from_minor(233));

        let tip: Decimal = "6.975".parse().unwrap();
        assert_eq!(Money::from_decimal_rounded(tip), Money::from_minor(698));

        let down: Decimal = "2.324".parse().unwrap();
        assert_eq!(Money::from_decimal_rounded(down), Money::from_minor(232));
    }

    #[test]
    fn test_display_keeps_two_fractional_digits() {
        assert_eq!(Money::from_minor(1250).to_string(), "12.50");
        assert_eq!(Money::from_minor(1200).to_string(), "12.00");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(1250).display(CurrencyCode::USD), "$12.50");
        assert_eq!(Money::from_minor(1250).display(CurrencyCode::GBP), "£12.50");
    }

    #[test]
    fn test_arithmetic() {
        let unit = Money::from_minor(1550);
        assert_eq!(unit * 3, Money::from_minor(4650));
        assert_eq!(unit + Money::from_minor(50), Money::from_minor(1600));

        let total: Money = [Money::from_minor(100), Money::from_minor(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_minor(350));
    }

    #[test]
    fn test_currency_code_parsing() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!(" CAD ".parse::<CurrencyCode>().unwrap(), CurrencyCode::CAD);
        assert!(matches!(
            "XYZ".parse::<CurrencyCode>(),
            Err(MoneyError::UnknownCurrency(_))
        ));
    }
}
