//! Type-safe price representation.
//!
//! Prices are stored as a non-negative integer amount in the currency's
//! minor unit (e.g. centimes), which is exactly what both backing stores
//! persist. Decimal arithmetic is only used for display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(i64),
}

/// A non-negative price in minor currency units.
///
/// ```
/// use eclat_core::{CurrencyCode, Price};
///
/// let price = Price::from_minor_units(1350).unwrap();
/// assert_eq!(price.format(CurrencyCode::EUR), "13,50 €");
/// assert!(Price::from_minor_units(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Price(i64);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(0);

    /// Create a price from an amount in minor units.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if the amount is below zero.
    pub const fn from_minor_units(amount: i64) -> Result<Self, PriceError> {
        if amount < 0 {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Amount in the currency's standard unit (e.g. 1350 -> 13.50).
    #[must_use]
    pub fn as_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Format for display using French conventions (e.g. `13,50 €`).
    #[must_use]
    pub fn format(self, currency: CurrencyCode) -> String {
        let amount = format!("{:.2}", self.as_decimal()).replace('.', ",");
        format!("{amount} {}", currency.symbol())
    }
}

impl TryFrom<i64> for Price {
    type Error = PriceError;

    fn try_from(amount: i64) -> Result<Self, Self::Error> {
        Self::from_minor_units(amount)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// ISO 4217 currency codes the storefront can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    EUR,
    DZD,
    MAD,
    XOF,
}

impl CurrencyCode {
    /// Display symbol placed after the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::EUR => "€",
            Self::DZD => "DA",
            Self::MAD => "DH",
            Self::XOF => "FCFA",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_rejected() {
        assert_eq!(
            Price::from_minor_units(-5),
            Err(PriceError::Negative(-5))
        );
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("-100").is_err());
        let price: Price = serde_json::from_str("1350").unwrap();
        assert_eq!(price.minor_units(), 1350);
    }

    #[test]
    fn test_serializes_as_integer() {
        let price = Price::from_minor_units(990).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "990");
    }

    #[test]
    fn test_format() {
        let price = Price::from_minor_units(5).unwrap();
        assert_eq!(price.format(CurrencyCode::DZD), "0,05 DA");
        assert_eq!(Price::ZERO.format(CurrencyCode::EUR), "0,00 €");
    }
}
