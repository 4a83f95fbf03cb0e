//! Currency codes, minor-unit precision, and the crate-wide rounding policy.
//!
//! Every monetary value is a [`Decimal`]. Rounding is always banker's rounding
//! (round half to even) so per-member balances stay consistent with the
//! per-expense shares they are built from.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, LedgerResult};

/// Currencies without a minor unit.
const ZERO_DECIMAL_CODES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "UYI", "VND",
    "VUV", "XAF", "XOF", "XPF",
];

/// Currencies with a three-digit minor unit.
const THREE_DECIMAL_CODES: &[&str] = &["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"];

const DEFAULT_MINOR_UNITS: u32 = 2;

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Parses and validates a three-letter alphabetic code.
    pub fn parse(code: &str) -> LedgerResult<Self> {
        let candidate = Self::new(code);
        if candidate.is_valid() {
            Ok(candidate)
        } else {
            Err(LedgerError::validation(format!(
                "currency `{}` is not a three-letter ISO code",
                code
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0.len() == 3 && self.0.chars().all(|c| c.is_ascii_uppercase())
    }

    /// Number of decimal places in the currency's smallest unit.
    pub fn minor_units(&self) -> u32 {
        let code = self.as_str();
        if ZERO_DECIMAL_CODES.contains(&code) {
            0
        } else if THREE_DECIMAL_CODES.contains(&code) {
            3
        } else {
            DEFAULT_MINOR_UNITS
        }
    }

    /// Smallest representable amount, e.g. `0.01` for USD.
    pub fn epsilon(&self) -> Decimal {
        Decimal::new(1, self.minor_units())
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rounds to `minor_units` decimals using round-half-to-even.
pub fn round_money(value: Decimal, minor_units: u32) -> Decimal {
    value.round_dp_with_strategy(minor_units, RoundingStrategy::MidpointNearestEven)
}

/// True when `value` carries no more decimals than `minor_units`.
pub fn fits_precision(value: Decimal, minor_units: u32) -> bool {
    value.normalize().scale() <= minor_units
}

/// Formats an amount with the currency's precision and code, e.g. `12.50 EUR`.
pub fn format_amount(value: Decimal, currency: &CurrencyCode) -> String {
    let rounded = round_money(value, currency.minor_units());
    format!(
        "{:.*} {}",
        currency.minor_units() as usize,
        rounded,
        currency.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn codes_are_normalized_and_validated() {
        assert_eq!(CurrencyCode::parse(" eur ").unwrap().as_str(), "EUR");
        assert!(CurrencyCode::parse("EURO").is_err());
        assert!(CurrencyCode::parse("E1R").is_err());
    }

    #[test]
    fn minor_units_follow_iso_table() {
        assert_eq!(CurrencyCode::new("USD").minor_units(), 2);
        assert_eq!(CurrencyCode::new("JPY").minor_units(), 0);
        assert_eq!(CurrencyCode::new("KWD").minor_units(), 3);
        assert_eq!(CurrencyCode::new("USD").epsilon(), dec!(0.01));
        assert_eq!(CurrencyCode::new("JPY").epsilon(), dec!(1));
    }

    #[test]
    fn rounding_is_half_even() {
        assert_eq!(round_money(dec!(0.125), 2), dec!(0.12));
        assert_eq!(round_money(dec!(0.135), 2), dec!(0.14));
        assert_eq!(round_money(dec!(-0.125), 2), dec!(-0.12));
    }

    #[test]
    fn precision_check_ignores_trailing_zeros() {
        assert!(fits_precision(dec!(12.50), 2));
        assert!(fits_precision(dec!(12.500), 2));
        assert!(!fits_precision(dec!(12.505), 2));
        assert!(fits_precision(dec!(100), 0));
    }

    #[test]
    fn formats_with_currency_precision() {
        assert_eq!(format_amount(dec!(12.5), &CurrencyCode::new("EUR")), "12.50 EUR");
        assert_eq!(format_amount(dec!(1200), &CurrencyCode::new("JPY")), "1200 JPY");
    }
}
