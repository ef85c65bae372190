use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A report amount, always held at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    /// Parse a plain `1234.56` amount token. Thousands separators are not accepted.
    pub fn parse(s: &str) -> Option<Self> {
        Decimal::from_str(s.trim()).ok().map(Self::from_decimal)
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_two_decimals() {
        let m = Money::parse("4800.00").unwrap();
        assert_eq!(m, Money::from_cents(480_000));
        assert_eq!(m.to_string(), "4800.00");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Money::parse("48O0.00").is_none());
        assert!(Money::parse("").is_none());
    }

    #[test]
    fn zero_displays_with_cents() {
        assert!(Money::zero().is_zero());
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn to_f64_matches_value() {
        assert_eq!(Money::from_cents(12_550).to_f64(), 125.5);
    }
}
