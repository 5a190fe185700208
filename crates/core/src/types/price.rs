//! Canonical money representation using decimal arithmetic.
//!
//! Prices reach the client in two shapes: raw JSON numbers from the API and
//! display strings such as `"₹1,234"` that were rendered once and stored.
//! [`Money`] is the single in-memory form. Conversion happens when a value
//! is deserialized; arithmetic never touches display strings.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign};
use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A monetary amount in the store's currency.
///
/// Amounts are in the currency's standard unit (rupees, not paise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest representable amount. Totals clamp here instead of overflowing.
    pub const MAX: Self = Self(Decimal::MAX);

    /// Create from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create from a whole number of major units.
    #[must_use]
    pub fn from_major(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Parse a price the way the storefront has always treated display strings.
    ///
    /// Every character other than an ASCII digit or `.` is dropped, so
    /// currency symbols, thousands separators and whitespace disappear. What
    /// remains is parsed as a decimal. Anything unparseable is zero.
    ///
    /// ```
    /// use mirrorcraft_core::Money;
    ///
    /// assert_eq!(Money::parse_lenient("₹1,234"), Money::from_major(1234));
    /// assert_eq!(Money::parse_lenient("n/a"), Money::ZERO);
    /// ```
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let cleaned = cleaned.trim_end_matches('.');
        if cleaned.is_empty() {
            return Self::ZERO;
        }
        Decimal::from_str(cleaned).map_or(Self::ZERO, Self)
    }

    /// Convert a float the API sent. Non-finite values are zero.
    #[must_use]
    pub fn from_f64_lossy(value: f64) -> Self {
        Decimal::from_f64(value).map_or(Self::ZERO, Self)
    }

    /// Price of `quantity` units. Saturates at [`Money::MAX`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Format for display in the given currency, e.g. `₹1,234.50`.
    #[must_use]
    pub fn display(&self, currency: CurrencyCode) -> String {
        let rounded = self.0.round_dp(2);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.2}", rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, c) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        let sign = if negative { "-" } else { "" };
        format!("{sign}{}{grouped}.{fraction}", currency.symbol())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display(CurrencyCode::default()))
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
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.normalize().to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a price string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money::from_major(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(Money(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Ok(Money::from_f64_lossy(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Ok(Money::parse_lenient(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::ZERO)
    }
}

/// ISO 4217 currency codes the storefront can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_strips_symbols_and_separators() {
        assert_eq!(Money::parse_lenient("₹1,234"), Money::from_major(1234));
        assert_eq!(Money::parse_lenient(" Rs 2,499.50 "), Money::new(Decimal::new(249_950, 2)));
        assert_eq!(Money::parse_lenient("500"), Money::from_major(500));
        assert_eq!(Money::parse_lenient("1234."), Money::from_major(1234));
    }

    #[test]
    fn test_parse_lenient_unparseable_is_zero() {
        assert_eq!(Money::parse_lenient(""), Money::ZERO);
        assert_eq!(Money::parse_lenient("free"), Money::ZERO);
        assert_eq!(Money::parse_lenient("1.2.3"), Money::ZERO);
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let from_str: Money = serde_json::from_str("\"₹1,234\"").unwrap();
        let from_int: Money = serde_json::from_str("500").unwrap();
        let from_float: Money = serde_json::from_str("99.5").unwrap();
        let from_null: Money = serde_json::from_str("null").unwrap();

        assert_eq!(from_str, Money::from_major(1234));
        assert_eq!(from_int, Money::from_major(500));
        assert_eq!(from_float, Money::new(Decimal::new(995, 1)));
        assert_eq!(from_null, Money::ZERO);
    }

    #[test]
    fn test_serialize_reads_back_exactly() {
        let price = Money::new(Decimal::new(123_450, 2));
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"1234.5\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_arithmetic() {
        let total: Money = [
            Money::parse_lenient("₹1,234").times(2),
            Money::from_major(500).times(1),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, Money::from_major(2968));
    }

    #[test]
    fn test_huge_totals_saturate() {
        let huge = Money::parse_lenient("₹50,000,000,000,000,000,000,000,000,000");
        assert!(!huge.is_zero());
        assert_eq!(huge.times(u32::MAX), Money::MAX);
        assert_eq!(huge.times(2), Money::MAX);

        let total: Money = [huge.times(2), Money::from_major(1)].into_iter().sum();
        assert_eq!(total, Money::MAX);

        let mut running = Money::MAX;
        running += Money::from_major(500);
        assert_eq!(running, Money::MAX);
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_major(2968).to_string(), "₹2,968.00");
        assert_eq!(Money::from_major(1_234_567).display(CurrencyCode::USD), "$1,234,567.00");
        assert_eq!(Money::new(Decimal::new(995, 1)).to_string(), "₹99.50");
        assert_eq!(Money::ZERO.to_string(), "₹0.00");
    }
}
