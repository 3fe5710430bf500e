use crate::Result;

use std::fmt;

use thiserror::Error;

/// Number of implied decimal places carried by [`Money`]
const SCALE: i64 = 10_000;

#[derive(Error, Debug)]
pub enum MoneyError {
    #[error("Overflow error while applying {0} operation on {1:?} and {2:?}")]
    Overflow(&'static str, Money, Money),

    #[error("Money parse error: {0}, {1:?}")]
    Parse(&'static str, String),

    #[error("Money out of range: {0}")]
    OutOfRange(f64),
}

/// Fixed-point currency amount, stored in ten-thousandths of a unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub fn from_units(units: i64) -> Self {
        Self(units * SCALE)
    }

    pub fn from_f64(value: f64) -> Result<Self> {
        let scaled = (value * SCALE as f64).round();

        if !scaled.is_finite() || scaled.abs() >= i64::MAX as f64 {
            Err(MoneyError::OutOfRange(value))?
        }

        return Ok(Self(scaled as i64));
    }

    /// Parses text such as `"50"`, `"-12.5"` or `"$1,234.50"`
    pub fn parse(string: &str) -> Result<Self> {
        let cleaned: String = string
            .trim()
            .chars()
            .filter(|c| *c != '$' && *c != ',')
            .collect();

        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        if digits.is_empty() {
            Err(MoneyError::Parse("No digits", string.to_string()))?
        }

        let mut parts = digits.split('.');

        if parts.clone().count() > 2 {
            Err(MoneyError::Parse("Too many decimal points", string.to_string()))?
        }

        let units = match parts.next() {
            Some("") | None => "0",
            Some(units) => units,
        };

        let fraction = parts.next().unwrap_or("");

        if !units.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
            Err(MoneyError::Parse("Not a number", string.to_string()))?
        }

        // fraction is all ascii digits from here on
        let fraction = format!("{:0<4}", fraction)[..4].to_string();

        let units: i64 = units.parse()?;
        let fraction: i64 = fraction.parse()?;

        let amount = units
            .checked_mul(SCALE)
            .and_then(|scaled| scaled.checked_add(fraction))
            .ok_or_else(|| MoneyError::Parse("Amount too large", string.to_string()))?;

        return Ok(Self(if negative { -amount } else { amount }));
    }

    pub fn add(&mut self, other: &Self) -> Result {
        let sum = self
            .0
            .checked_add(other.0)
            .ok_or(MoneyError::Overflow("add", *self, *other))?;

        self.0 = sum;

        return Ok(());
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Renders the amount the way the `$#,##0.00` cell format displays it
    pub fn to_currency_string(self) -> String {
        let cents = (self.0 as i128 * 100 + (SCALE as i128 / 2) * self.0.signum() as i128)
            / SCALE as i128;
        let sign = if cents < 0 { "-" } else { "" };
        let cents = cents.abs();

        let units = (cents / 100).to_string();
        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (idx, digit) in units.chars().enumerate() {
            if idx > 0 && (units.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        format!("{sign}${grouped}.{:02}", cents % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / SCALE as u64;
        let fraction = format!("{:04}", abs % SCALE as u64);
        let fraction = fraction.trim_end_matches('0');

        return write!(f, "{sign}{units}.{fraction:0<2}");
    }
}
