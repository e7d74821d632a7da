use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Sub},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const BRL_CURRENCY_CODE: &str = "BRL";
/// ISO-4217 numeric code for the Brazilian Real, as it appears in the Pix payload currency field.
pub const BRL_NUMERIC_CURRENCY_CODE: &str = "986";

//--------------------------------------       Money       -----------------------------------------------------------
/// A monetary amount in centavos (hundredths of a Real). All order totals and fees in the settlement engine are
/// carried as `Money` so that no floating point value is ever persisted or compared.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a monetary amount: {0}")]
pub struct MoneyConversionError(pub String);

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}R${}.{:02}", (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Convert a decimal amount in Reais (e.g. `23.5`) into centavos, rounding half-up to the nearest cent.
    pub fn try_from_reais(reais: f64) -> Result<Self, MoneyConversionError> {
        if !reais.is_finite() {
            return Err(MoneyConversionError(format!("{reais} is not a finite amount")));
        }
        if reais < 0.0 {
            return Err(MoneyConversionError(format!("{reais} is negative")));
        }
        if reais > i64::MAX as f64 / 100.0 {
            return Err(MoneyConversionError(format!("{reais} is too large")));
        }
        // f64::round is round-half-away-from-zero, which is round-half-up for the non-negative amounts allowed here
        Ok(Self((reais * 100.0).round() as i64))
    }

    /// The amount in centavos.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Overflow-aware addition for amounts built from untrusted inputs. The `Add` impl is for values the engine
    /// already vetted; checkout quantities and prices come off the wire and go through here instead.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Overflow-aware multiplication, see [`Money::checked_add`].
    pub fn checked_mul(self, rhs: i64) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Renders the amount the way the Pix payload and the provider API expect it: dot-decimal, two fractional
    /// digits, no thousands separator. e.g. `2350` centavos -> `"23.50"`.
    pub fn to_bacen_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{sign}{}.{:02}", (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}
