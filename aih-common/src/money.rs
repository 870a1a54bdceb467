//! Monetary amounts with two fractional digits
//!
//! Amounts are exact decimals. They become integer cents only when bound
//! to or read from SQLite, so sums and comparisons in SQL stay exact. On
//! the wire they are plain decimal numbers (`1000.5` = R$ 1000,50); text
//! such as `"1000.50"` is accepted on input too.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Largest accepted amount (999999.99)
pub const MAX_VALUE: Money = Money(Decimal::from_parts(99_999_999, 0, 0, false, 2));

/// At most two fractional digits, always convertible to i64 cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn cents(self) -> i64 {
        let mut scaled = self.0;
        scaled.rescale(2);
        // Bounded by the TryFrom check
        scaled.mantissa() as i64
    }
}

impl TryFrom<Decimal> for Money {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self> {
        let value = value.normalize();
        if value.scale() > 2 {
            return Err(Error::Validation(format!(
                "Invalid amount: {} has more than two decimal places",
                value
            )));
        }
        value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .ok_or_else(|| Error::Validation(format!("Amount out of range: {}", value)))?;
        Ok(Money(value))
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = Decimal::from_str_exact(s.trim())
            .map_err(|_| Error::Validation(format!("Invalid amount: {:?}", s)))?;
        Money::try_from(value)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut padded = self.0;
        padded.rescale(2);
        write!(f, "{}", padded)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::try_from(value).map_err(serde::de::Error::custom)
    }
}
