//! Defines the money amount used for transaction values.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::Error;

/// A non-negative amount of money.
///
/// Amounts are fixed-point decimals so that summing many transactions does not
/// accumulate floating-point error. Whether the money was earned or spent is
/// recorded separately by [TransactionType](crate::TransactionType).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// An amount of zero.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Create an amount from a decimal value.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::NegativeAmount] if `value` is less than zero.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value.is_sign_negative() && !value.is_zero() {
            Err(Error::NegativeAmount(value))
        } else {
            Ok(Self(value))
        }
    }

    /// The amount as a decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = Error;

    /// Parse an amount such as `"20"` or `"1234.56"`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidAmount] if `text` is not a decimal number,
    /// or an [Error::NegativeAmount] if it is less than zero.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(text).map_err(|_| Error::InvalidAmount(text.to_owned()))?;

        Self::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Amounts are stored as text so that SQLite does not round them to a float.
impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Amount::from_str(text).map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
