//! Defines the core data models for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::{
    Amount, Error,
    database_id::{CategoryId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction added money to the balance or took money from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, increases the balance.
    Income,
    /// Money spent, decreases the balance.
    Outcome,
}

impl TransactionType {
    /// The text used for the transaction type in CSV files and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Outcome => "outcome",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    /// Parse exactly `"income"` or `"outcome"`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidTransactionType] for any other text, including
    /// differently cased variants such as `"Income"`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "income" => Ok(TransactionType::Income),
            "outcome" => Ok(TransactionType::Outcome),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        TransactionType::from_str(text).map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An income or outcome, i.e. an event where money was either earned or spent.
///
/// Transactions are never modified once created.
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub title: String,
    /// How much money was earned or spent.
    pub value: Amount,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The ID of the category the transaction belongs to.
    ///
    /// This is only `None` for imported transactions whose category could not
    /// be resolved.
    pub category_id: Option<CategoryId>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(title: &str, value: Amount, kind: TransactionType) -> TransactionBuilder {
        TransactionBuilder {
            title: title.to_owned(),
            value,
            kind,
            category_id: None,
        }
    }
}

/// A transaction that has not been saved to a store yet.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
///
/// use cashbook_rs::{Amount, Transaction, TransactionType};
///
/// let builder = Transaction::build("Lunch", Amount::from_str("20").unwrap(), TransactionType::Outcome)
///     .category_id(Some(1));
///
/// assert_eq!(builder.category_id, Some(1));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// A text description of what the transaction was for.
    pub title: String,
    /// How much money was earned or spent.
    pub value: Amount,
    /// Whether money was earned or spent.
    pub kind: TransactionType,
    /// The category of the transaction, e.g. "Food", "Bills", "Job".
    pub category_id: Option<CategoryId>,
}

impl TransactionBuilder {
    /// Set the category ID for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Create the [Transaction] this builder describes with the ID assigned by a store.
    pub fn finalise(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            title: self.title,
            value: self.value,
            kind: self.kind,
            category_id: self.category_id,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
