//! Cashbook records income and outcome transactions against categories and
//! keeps a running balance over them.
//!
//! The library is built around three components, each of which is handed the
//! stores it works with:
//! - [BalanceCalculator] sums the stored transactions into a [Balance],
//! - [TransactionCreator] saves single transactions and refuses outcomes that
//!   would take the balance below zero,
//! - [BulkImporter] saves every transaction in a CSV file at once.
//!
//! Stores backed by SQLite live in [stores::sqlite] and stores backed by
//! memory live in [stores::memory].

#![warn(missing_docs)]

use rust_decimal::Decimal;

mod amount;
mod balance;
mod category;
mod csv_import;
mod database_id;
pub mod db;
mod logging;
pub mod stores;
mod transaction;

pub use amount::Amount;
pub use balance::{Balance, BalanceCalculator};
pub use category::{Category, NewCategory};
pub use csv_import::{
    BulkImporter, CsvTransaction, FileRemover, FsFileRemover, ParseCSVResult, parse_csv,
};
pub use database_id::{CategoryId, DatabaseId, TransactionId};
pub use logging::setup_logging;
pub use transaction::{Transaction, TransactionBuilder, TransactionCreator, TransactionType};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An outcome was larger than the current balance total.
    ///
    /// Nothing is saved for the rejected transaction, although a category
    /// created for it is kept.
    #[error("insufficient balance: tried to spend {requested} but the balance is {total}")]
    InsufficientBalance {
        /// The balance total when the transaction was checked.
        total: Decimal,
        /// The value of the rejected outcome.
        requested: Decimal,
    },

    /// An import source could not be opened or decoded.
    ///
    /// Nothing from the source is saved.
    #[error("could not read the import source: {0}")]
    SourceUnreadable(String),

    /// A transaction type other than `income` or `outcome` was given.
    #[error("\"{0}\" is not a valid transaction type, expected \"income\" or \"outcome\"")]
    InvalidTransactionType(String),

    /// A transaction value was not a number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// A transaction value was less than zero.
    ///
    /// Whether money was spent is given by the transaction type, not the sign of the value.
    #[error("{0} is negative, amounts must be zero or more")]
    NegativeAmount(Decimal),

    /// The sum of the stored transactions is too large to represent.
    #[error("the balance is too large to compute")]
    BalanceOverflow,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::SourceUnreadable(value.to_string())
    }
}
