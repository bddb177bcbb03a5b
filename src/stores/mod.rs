//! Contains traits and implementations for objects that store the domain models.
//!
//! The core components ([TransactionCreator](crate::TransactionCreator),
//! [BulkImporter](crate::BulkImporter) and [BalanceCalculator](crate::BalanceCalculator))
//! are handed their stores when they are constructed, so any implementation of
//! these traits can be swapped in.

mod category;
mod transaction;

pub mod memory;
pub mod sqlite;

pub use category::CategoryStore;
pub use transaction::TransactionStore;
