//! Transaction management.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, its `TransactionType` and `TransactionBuilder` for creating transactions
//! - The `TransactionCreator`, which validates and saves a single transaction

mod core;
mod create;

pub use core::{Transaction, TransactionBuilder, TransactionType};
pub use create::TransactionCreator;
