//! Defines the transaction store trait.

use crate::{
    Error,
    transaction::{Transaction, TransactionBuilder},
};

/// Handles the creation and retrieval of transactions.
pub trait TransactionStore {
    /// Create a new transaction in the store.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Create many transactions in one batch.
    ///
    /// Implementers should either store every transaction or none of them.
    /// The returned transactions are in the same order as `builders`.
    fn create_many(&mut self, builders: Vec<TransactionBuilder>)
    -> Result<Vec<Transaction>, Error>;

    /// Retrieve every transaction in the order they were created.
    fn get_all(&self) -> Result<Vec<Transaction>, Error>;
}
