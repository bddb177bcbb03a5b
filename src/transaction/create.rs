//! Creates single transactions while keeping the balance from going negative.

use crate::{
    Amount, Error,
    balance::BalanceCalculator,
    category::{Category, NewCategory},
    stores::{CategoryStore, TransactionStore},
    transaction::{Transaction, TransactionType},
};

/// Validates and saves transactions one at a time.
pub struct TransactionCreator<C, T> {
    category_store: C,
    transaction_store: T,
}

impl<C, T> TransactionCreator<C, T>
where
    C: CategoryStore,
    T: TransactionStore,
{
    /// Create a transaction creator that saves to the given stores.
    pub fn new(category_store: C, transaction_store: T) -> Self {
        Self {
            category_store,
            transaction_store,
        }
    }

    /// Save a new transaction in the category titled `category_title`.
    ///
    /// The category is looked up by its exact title and created if it does
    /// not exist. A new category is saved *before* the balance is checked and
    /// is kept even if the transaction is then rejected.
    ///
    /// Titles are used as given, callers must trim or otherwise normalise them.
    ///
    /// An outcome may spend the whole balance, leaving a total of exactly zero.
    ///
    /// **Note**: the balance check and the insert are separate store calls.
    /// Two outcomes created concurrently against the same stores can both pass
    /// the check and together overdraw the balance.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InsufficientBalance] if `kind` is [TransactionType::Outcome] and
    ///   `value` is greater than the current balance total,
    /// - or any error returned by the stores.
    pub fn create(
        &mut self,
        title: &str,
        value: Amount,
        kind: TransactionType,
        category_title: &str,
    ) -> Result<Transaction, Error> {
        let category = self.find_or_create_category(category_title)?;

        let balance = BalanceCalculator::new(&self.transaction_store).compute_balance()?;

        if kind == TransactionType::Outcome && value.as_decimal() > balance.total {
            tracing::debug!(
                "rejected outcome \"{title}\" of {value}, the balance total is {}",
                balance.total
            );
            return Err(Error::InsufficientBalance {
                total: balance.total,
                requested: value.as_decimal(),
            });
        }

        let transaction = self
            .transaction_store
            .create(Transaction::build(title, value, kind).category_id(Some(category.id)))?;

        tracing::info!(
            "created {kind} transaction {} \"{title}\" of {value} in category \"{}\"",
            transaction.id,
            category.title
        );

        Ok(transaction)
    }

    fn find_or_create_category(&mut self, title: &str) -> Result<Category, Error> {
        if let Some(category) = self.category_store.find_by_title(title)? {
            return Ok(category);
        }

        let category = self.category_store.create(NewCategory::new(title))?;
        tracing::debug!("created category {} \"{}\"", category.id, category.title);

        Ok(category)
    }
}
