//! Derives the running balance from the transaction log.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    Error,
    stores::TransactionStore,
    transaction::{Transaction, TransactionType},
};

/// The income, outcome and net total over every stored transaction.
///
/// A balance is always recomputed from the transactions and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Balance {
    /// The sum of all income transactions.
    pub income: Decimal,
    /// The sum of all outcome transactions.
    pub outcome: Decimal,
    /// `income - outcome`.
    ///
    /// This can be negative because imports do not check the balance.
    pub total: Decimal,
}

impl Balance {
    /// Sum `transactions` into a balance.
    ///
    /// # Errors
    /// Returns an [Error::BalanceOverflow] if the income or outcome sum does
    /// not fit in a [Decimal].
    pub fn from_transactions<'a>(
        transactions: impl IntoIterator<Item = &'a Transaction>,
    ) -> Result<Self, Error> {
        let (income, outcome) = transactions.into_iter().try_fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(income, outcome), transaction| {
                let value = transaction.value.as_decimal();

                let sums = match transaction.kind {
                    TransactionType::Income => {
                        income.checked_add(value).map(|income| (income, outcome))
                    }
                    TransactionType::Outcome => {
                        outcome.checked_add(value).map(|outcome| (income, outcome))
                    }
                };

                sums.ok_or(Error::BalanceOverflow)
            },
        )?;

        let total = income.checked_sub(outcome).ok_or(Error::BalanceOverflow)?;

        Ok(Self {
            income,
            outcome,
            total,
        })
    }
}

/// Computes the [Balance] of the transactions in a [TransactionStore].
pub struct BalanceCalculator<'a, T> {
    transaction_store: &'a T,
}

impl<'a, T: TransactionStore> BalanceCalculator<'a, T> {
    /// Create a calculator that reads from `transaction_store`.
    pub fn new(transaction_store: &'a T) -> Self {
        Self { transaction_store }
    }

    /// Compute the balance over every transaction currently in the store.
    ///
    /// # Errors
    /// Returns an error if the transactions could not be read from the store,
    /// or an [Error::BalanceOverflow] if their sum is too large.
    pub fn compute_balance(&self) -> Result<Balance, Error> {
        let transactions = self.transaction_store.get_all()?;

        Balance::from_transactions(&transactions).inspect_err(|error| {
            tracing::error!(
                "Could not compute the balance of {} transactions: {error}",
                transactions.len()
            );
        })
    }
}
