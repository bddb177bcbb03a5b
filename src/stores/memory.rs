//! Implements stores that keep their data in memory.
//!
//! Cloning a store gives another handle to the same data, which lets a caller
//! keep a handle for inspection after handing a store to a component.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    Error,
    category::{Category, NewCategory},
    stores::{CategoryStore, TransactionStore},
    transaction::{Transaction, TransactionBuilder},
};

fn lock<T>(data: &Mutex<T>) -> Result<MutexGuard<'_, T>, Error> {
    data.lock().map_err(|error| {
        tracing::error!("could not acquire in-memory store lock: {error}");
        Error::DatabaseLockError
    })
}

/// Stores categories in a vector.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCategoryStore {
    categories: Arc<Mutex<Vec<Category>>>,
}

impl InMemoryCategoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CategoryStore for InMemoryCategoryStore {
    fn find_by_title(&self, title: &str) -> Result<Option<Category>, Error> {
        let categories = lock(&self.categories)?;

        Ok(categories
            .iter()
            .find(|category| category.title == title)
            .cloned())
    }

    fn find_by_titles(&self, titles: &[String]) -> Result<Vec<Category>, Error> {
        let categories = lock(&self.categories)?;

        Ok(categories
            .iter()
            .filter(|category| titles.contains(&category.title))
            .cloned()
            .collect())
    }

    fn create(&mut self, category: NewCategory) -> Result<Category, Error> {
        let mut categories = lock(&self.categories)?;
        let category = Category {
            id: categories.len() as i64 + 1,
            title: category.title,
        };
        categories.push(category.clone());

        Ok(category)
    }

    fn create_many(&mut self, new_categories: Vec<NewCategory>) -> Result<Vec<Category>, Error> {
        let mut categories = lock(&self.categories)?;
        let first_id = categories.len() as i64 + 1;

        let created: Vec<Category> = new_categories
            .into_iter()
            .zip(first_id..)
            .map(|(category, id)| Category {
                id,
                title: category.title,
            })
            .collect();
        categories.extend(created.iter().cloned());

        Ok(created)
    }

    fn get_all(&self) -> Result<Vec<Category>, Error> {
        Ok(lock(&self.categories)?.clone())
    }
}

/// Stores transactions in a vector.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionStore {
    transactions: Arc<Mutex<Vec<Transaction>>>,
}

impl InMemoryTransactionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let mut transactions = lock(&self.transactions)?;
        let transaction = builder.finalise(transactions.len() as i64 + 1);
        transactions.push(transaction.clone());

        Ok(transaction)
    }

    fn create_many(
        &mut self,
        builders: Vec<TransactionBuilder>,
    ) -> Result<Vec<Transaction>, Error> {
        let mut transactions = lock(&self.transactions)?;
        let first_id = transactions.len() as i64 + 1;

        let created: Vec<Transaction> = builders
            .into_iter()
            .zip(first_id..)
            .map(|(builder, id)| builder.finalise(id))
            .collect();
        transactions.extend(created.iter().cloned());

        Ok(created)
    }

    fn get_all(&self) -> Result<Vec<Transaction>, Error> {
        Ok(lock(&self.transactions)?.clone())
    }
}
