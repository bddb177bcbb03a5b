//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    stores::{TransactionStore, sqlite::lock_connection},
    transaction::{Transaction, TransactionBuilder},
};

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction refers to a [Category](crate::Category),
/// the category table must be set up in the same database, see [crate::db::initialize].
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const INSERT_TRANSACTION: &str = "INSERT INTO \"transaction\" (title, value, type, category_id)
     VALUES (?1, ?2, ?3, ?4)
     RETURNING id, title, value, type, category_id";

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL error.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let connection = lock_connection(&self.connection)?;

        let transaction = connection.prepare(INSERT_TRANSACTION)?.query_row(
            (
                builder.title,
                builder.value,
                builder.kind,
                builder.category_id,
            ),
            Self::map_row,
        )?;

        Ok(transaction)
    }

    /// Create many transactions inside a single SQL transaction.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an SQL error, in which case
    /// none of the transactions are saved.
    fn create_many(
        &mut self,
        builders: Vec<TransactionBuilder>,
    ) -> Result<Vec<Transaction>, Error> {
        let connection = lock_connection(&self.connection)?;

        let tx = connection.unchecked_transaction()?;
        let mut created = Vec::with_capacity(builders.len());

        // Prepare the insert statement once for reuse
        let mut stmt = tx.prepare(INSERT_TRANSACTION)?;

        for builder in builders {
            let transaction = stmt.query_row(
                (
                    builder.title,
                    builder.value,
                    builder.kind,
                    builder.category_id,
                ),
                Self::map_row,
            )?;

            created.push(transaction);
        }

        drop(stmt);

        tx.commit()?;
        Ok(created)
    }

    /// Retrieve every transaction in the database ordered by ID.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL error.
    fn get_all(&self) -> Result<Vec<Transaction>, Error> {
        lock_connection(&self.connection)?
            .prepare("SELECT id, title, value, type, category_id FROM \"transaction\" ORDER BY id;")?
            .query_map([], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
            .collect()
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                value TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'outcome')),
                category_id INTEGER,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let title = row.get(offset + 1)?;
        let value = row.get(offset + 2)?;
        let kind = row.get(offset + 3)?;
        let category_id = row.get(offset + 4)?;

        Ok(Transaction {
            id,
            title,
            value,
            kind,
            category_id,
        })
    }
}
