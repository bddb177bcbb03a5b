//! Contains the SQLite backed stores and a convenience function for opening them.

mod category;
mod transaction;

pub use category::SQLiteCategoryStore;
pub use transaction::SQLiteTransactionStore;

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{Error, db::initialize};

/// Creates a category store and a transaction store that share `db_connection`.
///
/// This function will modify the database by adding the tables for the domain
/// models to the database if they do not exist yet.
///
/// # Errors
/// Returns an [Error::SqlError] if the tables could not be created.
pub fn create_stores(
    db_connection: Connection,
) -> Result<(SQLiteCategoryStore, SQLiteTransactionStore), Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));

    Ok((
        SQLiteCategoryStore::new(connection.clone()),
        SQLiteTransactionStore::new(connection),
    ))
}

fn lock_connection(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
