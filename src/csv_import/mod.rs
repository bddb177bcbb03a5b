//! Bulk import of transactions from CSV files.

mod csv;
mod import_transactions;

pub use self::csv::{CsvTransaction, ParseCSVResult, parse_csv};
pub use import_transactions::{BulkImporter, FileRemover, FsFileRemover};
