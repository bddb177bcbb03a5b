//! Functions to decode transactions from CSV files.

use std::{io::Read, str::FromStr};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{Amount, Error, TransactionType};

/// The number of fields in each row: `title,type,value,category`.
const FIELD_COUNT: usize = 4;

const TITLE_COLUMN: usize = 0;
const TYPE_COLUMN: usize = 1;
const VALUE_COLUMN: usize = 2;
const CATEGORY_COLUMN: usize = 3;

/// A transaction read from a CSV row that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTransaction {
    /// A text description of what the transaction was for.
    pub title: String,
    /// Whether money was earned or spent.
    pub kind: TransactionType,
    /// How much money was earned or spent.
    pub value: Amount,
    /// The title of the category the transaction belongs to.
    pub category_title: String,
}

/// The transactions and category titles found after parsing a CSV document.
#[derive(Debug, Default, PartialEq)]
pub struct ParseCSVResult {
    /// The transactions in the order they appear in the CSV document, may be empty.
    pub transactions: Vec<CsvTransaction>,
    /// The category title of every transaction in the same order as
    /// `transactions`, including duplicates.
    pub category_titles: Vec<String>,
}

/// Parses CSV data with the layout:
///
/// ```csv
/// title,type,value,category
/// Lunch,outcome,20,Food
/// Bonus,income,200,Job
/// ```
///
/// The first line is a header and is always skipped, whatever it contains.
/// Leading and trailing whitespace is trimmed from every field.
///
/// The whole of `reader` is read before returning.
///
/// # Errors
/// Returns a:
/// - [Error::SourceUnreadable] if `reader` cannot be read or a row does not have exactly four fields,
/// - [Error::InvalidTransactionType] if a type is not `income` or `outcome`,
/// - [Error::InvalidAmount] or [Error::NegativeAmount] if a value is not a non-negative number.
pub fn parse_csv<R: Read>(reader: R) -> Result<ParseCSVResult, Error> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut result = ParseCSVResult::default();

    for record in csv_reader.records() {
        let record = record?;
        let transaction = parse_record(&record).inspect_err(|error| {
            tracing::debug!("Could not parse CSV line {}: {error}", line_number(&record));
        })?;

        result
            .category_titles
            .push(transaction.category_title.clone());
        result.transactions.push(transaction);
    }

    tracing::debug!("Parsed {} transactions from CSV", result.transactions.len());

    Ok(result)
}

fn parse_record(record: &StringRecord) -> Result<CsvTransaction, Error> {
    if record.len() != FIELD_COUNT {
        return Err(Error::SourceUnreadable(format!(
            "line {} has {} fields, expected {FIELD_COUNT}",
            line_number(record),
            record.len()
        )));
    }

    Ok(CsvTransaction {
        title: record[TITLE_COLUMN].to_owned(),
        kind: TransactionType::from_str(&record[TYPE_COLUMN])?,
        value: Amount::from_str(&record[VALUE_COLUMN])?,
        category_title: record[CATEGORY_COLUMN].to_owned(),
    })
}

fn line_number(record: &StringRecord) -> u64 {
    record
        .position()
        .map(|position| position.line())
        .unwrap_or_default()
}
