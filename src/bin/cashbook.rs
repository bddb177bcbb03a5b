use std::{error::Error, path::PathBuf, process::ExitCode, str::FromStr};

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;

use cashbook_rs::{
    Amount, Balance, BalanceCalculator, BulkImporter, Transaction, TransactionCreator,
    TransactionType, setup_logging,
    stores::{CategoryStore, TransactionStore, sqlite::create_stores},
};

/// Records income and outcome transactions and keeps a running balance.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database. Created if it does not exist.
    #[arg(long, env = "CASHBOOK_DB_PATH")]
    db_path: PathBuf,

    /// Also append debug logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a transaction. Outcomes larger than the balance are rejected.
    Create {
        /// What the transaction was for.
        #[arg(long)]
        title: String,

        /// How much money was earned or spent, e.g. `12.50`.
        #[arg(long)]
        value: String,

        /// Either `income` or `outcome`.
        #[arg(long = "type")]
        kind: String,

        /// The category title, the category is created if it does not exist.
        #[arg(long)]
        category: String,
    },

    /// Import transactions from a CSV file with the columns `title,type,value,category`.
    ///
    /// The file is deleted after a successful import.
    Import {
        /// The CSV file to import.
        csv_path: PathBuf,
    },

    /// Show the income, outcome and total of all transactions.
    Balance,

    /// Show every transaction along with the balance.
    List,

    /// Show every category.
    Categories,
}

#[derive(Serialize)]
struct TransactionList {
    transactions: Vec<Transaction>,
    balance: Balance,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging(args.log_file.as_deref()) {
        eprintln!("Could not open log file: {error}");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    tracing::debug!("Opening database at {:?}", args.db_path);
    let connection = Connection::open(&args.db_path)?;
    let (category_store, transaction_store) = create_stores(connection)?;

    match args.command {
        Command::Create {
            title,
            value,
            kind,
            category,
        } => {
            let value = Amount::from_str(&value)?;
            let kind = TransactionType::from_str(&kind)?;

            let transaction = TransactionCreator::new(category_store, transaction_store)
                .create(&title, value, kind, &category)?;

            print_json(&transaction)
        }
        Command::Import { csv_path } => {
            let transactions =
                BulkImporter::new(category_store, transaction_store).import_file(&csv_path)?;

            print_json(&transactions)
        }
        Command::Balance => {
            let balance = BalanceCalculator::new(&transaction_store).compute_balance()?;

            print_json(&balance)
        }
        Command::List => {
            let transactions = transaction_store.get_all()?;
            let balance = Balance::from_transactions(&transactions)?;

            print_json(&TransactionList {
                transactions,
                balance,
            })
        }
        Command::Categories => print_json(&category_store.get_all()?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}
