use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::Read,
    path::Path,
    time::Instant,
};

use crate::{
    Error,
    category::{Category, NewCategory},
    csv_import::csv::parse_csv,
    database_id::CategoryId,
    stores::{CategoryStore, TransactionStore},
    transaction::{Transaction, TransactionBuilder},
};

/// Deletes import source files once they have been imported.
pub trait FileRemover {
    /// Delete the file at `path`.
    fn remove(&self, path: &Path) -> std::io::Result<()>;
}

/// Deletes files from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileRemover;

impl FileRemover for FsFileRemover {
    fn remove(&self, path: &Path) -> std::io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Imports transactions from CSV files in bulk.
///
/// Unlike [TransactionCreator](crate::TransactionCreator), imports do not check
/// the balance, so an import can leave the balance total negative.
pub struct BulkImporter<C, T, F = FsFileRemover> {
    category_store: C,
    transaction_store: T,
    file_remover: F,
}

impl<C, T> BulkImporter<C, T>
where
    C: CategoryStore,
    T: TransactionStore,
{
    /// Create an importer that saves to the given stores and deletes imported
    /// files from the file system.
    pub fn new(category_store: C, transaction_store: T) -> Self {
        Self {
            category_store,
            transaction_store,
            file_remover: FsFileRemover,
        }
    }
}

impl<C, T, F> BulkImporter<C, T, F>
where
    C: CategoryStore,
    T: TransactionStore,
    F: FileRemover,
{
    /// Replace the way imported files are deleted.
    pub fn with_file_remover<G: FileRemover>(self, file_remover: G) -> BulkImporter<C, T, G> {
        BulkImporter {
            category_store: self.category_store,
            transaction_store: self.transaction_store,
            file_remover,
        }
    }

    /// Import the transactions in the CSV file at `path` and then delete the file.
    ///
    /// See [BulkImporter::import_from_reader] for the import itself.
    /// The file is only deleted if the import succeeds. Failing to delete the
    /// file is logged as a warning and does not fail the import.
    ///
    /// # Errors
    /// Returns an [Error::SourceUnreadable] if the file cannot be opened, or
    /// any error from [BulkImporter::import_from_reader].
    pub fn import_file(&mut self, path: &Path) -> Result<Vec<Transaction>, Error> {
        let file = File::open(path).map_err(|error| {
            tracing::error!("Could not open import file {}: {error}", path.display());
            Error::SourceUnreadable(format!("could not open {}: {error}", path.display()))
        })?;

        let transactions = self.import_from_reader(file)?;

        if let Err(error) = self.file_remover.remove(path) {
            tracing::warn!(
                "Imported {} transactions but could not delete {}: {error}",
                transactions.len(),
                path.display()
            );
        }

        Ok(transactions)
    }

    /// Import the transactions in the CSV data from `reader`.
    ///
    /// The whole of `reader` is parsed before anything is saved, so a malformed
    /// row means nothing is imported. Missing categories are then created in
    /// one batch, in the order their titles first appear, and the transactions
    /// are saved in one batch.
    ///
    /// The returned transactions are in the same order as the CSV rows.
    ///
    /// # Errors
    /// Returns any error from [parse_csv] or from the stores.
    pub fn import_from_reader<R: Read>(&mut self, reader: R) -> Result<Vec<Transaction>, Error> {
        let start_time = Instant::now();

        let parse_result = parse_csv(reader)?;
        let categories = self.resolve_categories(&parse_result.category_titles)?;

        let mut category_ids: HashMap<&str, CategoryId> = HashMap::new();
        for category in &categories {
            category_ids
                .entry(category.title.as_str())
                .or_insert(category.id);
        }

        let builders: Vec<TransactionBuilder> = parse_result
            .transactions
            .into_iter()
            .map(|transaction| {
                let category_id = category_ids.get(transaction.category_title.as_str()).copied();

                if category_id.is_none() {
                    tracing::warn!(
                        "Could not resolve category \"{}\" for imported transaction \"{}\", \
                        it will be saved without a category",
                        transaction.category_title,
                        transaction.title
                    );
                }

                Transaction::build(&transaction.title, transaction.value, transaction.kind)
                    .category_id(category_id)
            })
            .collect();

        let imported_transactions = self.transaction_store.create_many(builders)?;

        tracing::info!(
            "Imported {} transactions in {}ms",
            imported_transactions.len(),
            start_time.elapsed().as_millis()
        );

        Ok(imported_transactions)
    }

    /// Find the stored categories for `titles` and create the ones that are missing.
    fn resolve_categories(&mut self, titles: &[String]) -> Result<Vec<Category>, Error> {
        let mut seen = HashSet::new();
        let distinct_titles: Vec<String> = titles
            .iter()
            .filter(|title| seen.insert(title.as_str()))
            .cloned()
            .collect();

        let mut categories = self.category_store.find_by_titles(&distinct_titles)?;

        let stored_titles: HashSet<&str> = categories
            .iter()
            .map(|category| category.title.as_str())
            .collect();
        let categories_to_add: Vec<NewCategory> = distinct_titles
            .iter()
            .filter(|title| !stored_titles.contains(title.as_str()))
            .map(|title| NewCategory::new(title))
            .collect();

        tracing::debug!(
            "Found {} stored categories, creating {} new categories",
            categories.len(),
            categories_to_add.len()
        );

        if !categories_to_add.is_empty() {
            let created = self.category_store.create_many(categories_to_add)?;
            categories.extend(created);
        }

        Ok(categories)
    }
}

#[cfg(test)]
mod import_transactions_tests {
    use std::{
        cell::RefCell,
        io::Write,
        path::{Path, PathBuf},
        rc::Rc,
    };

    use rust_decimal_macros::dec;
    use tempfile::NamedTempFile;

    use crate::{
        Amount, BalanceCalculator, BulkImporter, Error, TransactionCreator, TransactionType,
        category::{Category, NewCategory},
        csv_import::import_transactions::FileRemover,
        stores::{
            CategoryStore, TransactionStore,
            memory::{InMemoryCategoryStore, InMemoryTransactionStore},
        },
    };

    pub(super) const EXAMPLE_CSV: &str = "title,type,value,category\n\
        Lunch,outcome,20,Food\n\
        Bonus,income,200,Job\n";

    fn get_test_stores() -> (InMemoryCategoryStore, InMemoryTransactionStore) {
        (InMemoryCategoryStore::new(), InMemoryTransactionStore::new())
    }

    fn must_write_csv(text: &str) -> PathBuf {
        let mut file = NamedTempFile::new().expect("Could not create temp file");
        file.write_all(text.as_bytes()).unwrap();
        let (_, path) = file.keep().expect("Could not keep temp file");
        path
    }

    fn category_titles(store: &InMemoryCategoryStore) -> Vec<String> {
        store
            .get_all()
            .unwrap()
            .into_iter()
            .map(|category| category.title)
            .collect()
    }

    #[test]
    fn imports_example_csv() {
        let (categories, transactions) = get_test_stores();
        let mut importer = BulkImporter::new(categories.clone(), transactions.clone());

        let imported = importer.import_from_reader(EXAMPLE_CSV.as_bytes()).unwrap();

        assert_eq!(imported.len(), 2);
        assert_eq!(category_titles(&categories), vec!["Food", "Job"]);
        let balance = BalanceCalculator::new(&transactions)
            .compute_balance()
            .unwrap();
        assert_eq!(balance.total, dec!(180));
    }

    #[test]
    fn preserves_source_order() {
        let (categories, transactions) = get_test_stores();
        let mut importer = BulkImporter::new(categories, transactions.clone());
        let text = "title,type,value,category\n\
            a,income,1,X\n\
            b,outcome,2,Y\n\
            c,income,3,X\n\
            d,outcome,4,Z\n";

        let imported = importer.import_from_reader(text.as_bytes()).unwrap();

        let titles: Vec<&str> = imported.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c", "d"]);
        assert_eq!(transactions.get_all().unwrap(), imported);
    }

    #[test]
    fn creates_each_distinct_category_once() {
        let (categories, transactions) = get_test_stores();
        let mut importer = BulkImporter::new(categories.clone(), transactions);
        let text = "title,type,value,category\n\
            Lunch,outcome,20,Food\n\
            Salary,income,3000,Job\n\
            Dinner,outcome,35,Food\n\
            Snack,outcome,5,Food\n";

        let imported = importer.import_from_reader(text.as_bytes()).unwrap();

        assert_eq!(category_titles(&categories), vec!["Food", "Job"]);
        assert_eq!(imported[0].category_id, imported[2].category_id);
        assert_eq!(imported[0].category_id, imported[3].category_id);
        assert_ne!(imported[0].category_id, imported[1].category_id);
    }

    #[test]
    fn reuses_stored_categories() {
        let (mut categories, transactions) = get_test_stores();
        let food = categories.create(NewCategory::new("Food")).unwrap();
        let job = categories.create(NewCategory::new("Job")).unwrap();
        let mut importer = BulkImporter::new(categories.clone(), transactions);

        let imported = importer.import_from_reader(EXAMPLE_CSV.as_bytes()).unwrap();

        assert_eq!(categories.get_all().unwrap(), vec![food.clone(), job.clone()]);
        assert_eq!(imported[0].category_id, Some(food.id));
        assert_eq!(imported[1].category_id, Some(job.id));
    }

    #[test]
    fn does_not_check_balance() {
        let (categories, transactions) = get_test_stores();
        let mut importer = BulkImporter::new(categories, transactions.clone());
        let text = "title,type,value,category\nRent,outcome,500,Bills\n";

        let imported = importer.import_from_reader(text.as_bytes()).unwrap();

        assert_eq!(imported[0].kind, TransactionType::Outcome);
        let balance = BalanceCalculator::new(&transactions)
            .compute_balance()
            .unwrap();
        assert_eq!(balance.total, dec!(-500));
    }

    #[test]
    fn oversized_import_makes_balance_an_error() {
        let (categories, transactions) = get_test_stores();
        let mut importer = BulkImporter::new(categories.clone(), transactions.clone());
        let text = "title,type,value,category\n\
            a,income,79228162514264337593543950335,X\n\
            b,income,79228162514264337593543950335,X\n";

        let imported = importer.import_from_reader(text.as_bytes()).unwrap();

        assert_eq!(imported.len(), 2);
        assert_eq!(
            BalanceCalculator::new(&transactions).compute_balance(),
            Err(Error::BalanceOverflow)
        );
        let result = TransactionCreator::new(categories, transactions.clone()).create(
            "Lunch",
            "20".parse::<Amount>().unwrap(),
            TransactionType::Outcome,
            "Food",
        );
        assert_eq!(result, Err(Error::BalanceOverflow));
        assert_eq!(transactions.get_all().unwrap().len(), 2);
    }

    #[test]
    fn invalid_row_saves_nothing() {
        let (categories, transactions) = get_test_stores();
        let mut importer = BulkImporter::new(categories.clone(), transactions.clone());
        let text = "title,type,value,category\n\
            Lunch,outcome,20,Food\n\
            Bonus,bonus,200,Job\n";

        let result = importer.import_from_reader(text.as_bytes());

        assert_eq!(result, Err(Error::InvalidTransactionType("bonus".to_owned())));
        assert!(categories.get_all().unwrap().is_empty());
        assert!(transactions.get_all().unwrap().is_empty());
    }

    #[test]
    fn import_file_deletes_file() {
        let (categories, transactions) = get_test_stores();
        let mut importer = BulkImporter::new(categories, transactions);
        let path = must_write_csv(EXAMPLE_CSV);

        let imported = importer.import_file(&path).unwrap();

        assert_eq!(imported.len(), 2);
        assert!(!path.exists(), "want {path:?} to be deleted after import");
    }

    #[test]
    fn failed_import_keeps_file() {
        let (categories, transactions) = get_test_stores();
        let mut importer = BulkImporter::new(categories, transactions);
        let path = must_write_csv("title,type,value,category\nLunch,outcome,lots,Food\n");

        let result = importer.import_file(&path);

        assert_eq!(result, Err(Error::InvalidAmount("lots".to_owned())));
        assert!(path.exists(), "want {path:?} to be kept after a failed import");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_unreadable() {
        let (categories, transactions) = get_test_stores();
        let mut importer = BulkImporter::new(categories, transactions);
        let directory = tempfile::tempdir().unwrap();

        let result = importer.import_file(&directory.path().join("missing.csv"));

        assert!(matches!(result, Err(Error::SourceUnreadable(_))), "got {result:?}");
    }

    struct FailingFileRemover {
        attempts: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl FileRemover for FailingFileRemover {
        fn remove(&self, path: &Path) -> std::io::Result<()> {
            self.attempts.borrow_mut().push(path.to_owned());
            Err(std::io::Error::other("permission denied"))
        }
    }

    #[test]
    fn failed_delete_does_not_fail_import() {
        let (categories, transactions) = get_test_stores();
        let attempts = Rc::new(RefCell::new(Vec::new()));
        let mut importer = BulkImporter::new(categories, transactions.clone()).with_file_remover(
            FailingFileRemover {
                attempts: attempts.clone(),
            },
        );
        let path = must_write_csv(EXAMPLE_CSV);

        let result = importer.import_file(&path);

        assert!(result.is_ok(), "got {result:?}");
        assert_eq!(transactions.get_all().unwrap().len(), 2);
        assert_eq!(*attempts.borrow(), vec![path.clone()]);
        std::fs::remove_file(&path).unwrap();
    }

    /// A category store that never finds or keeps any categories, so that
    /// imported category titles cannot be resolved.
    #[derive(Default)]
    struct ForgetfulCategoryStore;

    impl CategoryStore for ForgetfulCategoryStore {
        fn find_by_title(&self, _title: &str) -> Result<Option<Category>, Error> {
            Ok(None)
        }

        fn find_by_titles(&self, _titles: &[String]) -> Result<Vec<Category>, Error> {
            Ok(Vec::new())
        }

        fn create(&mut self, category: NewCategory) -> Result<Category, Error> {
            Ok(Category {
                id: 1,
                title: category.title.to_uppercase(),
            })
        }

        fn create_many(&mut self, categories: Vec<NewCategory>) -> Result<Vec<Category>, Error> {
            categories
                .into_iter()
                .map(|category| self.create(category))
                .collect()
        }

        fn get_all(&self) -> Result<Vec<Category>, Error> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn unresolved_category_saves_transaction_without_category() {
        let transactions = InMemoryTransactionStore::new();
        let mut importer = BulkImporter::new(ForgetfulCategoryStore, transactions.clone());

        let imported = importer.import_from_reader(EXAMPLE_CSV.as_bytes()).unwrap();

        assert_eq!(imported.len(), 2);
        assert!(imported.iter().all(|t| t.category_id.is_none()));
    }
}
