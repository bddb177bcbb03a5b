//! Implements a SQLite backed category store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};

use crate::{
    Error,
    category::{Category, NewCategory},
    db::{CreateTable, MapRow},
    stores::{CategoryStore, sqlite::lock_connection},
};

/// The most titles bound to a single `IN (...)` query, kept well below
/// SQLite's limit on host parameters.
const TITLES_PER_QUERY: usize = 500;

/// Creates and retrieves transaction categories to/from a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCategoryStore {
    /// Create a new category store with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CategoryStore for SQLiteCategoryStore {
    /// Retrieve the oldest category titled `title`.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn find_by_title(&self, title: &str) -> Result<Option<Category>, Error> {
        lock_connection(&self.connection)?
            .prepare("SELECT id, title FROM category WHERE title = :title ORDER BY id LIMIT 1;")?
            .query_row(&[(":title", title)], SQLiteCategoryStore::map_row)
            .optional()
            .map_err(|error| error.into())
    }

    /// Retrieve the categories whose title is in `titles`, ordered by ID.
    ///
    /// Titles are looked up [TITLES_PER_QUERY] at a time.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn find_by_titles(&self, titles: &[String]) -> Result<Vec<Category>, Error> {
        let connection = lock_connection(&self.connection)?;
        let mut categories = Vec::new();

        for chunk in titles.chunks(TITLES_PER_QUERY) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let query = format!("SELECT id, title FROM category WHERE title IN ({placeholders});");

            let found = connection
                .prepare(&query)?
                .query_map(params_from_iter(chunk.iter()), SQLiteCategoryStore::map_row)?
                .collect::<Result<Vec<_>, rusqlite::Error>>()?;

            categories.extend(found);
        }

        // A title repeated across chunks matches the same rows more than once.
        categories.sort_by_key(|category| category.id);
        categories.dedup_by_key(|category| category.id);

        Ok(categories)
    }

    /// Create a category in the database.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn create(&mut self, category: NewCategory) -> Result<Category, Error> {
        let connection = lock_connection(&self.connection)?;
        connection.execute(
            "INSERT INTO category (title) VALUES (?1);",
            (category.title.as_str(),),
        )?;

        let id = connection.last_insert_rowid();

        Ok(Category {
            id,
            title: category.title,
        })
    }

    /// Create all of `categories` inside a single SQL transaction.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error, in which
    /// case none of the categories are saved.
    fn create_many(&mut self, categories: Vec<NewCategory>) -> Result<Vec<Category>, Error> {
        let connection = lock_connection(&self.connection)?;
        let tx = connection.unchecked_transaction()?;
        let mut created = Vec::with_capacity(categories.len());

        let mut stmt = tx.prepare("INSERT INTO category (title) VALUES (?1) RETURNING id, title;")?;

        for category in categories {
            created.push(stmt.query_row((category.title,), SQLiteCategoryStore::map_row)?);
        }

        drop(stmt);

        tx.commit()?;
        Ok(created)
    }

    /// Retrieve all categories in the database.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn get_all(&self) -> Result<Vec<Category>, Error> {
        lock_connection(&self.connection)?
            .prepare("SELECT id, title FROM category ORDER BY id;")?
            .query_map([], SQLiteCategoryStore::map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }
}

impl CreateTable for SQLiteCategoryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        // Titles are deliberately not UNIQUE, see `CategoryStore`.
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_category_title ON category(title);",
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteCategoryStore {
    type ReturnType = Category;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let title = row.get(offset + 1)?;

        Ok(Self::ReturnType { id, title })
    }
}

#[cfg(test)]
mod category_tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{category::NewCategory, db::initialize};

    use super::{CategoryStore, SQLiteCategoryStore};

    fn get_test_store() -> SQLiteCategoryStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        SQLiteCategoryStore::new(connection)
    }

    #[test]
    fn create_category_succeeds() {
        let mut store = get_test_store();

        let category = store.create(NewCategory::new("Categorically a category")).unwrap();

        assert!(category.id > 0);
        assert_eq!(category.title, "Categorically a category");
    }

    #[test]
    fn find_by_title_succeeds() {
        let mut store = get_test_store();
        let inserted_category = store.create(NewCategory::new("Foo")).unwrap();

        let selected_category = store.find_by_title("Foo");

        assert_eq!(Ok(Some(inserted_category)), selected_category);
    }

    #[test]
    fn find_by_title_returns_none_for_missing_title() {
        let mut store = get_test_store();
        store.create(NewCategory::new("Foo")).unwrap();

        assert_eq!(store.find_by_title("foo"), Ok(None));
        assert_eq!(store.find_by_title("Foo "), Ok(None));
    }

    #[test]
    fn find_by_title_returns_oldest_duplicate() {
        let mut store = get_test_store();
        let first = store.create(NewCategory::new("Foo")).unwrap();
        store.create(NewCategory::new("Foo")).unwrap();

        assert_eq!(store.find_by_title("Foo"), Ok(Some(first)));
    }

    #[test]
    fn find_by_titles_returns_matches_only() {
        let mut store = get_test_store();
        let foo = store.create(NewCategory::new("Foo")).unwrap();
        store.create(NewCategory::new("Bar")).unwrap();
        let baz = store.create(NewCategory::new("Baz")).unwrap();

        let found = store
            .find_by_titles(&[
                "Foo".to_owned(),
                "Baz".to_owned(),
                "Foo".to_owned(),
                "Qux".to_owned(),
            ])
            .unwrap();

        assert_eq!(found, vec![foo, baz]);
    }

    #[test]
    fn find_by_titles_with_no_titles_returns_empty() {
        let mut store = get_test_store();
        store.create(NewCategory::new("Foo")).unwrap();

        assert_eq!(store.find_by_titles(&[]), Ok(Vec::new()));
    }

    #[test]
    fn find_by_titles_handles_more_titles_than_one_query() {
        let mut store = get_test_store();
        let titles: Vec<String> = (0..1234).map(|i| format!("Category {i}")).collect();
        let created = store
            .create_many(titles.iter().map(|title| NewCategory::new(title)).collect())
            .unwrap();
        let mut wanted_titles = titles.clone();
        wanted_titles.reverse();
        wanted_titles.push("Missing".to_owned());
        wanted_titles.push("Category 0".to_owned());

        let found = store.find_by_titles(&wanted_titles).unwrap();

        assert_eq!(found, created);
    }

    #[test]
    fn create_many_preserves_order() {
        let mut store = get_test_store();

        let created = store
            .create_many(vec![NewCategory::new("Food"), NewCategory::new("Job")])
            .unwrap();

        let titles: Vec<&str> = created.iter().map(|category| category.title.as_str()).collect();
        assert_eq!(titles, vec!["Food", "Job"]);
        assert!(created[0].id < created[1].id);
    }

    #[test]
    fn get_all_categories() {
        let mut store = get_test_store();

        let inserted_categories = HashSet::from([
            store.create(NewCategory::new("Foo")).unwrap(),
            store.create(NewCategory::new("Bar")).unwrap(),
        ]);

        let selected_categories = store.get_all().unwrap();
        let selected_categories = HashSet::from_iter(selected_categories);

        assert_eq!(inserted_categories, selected_categories);
    }
}
