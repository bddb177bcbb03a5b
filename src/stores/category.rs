//! Defines the category store trait.

use crate::{Error, category::Category, category::NewCategory};

/// Creates and retrieves transaction categories.
///
/// Implementers must not enforce unique titles themselves; callers look up a
/// title before creating it.
pub trait CategoryStore {
    /// Find the category whose title exactly matches `title`.
    ///
    /// If more than one category has the title, the one created first is returned.
    fn find_by_title(&self, title: &str) -> Result<Option<Category>, Error>;

    /// Find every category whose title is one of `titles`.
    ///
    /// `titles` may contain duplicates. Categories are returned in the order
    /// they were created.
    fn find_by_titles(&self, titles: &[String]) -> Result<Vec<Category>, Error>;

    /// Create a new category and add it to the store.
    fn create(&mut self, category: NewCategory) -> Result<Category, Error>;

    /// Create many categories in one batch.
    ///
    /// The returned categories are in the same order as `categories`.
    fn create_many(&mut self, categories: Vec<NewCategory>) -> Result<Vec<Category>, Error>;

    /// Get all categories.
    fn get_all(&self) -> Result<Vec<Category>, Error>;
}
