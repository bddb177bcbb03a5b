//! Defines the category model.
//!
//! A category groups transactions under a title, e.g. "Food", "Bills" or "Job".
//! Categories are created on first use and are shared by every transaction that
//! refers to the same title.

use serde::{Deserialize, Serialize};

use crate::database_id::CategoryId;

/// A label for grouping transactions.
///
/// The title acts as the natural key of a category. Titles are compared
/// exactly: `"Food"`, `"food"` and `" Food"` are three different categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The title of the category.
    pub title: String,
}

/// A category that has not been saved to a store yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewCategory {
    /// The title of the category.
    pub title: String,
}

impl NewCategory {
    /// Create an unsaved category with `title`.
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_owned(),
        }
    }
}
