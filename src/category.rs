//! Category model and name validation.
//!
//! A category is a user-defined label that images are sorted into. Its name is
//! also the name of the output subdirectory, so names are restricted to
//! lowercase letters and digits joined by single hyphens.
//!
//! # Examples
//!
//! ```
//! use imgsort::category::{Category, validate_category_name};
//!
//! assert!(validate_category_name("nature-photos").is_ok());
//! assert!(validate_category_name("Nature Photos").is_err());
//!
//! let category = Category::new("city-views").unwrap();
//! assert_eq!(category.name(), "city-views");
//! ```
use crate::storage::PersistenceError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static CATEGORY_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("Invalid category name pattern")
});

/// Keys bound to the first ten categories, in display order.
pub const SHORTCUT_KEYS: [char; 10] = ['1', '2', '3', '4', '5', '6', '7', '8', '9', '0'];

/// Errors returned by category validation and the category store.
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category name cannot be empty.")]
    EmptyName,

    #[error(
        "Invalid category name '{0}'. Use lowercase letters and numbers separated by single hyphens, e.g. 'nature-photos', 'city-views', 'dogs'."
    )]
    InvalidName(String),

    #[error("Category '{0}' already exists.")]
    Duplicate(String),

    #[error("Category '{0}' not found.")]
    NotFound(String),

    #[error("Could not save categories: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Checks a category name against the naming rules.
///
/// # Errors
///
/// Returns [`CategoryError::EmptyName`] for an empty string and
/// [`CategoryError::InvalidName`] for anything else outside the pattern.
pub fn validate_category_name(name: &str) -> Result<(), CategoryError> {
    if name.is_empty() {
        return Err(CategoryError::EmptyName);
    }
    if !CATEGORY_NAME_PATTERN.is_match(name) {
        return Err(CategoryError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// A named category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    name: String,
    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    extra: Map<String, Value>,
}

impl Category {
    /// Creates a category after validating `name`.
    pub fn new(name: impl Into<String>) -> Result<Self, CategoryError> {
        let name = name.into();
        validate_category_name(&name)?;
        Ok(Self {
            name,
            extra: Map::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a copy of this category under a new, validated name.
    ///
    /// Fields other than the name are carried over.
    pub fn renamed(&self, new_name: impl Into<String>) -> Result<Self, CategoryError> {
        let mut renamed = Self::new(new_name)?;
        renamed.extra = self.extra.clone();
        Ok(renamed)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Shortcut key for the category at `index`, if it has one.
pub fn shortcut_key(index: usize) -> Option<char> {
    SHORTCUT_KEYS.get(index).copied()
}

/// Category index bound to `key`, if any.
pub fn index_for_key(key: char) -> Option<usize> {
    SHORTCUT_KEYS.iter().position(|&k| k == key)
}
