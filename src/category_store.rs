//! Persisted, ordered set of categories.
//!
//! Categories live in `categories.json` as a JSON array of `{"name": ...}`
//! objects; array order is display order. Every mutation is a full
//! load-modify-save cycle of that document.

use crate::category::{Category, CategoryError, validate_category_name};
use crate::config::AppPaths;
use crate::storage::{self, PersistenceError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Reads and writes `categories.json`.
#[derive(Debug, Clone)]
pub struct CategoryStore {
    file: PathBuf,
}

impl CategoryStore {
    pub fn new(paths: &AppPaths) -> Self {
        Self {
            file: paths.categories_file(),
        }
    }

    /// Path of the category document.
    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Loads every persisted entry in document order.
    ///
    /// A missing file yields an empty list. Entries are returned exactly as
    /// stored, including names that break the naming rules and repeated
    /// names, so that writing the list back leaves the document unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the file cannot be read or is not an
    /// array of objects with a string `name`.
    pub fn load_persisted(&self) -> Result<Vec<Category>, PersistenceError> {
        let Some(value) = storage::read_json(&self.file)? else {
            return Ok(Vec::new());
        };

        serde_json::from_value(value).map_err(|e| PersistenceError::parse(&self.file, e))
    }

    /// Full document, or an empty one when it cannot be loaded.
    fn load_document(&self) -> Vec<Category> {
        self.load_persisted().unwrap_or_else(|e| {
            log::warn!("{e}; treating category list as empty");
            Vec::new()
        })
    }

    /// Current categories in display order. Never fails: an unreadable or
    /// malformed document reads as an empty list.
    ///
    /// A name repeated later in the document is listed once, at its first
    /// position. The repeat stays in the file.
    pub fn get_categories(&self) -> Vec<Category> {
        let mut seen = HashSet::new();
        self.load_document()
            .into_iter()
            .filter(|category| {
                let first = seen.insert(category.name().to_string());
                if !first {
                    log::debug!("Hiding repeated category '{}'", category.name());
                }
                first
            })
            .collect()
    }

    fn save(&self, categories: &[Category]) -> Result<(), PersistenceError> {
        storage::write_json(&self.file, categories)
    }

    /// Appends a new category.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or malformed name and
    /// [`CategoryError::Duplicate`] if the name is already taken.
    pub fn add_category(&self, name: &str) -> Result<(), CategoryError> {
        let category = Category::new(name)?;

        let mut categories = self.load_document();
        if categories.iter().any(|c| c.name() == name) {
            return Err(CategoryError::Duplicate(name.to_string()));
        }

        categories.push(category);
        self.save(&categories)?;
        log::info!("Added category '{name}'");
        Ok(())
    }

    /// Removes the category with this name, keeping the order of the rest.
    ///
    /// Repeated entries with the same name are removed too.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryError::NotFound`] if no category has this name.
    pub fn remove_category(&self, name: &str) -> Result<(), CategoryError> {
        let mut categories = self.load_document();
        let before = categories.len();
        categories.retain(|c| c.name() != name);
        if categories.len() == before {
            return Err(CategoryError::NotFound(name.to_string()));
        }

        self.save(&categories)?;
        log::info!("Removed category '{name}'");
        Ok(())
    }

    /// Renames a category in place; its position in the list is unchanged.
    ///
    /// Renaming a category to its current name succeeds without writing.
    /// Repeated entries with the old name are renamed along with it. Images
    /// already sorted under the old name are not moved.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `new_name` is malformed,
    /// [`CategoryError::Duplicate`] if another category already uses
    /// `new_name`, and [`CategoryError::NotFound`] if `old_name` does not exist.
    pub fn rename_category(&self, old_name: &str, new_name: &str) -> Result<(), CategoryError> {
        validate_category_name(new_name)?;

        let mut categories = self.load_document();
        if categories
            .iter()
            .any(|c| c.name() == new_name && c.name() != old_name)
        {
            return Err(CategoryError::Duplicate(new_name.to_string()));
        }

        if !categories.iter().any(|c| c.name() == old_name) {
            return Err(CategoryError::NotFound(old_name.to_string()));
        }

        if old_name == new_name {
            return Ok(());
        }

        for category in categories.iter_mut().filter(|c| c.name() == old_name) {
            *category = category.renamed(new_name)?;
        }
        self.save(&categories)?;
        log::info!("Renamed category '{old_name}' to '{new_name}'");
        Ok(())
    }
}
