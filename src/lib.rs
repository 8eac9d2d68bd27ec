//! imgsort - sort a folder of images into named categories
//!
//! This library provides the persisted category list and directory settings,
//! enumeration of the images waiting in the input directory, and the move that
//! files an image under `<output_dir>/<category>/` without overwriting
//! anything already there.

pub mod category;
pub mod category_store;
pub mod cli;
pub mod config;
pub mod file_organizer;
pub mod images;
pub mod output;
pub mod storage;

pub use category::{Category, CategoryError, validate_category_name};
pub use category_store::CategoryStore;
pub use config::{AppPaths, Settings, SettingsError, SettingsStore};
pub use file_organizer::{FileOrganizer, OrganizeError, SortedFile, Sorter};
pub use images::{ImageEnumerator, ImageFile, ScanError};
pub use storage::PersistenceError;

pub use cli::{Cli, run_cli};
