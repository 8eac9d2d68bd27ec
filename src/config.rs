//! Application paths and the persisted input/output directory settings.
//!
//! All locations are derived from an [`AppPaths`] value built once at startup
//! and handed to each store, so nothing here depends on process-wide state.
//!
//! # Settings File Format
//!
//! Settings are stored as a JSON object in `<data_dir>/settings.json`:
//!
//! ```json
//! {
//!   "input_dir": "/home/user/Pictures/unsorted",
//!   "output_dir": "/home/user/Pictures/sorted"
//! }
//! ```
//!
//! Missing keys fall back to the defaults and unknown keys are kept when the
//! document is rewritten.

use crate::storage::{self, PersistenceError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the settings document inside the data directory.
pub const SETTINGS_FILE: &str = "settings.json";
/// File name of the category document inside the data directory.
pub const CATEGORIES_FILE: &str = "categories.json";

const DATA_DIR: &str = "data";
const DEFAULT_INPUT_DIR: &str = "images";
const DEFAULT_OUTPUT_DIR: &str = "sorted-images";

/// Locations the application reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    root: PathBuf,
    data_dir: PathBuf,
}

impl AppPaths {
    /// Uses `root` for the default directories and `<root>/data` for the
    /// persisted documents.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let data_dir = root.join(DATA_DIR);
        Self { root, data_dir }
    }

    /// Like [`AppPaths::from_root`] but with an explicit data directory.
    pub fn with_data_dir(root: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir.join(CATEGORIES_FILE)
    }

    /// Directory scanned for images when none has been configured.
    pub fn default_input_dir(&self) -> PathBuf {
        self.root.join(DEFAULT_INPUT_DIR)
    }

    /// Directory sorted images go under when none has been configured.
    pub fn default_output_dir(&self) -> PathBuf {
        self.root.join(DEFAULT_OUTPUT_DIR)
    }
}

/// Errors surfaced by [`SettingsStore`] operations that write to disk.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Failed to create input directory {}: {source}", .path.display())]
    CreateInputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The resolved input and output directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Keys written by other versions, carried through untouched.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Settings {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            extra: Map::new(),
        }
    }

    /// Unknown keys found in the persisted document.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// On-disk shape where every known key is optional.
#[derive(Debug, Deserialize)]
struct StoredSettings {
    #[serde(default)]
    input_dir: Option<PathBuf>,
    #[serde(default)]
    output_dir: Option<PathBuf>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Reads and writes `settings.json`.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    file: PathBuf,
    default_input_dir: PathBuf,
    default_output_dir: PathBuf,
}

impl SettingsStore {
    pub fn new(paths: &AppPaths) -> Self {
        Self {
            file: paths.settings_file(),
            default_input_dir: paths.default_input_dir(),
            default_output_dir: paths.default_output_dir(),
        }
    }

    /// Path of the settings document.
    pub fn path(&self) -> &Path {
        &self.file
    }

    pub fn defaults(&self) -> Settings {
        Settings::new(&self.default_input_dir, &self.default_output_dir)
    }

    /// Loads the persisted document, merged over the defaults.
    ///
    /// Returns `Ok(None)` when no settings have been saved yet.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the file cannot be read, is not valid
    /// JSON, or has a known key of the wrong type.
    pub fn load_persisted(&self) -> Result<Option<Settings>, PersistenceError> {
        let Some(value) = storage::read_json(&self.file)? else {
            return Ok(None);
        };

        let stored: StoredSettings =
            serde_json::from_value(value).map_err(|e| PersistenceError::parse(&self.file, e))?;

        Ok(Some(Settings {
            input_dir: stored
                .input_dir
                .unwrap_or_else(|| self.default_input_dir.clone()),
            output_dir: stored
                .output_dir
                .unwrap_or_else(|| self.default_output_dir.clone()),
            extra: stored.extra,
        }))
    }

    /// Current settings, falling back to the defaults when the document is
    /// missing or corrupt. Never fails.
    pub fn get_settings(&self) -> Settings {
        match self.load_persisted() {
            Ok(Some(settings)) => settings,
            Ok(None) => self.defaults(),
            Err(e) => {
                log::warn!("{e}; using default settings");
                self.defaults()
            }
        }
    }

    /// Persists the full settings document.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        storage::write_json(&self.file, settings)?;
        Ok(())
    }

    /// Updates the input directory. The path is not checked until first use.
    pub fn set_input_dir(&self, path: impl Into<PathBuf>) -> Result<(), SettingsError> {
        let mut settings = self.get_settings();
        settings.input_dir = path.into();
        log::info!("Input directory set to {}", settings.input_dir.display());
        self.save(&settings)
    }

    /// Updates the output directory. The path is not checked until first use.
    pub fn set_output_dir(&self, path: impl Into<PathBuf>) -> Result<(), SettingsError> {
        let mut settings = self.get_settings();
        settings.output_dir = path.into();
        log::info!("Output directory set to {}", settings.output_dir.display());
        self.save(&settings)
    }

    /// Configured input directory, created if it does not exist yet.
    pub fn get_input_dir(&self) -> Result<PathBuf, SettingsError> {
        let input_dir = self.get_settings().input_dir;
        fs::create_dir_all(&input_dir).map_err(|e| SettingsError::CreateInputDir {
            path: input_dir.clone(),
            source: e,
        })?;
        Ok(input_dir)
    }

    /// Configured output directory. Category subdirectories are created lazily
    /// when images are sorted, so this does not touch the filesystem.
    pub fn get_output_dir(&self) -> PathBuf {
        self.get_settings().output_dir
    }
}
