//! Enumeration of the images waiting to be sorted.

use crate::config::{SettingsError, SettingsStore};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions (lowercase, without the dot) recognised as images.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Errors that can occur while listing the input directory.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Failed to read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// An image file found in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name including the extension.
    pub name: String,
    /// Lowercased extension without the dot.
    pub extension: String,
}

impl ImageFile {
    /// Builds an `ImageFile` if `path` has a supported image extension.
    ///
    /// Only the name is inspected; the file itself is not touched.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_string_lossy().to_lowercase();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return None;
        }
        let name = path.file_name()?.to_string_lossy().into_owned();

        Some(Self {
            path: path.to_path_buf(),
            name,
            extension,
        })
    }
}

/// Lists the image files directly inside `dir`, sorted by name ignoring case.
///
/// Subdirectories are not descended into.
pub fn scan_directory(dir: &Path) -> Result<Vec<ImageFile>, ScanError> {
    let entries = fs::read_dir(dir).map_err(|e| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut images: Vec<ImageFile> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| ImageFile::from_path(&path))
        .collect();

    images.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    log::debug!("Found {} images in {}", images.len(), dir.display());
    Ok(images)
}

/// Lists pending images from the configured input directory.
pub struct ImageEnumerator<'a> {
    settings: &'a SettingsStore,
}

impl<'a> ImageEnumerator<'a> {
    pub fn new(settings: &'a SettingsStore) -> Self {
        Self { settings }
    }

    /// Snapshot of the images currently in the input directory.
    ///
    /// The input directory is created if it does not exist, in which case the
    /// list is empty. Call again for a fresh view after sorting.
    pub fn list_images(&self) -> Result<Vec<ImageFile>, ScanError> {
        let input_dir = self.settings.get_input_dir()?;
        scan_directory(&input_dir)
    }
}
