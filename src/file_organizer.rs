/// Moving images into category directories.
///
/// This module relocates a single image into `<output_dir>/<category>/`,
/// creating the directory on demand and picking a free file name when the
/// destination is already taken. It never reads or writes category or settings
/// state beyond resolving the output directory.
use crate::config::SettingsStore;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while sorting an image.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The image to sort does not exist (or is not a regular file).
    #[error("Image not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    /// The category cannot be used as a single directory name.
    #[error("'{name}' cannot be used as a category directory name")]
    InvalidCategoryDir { name: String },

    /// Failed to create the category directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// Failed to move the image to its destination.
    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// Result type for sorting operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Record of a completed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedFile {
    /// Where the image was before sorting.
    pub original_path: PathBuf,
    /// Where the image is now.
    pub destination: PathBuf,
    /// The category it was sorted into.
    pub category: String,
}

impl SortedFile {
    /// True when the image had to be given a disambiguated name.
    pub fn was_renamed(&self) -> bool {
        self.original_path.file_name() != self.destination.file_name()
    }
}

/// Moves files into category subdirectories of an output directory.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves `file_path` into `output_dir/category`, returning where it landed.
    ///
    /// Missing directories are created. If a file with the same name is already
    /// there, `_1`, `_2`, ... is appended to the stem until a free name is
    /// found. On failure the image is left where it was.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use imgsort::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let sorted = FileOrganizer::move_to_category(
    ///     Path::new("/photos/sorted"),
    ///     Path::new("/photos/inbox/beach.jpg"),
    ///     "holidays",
    /// )?;
    /// println!("Moved to {}", sorted.destination.display());
    /// # Ok::<(), imgsort::file_organizer::OrganizeError>(())
    /// ```
    pub fn move_to_category(
        output_dir: &Path,
        file_path: &Path,
        category: &str,
    ) -> OrganizeResult<SortedFile> {
        if !file_path.is_file() {
            return Err(OrganizeError::SourceNotFound {
                path: file_path.to_path_buf(),
            });
        }

        let category_path = Self::category_dir(output_dir, category)?;
        fs::create_dir_all(&category_path).map_err(|e| {
            OrganizeError::DirectoryCreationFailed {
                path: category_path.clone(),
                source: e,
            }
        })?;

        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::SourceNotFound {
                path: file_path.to_path_buf(),
            })?;
        let destination = Self::free_destination(&category_path, file_name);

        Self::move_file(file_path, &destination).map_err(|e| OrganizeError::FileMoveFailure {
            from: file_path.to_path_buf(),
            to: destination.clone(),
            source: e,
        })?;

        log::debug!(
            "Moved {} to {}",
            file_path.display(),
            destination.display()
        );

        Ok(SortedFile {
            original_path: file_path.to_path_buf(),
            destination,
            category: category.to_string(),
        })
    }

    /// Joins `category` onto `output_dir`, refusing anything that is not a
    /// single plain path component.
    fn category_dir(output_dir: &Path, category: &str) -> OrganizeResult<PathBuf> {
        let mut components = Path::new(category).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(output_dir.join(category)),
            _ => Err(OrganizeError::InvalidCategoryDir {
                name: category.to_string(),
            }),
        }
    }

    /// First unused path for `file_name` inside `dir`.
    fn free_destination(dir: &Path, file_name: &OsStr) -> PathBuf {
        let candidate = dir.join(file_name);
        if !Self::is_taken(&candidate) {
            return candidate;
        }

        let original = Path::new(file_name);
        let stem = original.file_stem().unwrap_or(file_name);
        let extension = original.extension();

        let mut counter: u64 = 1;
        loop {
            let mut name = OsString::from(stem);
            name.push(format!("_{counter}"));
            if let Some(ext) = extension {
                name.push(".");
                name.push(ext);
            }

            let candidate = dir.join(name);
            if !Self::is_taken(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn is_taken(path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    /// Renames `from` to `to`, copying and deleting when the rename crosses
    /// filesystems.
    fn move_file(from: &Path, to: &Path) -> io::Result<()> {
        Self::move_with(from, to, |from, to| fs::rename(from, to))
    }

    fn move_with(
        from: &Path,
        to: &Path,
        rename: impl FnOnce(&Path, &Path) -> io::Result<()>,
    ) -> io::Result<()> {
        match rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                log::debug!(
                    "Rename across devices refused, copying {} instead",
                    from.display()
                );
                Self::copy_then_remove(from, to, |path| fs::remove_file(path))
            }
            Err(e) => Err(e),
        }
    }

    /// Copy-and-delete move. Exactly one of `from` and `to` exists afterwards.
    ///
    /// `remove_source` deletes `from` once the copy is on disk.
    fn copy_then_remove(
        from: &Path,
        to: &Path,
        remove_source: impl FnOnce(&Path) -> io::Result<()>,
    ) -> io::Result<()> {
        let mut reader = File::open(from)?;
        let mut writer = OpenOptions::new().write(true).create_new(true).open(to)?;

        // `to` was created above, so it is ours to delete if anything fails.
        let result = io::copy(&mut reader, &mut writer)
            .and_then(|_| writer.sync_all())
            .and_then(|()| writer.set_permissions(reader.metadata()?.permissions()))
            .and_then(|()| remove_source(from));

        if let Err(e) = result {
            drop(writer);
            if let Err(cleanup) = fs::remove_file(to) {
                log::warn!(
                    "Could not remove partial copy {}: {}",
                    to.display(),
                    cleanup
                );
            }
            return Err(e);
        }
        Ok(())
    }
}

/// Sorts images into the configured output directory.
pub struct Sorter<'a> {
    settings: &'a SettingsStore,
}

impl<'a> Sorter<'a> {
    pub fn new(settings: &'a SettingsStore) -> Self {
        Self { settings }
    }

    /// Moves `image_path` into `<output_dir>/<category>/`.
    ///
    /// The category does not have to be registered in the category store.
    pub fn sort_image(&self, image_path: &Path, category: &str) -> OrganizeResult<SortedFile> {
        let output_dir = self.settings.get_output_dir();
        let sorted = FileOrganizer::move_to_category(&output_dir, image_path, category)?;
        log::info!(
            "Sorted {} into '{}'",
            sorted.destination.display(),
            category
        );
        Ok(sorted)
    }
}
