//! JSON document persistence shared by the settings and category stores.
//!
//! Each store owns exactly one document. Reads distinguish a missing file
//! (`Ok(None)`) from an unreadable or malformed one (`Err`), so the stores can
//! decide how to recover. Writes go through a temporary file in the same
//! directory that is renamed over the target, so a reader never observes a
//! half-written document.

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors raised while reading or writing a persisted JSON document.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The document exists but could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The document is not valid JSON, or does not have the expected shape.
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The document could not be serialized.
    #[error("Failed to serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The document (or its directory) could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl PersistenceError {
    pub(crate) fn parse(path: &Path, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads a JSON document, returning `Ok(None)` when the file does not exist.
pub fn read_json(path: &Path) -> Result<Option<Value>, PersistenceError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(PersistenceError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| PersistenceError::parse(path, e))
}

/// Serializes `value` as pretty-printed JSON and atomically replaces `path`.
///
/// Missing parent directories are created.
pub fn write_json<T>(path: &Path, value: &T) -> Result<(), PersistenceError>
where
    T: Serialize + ?Sized,
{
    let write_error = |source: io::Error| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_error)?;

    let mut json =
        serde_json::to_string_pretty(value).map_err(|e| PersistenceError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;
    json.push('\n');

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(json.as_bytes()).map_err(write_error)?;
    tmp.as_file().sync_all().map_err(write_error)?;
    tmp.persist(path).map_err(|e| write_error(e.error))?;

    log::debug!("Wrote {}", path.display());
    Ok(())
}
