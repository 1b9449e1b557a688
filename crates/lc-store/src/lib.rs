//! # lc-store
//!
//! The explorer's single persisted slot: a JSON file holding the object
//! array with its annotations and snapshots, overwritten on every change.
//! The layout matches the browser slot `rle_annotations_v1`, so files can be
//! moved between the two.
//!
//! A sidecar `<slot>.cursor.json` remembers which object is selected.

mod error;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use lc_core::ObservedObject;
use serde::{Deserialize, Serialize};

pub use error::StoreError;

/// Remembered selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(rename = "objectId", default)]
    pub object_id: Option<String>,
}

/// File-backed state slot.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    path: PathBuf,
}

impl ObjectStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn cursor_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_default();
        name.push(".cursor.json");
        self.path.with_file_name(name)
    }

    /// Load the persisted collection.
    ///
    /// A missing slot is an empty collection. A slot that does not parse is
    /// logged and also treated as empty; it is replaced on the next save.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file exists but cannot be read.
    pub fn load(&self) -> Result<Vec<ObservedObject>, StoreError> {
        let Some(text) = read_optional(&self.path)? else {
            tracing::debug!(path = %self.path.display(), "no saved state");
            return Ok(Vec::new());
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<ObservedObject>>(&text) {
            Ok(objects) => {
                tracing::debug!(path = %self.path.display(), objects = objects.len(), "loaded state");
                Ok(objects)
            }
            Err(error) => {
                tracing::warn!(%error, path = %self.path.display(), "ignoring unreadable saved state");
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the slot with `objects`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, objects: &[ObservedObject]) -> Result<(), StoreError> {
        let json = serde_json::to_string(objects)?;
        write_creating_parent(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), objects = objects.len(), bytes = json.len(), "saved state");
        Ok(())
    }

    /// Load the remembered selection. Missing or unreadable means none.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file exists but cannot be read.
    pub fn load_cursor(&self) -> Result<Cursor, StoreError> {
        let path = self.cursor_path();
        let Some(text) = read_optional(&path)? else {
            return Ok(Cursor::default());
        };
        Ok(serde_json::from_str(&text).unwrap_or_else(|error| {
            tracing::warn!(%error, path = %path.display(), "ignoring unreadable cursor");
            Cursor::default()
        }))
    }

    /// Remember the selected object.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the cursor file cannot be written.
    pub fn save_cursor(&self, cursor: &Cursor) -> Result<(), StoreError> {
        write_creating_parent(&self.cursor_path(), &serde_json::to_string(cursor)?)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_creating_parent(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}
