//! Local persistence of the flat file list.
//!
//! A single JSON document at `$XDG_DATA_HOME/codeshell/files.json` (default
//! `~/.local/share/codeshell/files.json`).  There is no schema version: the
//! document is just the serialised `Vec<EditorFile>`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::file::EditorFile;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed file list in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Handle to the on-disk file list.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Storage at the default per-user location.
    pub fn default_location() -> Self {
        Self::new(default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored list.  A missing file is an empty list.
    pub fn load(&self) -> Result<Vec<EditorFile>, StorageError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let mut files: Vec<EditorFile> =
            serde_json::from_str(&text).map_err(|source| StorageError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        for f in &mut files {
            f.saved_content = Some(f.content.clone());
        }
        Ok(files)
    }

    /// Replace the stored list with `files`.
    pub fn save(&self, files: &[EditorFile]) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(files).map_err(|source| StorageError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(io_err)?;
        tracing::debug!("stored {} files at {}", files.len(), self.path.display());
        Ok(())
    }

    /// Delete the stored list, if any.
    pub fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

fn default_path() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".local").join("share")
        });
    data_dir.join(env!("CARGO_PKG_NAME")).join("files.json")
}
