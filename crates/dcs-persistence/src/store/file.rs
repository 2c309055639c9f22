//! Directory-backed store.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::{PersistenceError, Result};

const EXTENSION: &str = "json";

/// Stores each key as `<root>/<key>.json`.
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// never leaves a half-written record.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistenceError::InvalidFormat {
                key: key.to_string(),
                reason: "store keys may only contain letters, digits, '-' and '_'".to_string(),
            });
        }
        Ok(self.root.join(format!("{key}.{EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::Io {
                operation: "read",
                path,
                source: e,
            }),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let temp_path = path.with_extension("json.tmp");

        fs::create_dir_all(&self.root).map_err(|e| PersistenceError::Io {
            operation: "create directory",
            path: self.root.clone(),
            source: e,
        })?;

        let mut file = File::create(&temp_path).map_err(|e| PersistenceError::Io {
            operation: "create",
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(value.as_bytes())
            .map_err(|e| PersistenceError::Io {
                operation: "write",
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| PersistenceError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, &path).map_err(|e| PersistenceError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.clone(),
            source: e,
        })?;

        tracing::debug!(key, path = %path.display(), "stored value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PersistenceError::Io {
                operation: "remove",
                path,
                source: e,
            }),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PersistenceError::Io {
                    operation: "list",
                    path: self.root.clone(),
                    source: e,
                });
            }
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PersistenceError::Io {
                operation: "list",
                path: self.root.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
