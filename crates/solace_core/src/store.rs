//! Whole-document persistence for the user directory.

use crate::error::StoreError;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Reads and replaces one structured document in full.
///
/// There are no partial writes: `write` replaces everything `read` would
/// return.
pub trait DocumentStore {
    /// Reads the whole document.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing has been written yet, `Decode` if the
    /// content is not valid JSON and `Io` on OS-level failures.
    fn read(&self) -> Result<Value, StoreError>;

    /// Replaces the whole document.
    fn write(&mut self, value: &Value) -> Result<(), StoreError>;
}

/// JSON file on disk.
///
/// Writes go to a sibling `.tmp` file which is fsynced and renamed over the
/// target, so readers see either the old or the new document.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for `path`, creating its parent directory if needed.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        Ok(Self { path })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl DocumentStore for JsonFileStore {
    fn read(&self) -> Result<Value, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if content.trim().is_empty() {
            return Ok(Value::Array(Vec::new()));
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&mut self, value: &Value) -> Result<(), StoreError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(value, &mut serializer).map_err(StoreError::Encode)?;

        let tmp_path = self.path.with_extension("tmp");

        {
            let mut file = File::create(&tmp_path).map_err(|e| self.io_error(e))?;
            file.write_all(&buf).map_err(|e| self.io_error(e))?;
            file.sync_all().map_err(|e| self.io_error(e))?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(e))?;

        #[cfg(unix)]
        {
            if let Some(parent) = self.path.parent() {
                if let Ok(dir_file) = File::open(parent) {
                    let _ = dir_file.sync_all();
                }
            }
        }

        Ok(())
    }
}

/// In-memory document, used where no file should be touched.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    document: Option<Value>,
}

impl MemoryStore {
    /// Creates an empty store; `read` reports `NotFound` until the first write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `document`.
    pub fn with_document(document: Value) -> Self {
        Self {
            document: Some(document),
        }
    }

    /// The last written document, if any.
    pub fn document(&self) -> Option<&Value> {
        self.document.as_ref()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self) -> Result<Value, StoreError> {
        self.document.clone().ok_or_else(|| StoreError::NotFound {
            path: PathBuf::from("<memory>"),
        })
    }

    fn write(&mut self, value: &Value) -> Result<(), StoreError> {
        self.document = Some(value.clone());
        Ok(())
    }
}
