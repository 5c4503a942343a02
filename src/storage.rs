//! Injectable key-value storage for the persisted events document.
//!
//! The store logic never touches a backend directly; it goes through this
//! trait, so the same core runs against a file on disk, memory in tests,
//! or any future backend holding one JSON blob.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("atomic replace failed: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// One JSON document behind get/set/remove.
pub trait Storage {
    fn get(&self) -> Option<String>;
    fn set(&mut self, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self) -> Result<(), StorageError>;
}

// ── In-memory backend ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStorage {
    value: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend with pre-existing content.
    pub fn with_value(value: impl Into<String>) -> Self {
        MemoryStorage {
            value: Some(value.into()),
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self) -> Option<String> {
        self.value.clone()
    }

    fn set(&mut self, value: &str) -> Result<(), StorageError> {
        self.value = Some(value.to_string());
        Ok(())
    }

    fn remove(&mut self) -> Result<(), StorageError> {
        self.value = None;
        Ok(())
    }
}

// ── File backend ───────────────────────────────────────────────────────

/// The document as a single file, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage { path: path.into() }
    }
}

impl Storage for FileStorage {
    fn get(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }

    fn set(&mut self, value: &str) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(&self.path)?;
        Ok(())
    }

    fn remove(&mut self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => Ok(other?),
        }
    }
}
