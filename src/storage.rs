//! Storage

use std::{
    cell::RefCell,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::cart::LineItem;

/// Errors surfaced by cart storage backends and the payload codec.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying storage could not be read or written.
    #[error("Failed to access cart storage: {0}")]
    Io(#[from] io::Error),

    /// Persisted payload could not be encoded or decoded.
    #[error("Invalid cart payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// A durable slot for the serialized cart.
///
/// Implementations model browser-local storage: one location, whole-value
/// reads and writes, surviving application restarts. The store treats every
/// failure here as recoverable.
pub trait CartStorage: fmt::Debug {
    /// Read the persisted payload. `None` when nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the backing storage cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the persisted payload.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the backing storage cannot be written.
    fn save(&self, payload: &str) -> Result<(), StorageError>;
}

/// Encode line items as the persisted JSON payload.
///
/// The payload is a JSON array of `{product, quantity}` objects with the
/// full product snapshot embedded.
///
/// # Errors
///
/// Returns a `StorageError` if serialization fails.
pub fn encode_items(items: &[LineItem]) -> Result<String, StorageError> {
    Ok(serde_json::to_string(items)?)
}

/// Decode the persisted JSON payload back into line items.
///
/// # Errors
///
/// Returns a `StorageError` for any structurally incompatible payload.
pub fn decode_items(payload: &str) -> Result<Vec<LineItem>, StorageError> {
    Ok(serde_json::from_str(payload)?)
}

/// File-backed storage holding the payload at a single path.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage { path: path.into() }
    }

    /// Path the payload lives at.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for FileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(fs::write(&self.path, payload)?)
    }
}

/// In-memory storage for tests and storage-less environments.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: RefCell<Option<String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot seeded with an existing payload.
    #[must_use]
    pub fn with_payload(payload: impl Into<String>) -> Self {
        MemoryStorage {
            slot: RefCell::new(Some(payload.into())),
        }
    }

    /// Current payload, for assertions.
    #[must_use]
    pub fn payload(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        *self.slot.borrow_mut() = Some(payload.to_string());

        Ok(())
    }
}
