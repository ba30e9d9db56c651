//! In-memory storage backend.

use std::sync::Mutex;

use crate::error::StorageError;
use crate::projects::Project;

use super::{decode_blob, encode_blob, StoragePort};

/// Storage backend that keeps the serialized blob in memory.
///
/// Holds exactly what a persistent key-value store would hold under the
/// fixed key: the serialized string, or nothing. Useful as a test double and
/// for consumers that don't want on-disk persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
  blob: Mutex<Option<String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a store pre-seeded with the given projects.
  pub fn with_projects(projects: &[Project]) -> Result<Self, StorageError> {
    let store = Self::new();
    store.save(projects)?;
    Ok(store)
  }

  /// Raw stored blob, if any.
  pub fn contents(&self) -> Option<String> {
    self.blob.lock().ok().and_then(|guard| guard.clone())
  }

  /// Overwrite the raw blob, bypassing serialization. Lets tests and
  /// migrations inject arbitrary stored data.
  pub fn set_contents(&self, blob: impl Into<String>) {
    if let Ok(mut guard) = self.blob.lock() {
      *guard = Some(blob.into());
    }
  }

  /// Drop any stored data.
  pub fn clear(&self) {
    if let Ok(mut guard) = self.blob.lock() {
      *guard = None;
    }
  }
}

impl StoragePort for MemoryStore {
  fn load(&self) -> Result<Vec<Project>, StorageError> {
    let guard = self
      .blob
      .lock()
      .map_err(|e| StorageError::Backend(format!("Lock poisoned: {}", e)))?;

    Ok(match guard.as_deref() {
      Some(blob) => decode_blob(blob),
      None => Vec::new(),
    })
  }

  fn save(&self, projects: &[Project]) -> Result<(), StorageError> {
    let blob = encode_blob(projects)?;
    let mut guard = self
      .blob
      .lock()
      .map_err(|e| StorageError::Backend(format!("Lock poisoned: {}", e)))?;
    *guard = Some(blob);
    Ok(())
  }
}
