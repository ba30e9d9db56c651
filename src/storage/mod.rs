//! Pluggable persistence for the project collection.
//!
//! The whole collection lives as one JSON-serialized value under a single
//! fixed key. `StoragePort` is the seam the simulated API talks through:
//! - `MemoryStore` keeps the serialized blob in memory (test double and
//!   browser-local-storage analog)
//! - `SqliteStore` keeps it in a key-value table on disk

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use tracing::warn;

use crate::error::StorageError;
use crate::projects::Project;

/// Fixed key the serialized project list is stored under.
pub const STORAGE_KEY: &str = "projects";

/// Port to the persisted project collection.
///
/// `load` returns the empty collection when nothing has ever been stored.
/// `save` fully overwrites prior content. Writes are last-write-wins over the
/// whole collection; callers are expected to load-mutate-save.
pub trait StoragePort: Send + Sync {
  fn load(&self) -> Result<Vec<Project>, StorageError>;
  fn save(&self, projects: &[Project]) -> Result<(), StorageError>;
}

/// Decode a stored blob. A malformed blob is treated as the empty
/// collection: the store recovers on the next save instead of failing every
/// read.
pub(crate) fn decode_blob(blob: &str) -> Vec<Project> {
  match serde_json::from_str(blob) {
    Ok(projects) => projects,
    Err(e) => {
      warn!("stored project data is malformed, treating as empty: {}", e);
      Vec::new()
    }
  }
}

pub(crate) fn encode_blob(projects: &[Project]) -> Result<String, StorageError> {
  serde_json::to_string(projects)
    .map_err(|e| StorageError::Backend(format!("Failed to serialize projects: {}", e)))
}
