//! SQLite-backed storage.

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::projects::Project;

use super::{decode_blob, encode_blob, StoragePort, STORAGE_KEY};

/// Schema for the key-value table holding the serialized collection.
const STORE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS local_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Storage backend persisting the blob in a single-row key-value table.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open or create the store at the given path.
  pub fn open(path: &Path) -> Result<Self, StorageError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| StorageError::Backend(format!("Failed to create store directory: {}", e)))?;
    }

    let conn = Connection::open(path).map_err(|e| {
      StorageError::Backend(format!("Failed to open store at {}: {}", path.display(), e))
    })?;

    Self::from_connection(conn)
  }

  /// Open or create the store at the default location.
  pub fn open_default() -> Result<Self, StorageError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| StorageError::Backend("Could not determine data directory".to_string()))?;

    Self::open(&data_dir.join("projstore").join("projects.db"))
  }

  /// Open a store that lives only as long as the connection. Mostly useful
  /// in tests.
  pub fn open_in_memory() -> Result<Self, StorageError> {
    let conn = Connection::open_in_memory()
      .map_err(|e| StorageError::Backend(format!("Failed to open in-memory store: {}", e)))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self, StorageError> {
    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;
    Ok(store)
  }

  fn run_migrations(&self) -> Result<(), StorageError> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| StorageError::Backend(format!("Lock poisoned: {}", e)))?;

    conn
      .execute_batch(STORE_SCHEMA)
      .map_err(|e| StorageError::Backend(format!("Failed to run store migrations: {}", e)))?;

    Ok(())
  }
}

impl StoragePort for SqliteStore {
  fn load(&self) -> Result<Vec<Project>, StorageError> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| StorageError::Backend(format!("Lock poisoned: {}", e)))?;

    let mut stmt = conn
      .prepare("SELECT value FROM local_store WHERE key = ?")
      .map_err(|e| StorageError::Backend(format!("Failed to prepare load: {}", e)))?;

    let blob: Option<String> = stmt.query_row(params![STORAGE_KEY], |row| row.get(0)).ok();

    Ok(match blob.as_deref() {
      Some(blob) => decode_blob(blob),
      None => Vec::new(),
    })
  }

  fn save(&self, projects: &[Project]) -> Result<(), StorageError> {
    let blob = encode_blob(projects)?;
    let conn = self
      .conn
      .lock()
      .map_err(|e| StorageError::Backend(format!("Lock poisoned: {}", e)))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO local_store (key, value) VALUES (?, ?)",
        params![STORAGE_KEY, blob],
      )
      .map_err(|e| StorageError::Backend(format!("Failed to save projects: {}", e)))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::projects::ProjectDraft;

  fn sample_projects(n: usize) -> Vec<Project> {
    (0..n)
      .map(|i| {
        Project::from_draft(ProjectDraft {
          name: format!("Project {}", i),
          description: String::new(),
          start_date: "2024-03-01".parse().unwrap(),
          end_date: "2024-09-01".parse().unwrap(),
          manager: "Grace".to_string(),
        })
      })
      .collect()
  }

  #[test]
  fn fresh_store_loads_empty_collection() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert!(store.load().unwrap().is_empty());
  }

  #[test]
  fn save_then_load_round_trips() {
    let store = SqliteStore::open_in_memory().unwrap();
    let projects = sample_projects(3);

    store.save(&projects).unwrap();
    assert_eq!(store.load().unwrap(), projects);

    // Overwrite keeps a single row per key
    let replacement = sample_projects(1);
    store.save(&replacement).unwrap();
    assert_eq!(store.load().unwrap(), replacement);
  }

  #[test]
  fn persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projects.db");
    let projects = sample_projects(2);

    {
      let store = SqliteStore::open(&path).unwrap();
      store.save(&projects).unwrap();
    }

    let reopened = SqliteStore::open(&path).unwrap();
    assert_eq!(reopened.load().unwrap(), projects);
  }

  #[test]
  fn malformed_row_loads_as_empty() {
    let store = SqliteStore::open_in_memory().unwrap();
    {
      let conn = store.conn.lock().unwrap();
      conn
        .execute(
          "INSERT OR REPLACE INTO local_store (key, value) VALUES (?, ?)",
          params![STORAGE_KEY, "]]not json"],
        )
        .unwrap();
    }

    assert!(store.load().unwrap().is_empty());
  }
}
