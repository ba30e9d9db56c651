//! Error types shared across the storage, API, and cache layers.

use thiserror::Error;

/// Errors raised by a storage backend.
///
/// Both variants are `Clone` so results can travel through shared in-flight
/// fetches without re-running the operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
  #[error("storage backend error: {0}")]
  Backend(String),
}

/// Errors surfaced by the simulated API and the cached client on top of it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
  /// No project with the given id exists.
  #[error("project not found: {0}")]
  NotFound(String),

  #[error(transparent)]
  Storage(#[from] StorageError),
}

impl ApiError {
  pub fn is_not_found(&self) -> bool {
    matches!(self, ApiError::NotFound(_))
  }
}
