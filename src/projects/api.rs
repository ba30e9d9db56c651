//! Simulated project API: configurable latency in front of the storage port.

use std::sync::Arc;
use tokio::time::sleep;
use tracing::debug;

use crate::config::LatencyConfig;
use crate::error::ApiError;
use crate::storage::StoragePort;

use super::types::{Project, ProjectDraft, ProjectPatch};

/// Project API over a storage port.
///
/// Each operation waits the configured latency before doing any work,
/// modeling a network round-trip, then loads the full collection, operates,
/// and persists the updated collection when mutating. Writes are
/// last-write-wins over the whole collection.
pub struct ProjectApi<S> {
  storage: Arc<S>,
  latency: LatencyConfig,
}

impl<S> Clone for ProjectApi<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      latency: self.latency.clone(),
    }
  }
}

impl<S: StoragePort> ProjectApi<S> {
  pub fn new(storage: Arc<S>, latency: LatencyConfig) -> Self {
    Self { storage, latency }
  }

  /// Contiguous slice `[offset, offset + limit)` of the collection in
  /// storage order. Out-of-range offsets yield a short or empty page.
  pub async fn list(&self, offset: usize, limit: usize) -> Result<Vec<Project>, ApiError> {
    sleep(self.latency.list()).await;
    debug!(offset, limit, "listing projects");

    let projects = self.storage.load()?;
    Ok(projects.into_iter().skip(offset).take(limit).collect())
  }

  /// Total number of stored projects.
  pub async fn count(&self) -> Result<usize, ApiError> {
    sleep(self.latency.list()).await;
    Ok(self.storage.load()?.len())
  }

  pub async fn get_by_id(&self, id: &str) -> Result<Project, ApiError> {
    sleep(self.latency.detail()).await;
    debug!(id, "fetching project");

    let projects = self.storage.load()?;
    projects
      .into_iter()
      .find(|p| p.id == id)
      .ok_or_else(|| ApiError::NotFound(id.to_string()))
  }

  /// Append a new record with a fresh unique id and `is_favorite = false`.
  pub async fn create(&self, draft: ProjectDraft) -> Result<Project, ApiError> {
    sleep(self.latency.mutate()).await;

    let mut projects = self.storage.load()?;
    let project = Project::from_draft(draft);
    debug!(id = %project.id, "creating project");

    projects.push(project.clone());
    self.storage.save(&projects)?;
    Ok(project)
  }

  /// Merge the patch into the matching record and return the result.
  /// A patch addressing a record that doesn't exist is an explicit
  /// `NotFound`.
  pub async fn update(&self, patch: ProjectPatch) -> Result<Project, ApiError> {
    sleep(self.latency.mutate()).await;
    debug!(id = %patch.id, "updating project");

    let mut projects = self.storage.load()?;
    let target = projects
      .iter_mut()
      .find(|p| p.id == patch.id)
      .ok_or_else(|| ApiError::NotFound(patch.id.clone()))?;

    patch.apply_to(target);
    let updated = target.clone();

    self.storage.save(&projects)?;
    Ok(updated)
  }

  /// Remove the matching record. Deleting an id that doesn't exist is a
  /// no-op, not an error.
  pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
    sleep(self.latency.mutate()).await;
    debug!(id, "deleting project");

    let mut projects = self.storage.load()?;
    projects.retain(|p| p.id != id);
    self.storage.save(&projects)?;
    Ok(())
  }
}
