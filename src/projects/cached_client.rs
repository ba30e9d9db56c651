//! Cached project client: query cache and mutation handling over the
//! simulated API.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tracing::debug;

use crate::cache::{SharedFetch, Speculation};
use crate::config::Config;
use crate::error::ApiError;
use crate::query::Query;
use crate::storage::StoragePort;

use super::api::ProjectApi;
use super::cache::ProjectCache;
use super::types::{Project, ProjectDraft, ProjectPatch};

/// Project client with a query cache in front of the simulated API.
///
/// Reads are cache-first: fresh entries are served directly, stale entries
/// are served while a background refetch revalidates them, and concurrent
/// first loads of one key share a single request. Writes go through the API
/// and invalidate the list cache on success; favorite toggles additionally
/// patch the cache optimistically and roll back on failure.
pub struct ProjectClient<S> {
  api: ProjectApi<S>,
  cache: Arc<Mutex<ProjectCache>>,
  /// Serializes mutation side effects: snapshot/patch/rollback sequences
  /// against the list cache must not interleave.
  mutation_gate: Arc<tokio::sync::Mutex<()>>,
  config: Config,
}

impl<S> Clone for ProjectClient<S> {
  fn clone(&self) -> Self {
    Self {
      api: self.api.clone(),
      cache: Arc::clone(&self.cache),
      mutation_gate: Arc::clone(&self.mutation_gate),
      config: self.config.clone(),
    }
  }
}

impl<S: StoragePort + 'static> ProjectClient<S> {
  pub fn new(storage: Arc<S>, config: Config) -> Self {
    let api = ProjectApi::new(storage, config.latency.clone());
    Self {
      api,
      cache: Arc::new(Mutex::new(ProjectCache::default())),
      mutation_gate: Arc::new(tokio::sync::Mutex::new(())),
      config,
    }
  }

  /// The underlying simulated API, for consumers that want to bypass the
  /// cache.
  pub fn api(&self) -> &ProjectApi<S> {
    &self.api
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  // The map stays consistent even if a peer panicked mid-section; recover
  // the guard rather than propagate the poison.
  fn cache(&self) -> MutexGuard<'_, ProjectCache> {
    self.cache.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// One page of projects, cached by offset.
  ///
  /// The offset alone is the cache key: distinct offsets are cached
  /// independently, and a page only ever knows its own length.
  pub async fn list_projects(&self, offset: usize, limit: usize) -> Result<Vec<Project>, ApiError> {
    let (previous, fetch) = {
      let mut cache = self.cache();
      let slot = cache.list_slot(offset);
      if let Some(page) = slot.fresh(self.config.stale_time()) {
        return Ok(page.clone());
      }

      let fetch = match slot.in_flight() {
        Some(fetch) => fetch,
        None => {
          let fetch = self.begin_list_fetch(offset, limit, slot.generation());
          slot.set_in_flight(fetch.clone());
          fetch
        }
      };
      (slot.value().cloned(), fetch)
    };

    match previous {
      // Keep previous data: serve the stale page now, revalidate in the
      // background.
      Some(page) => {
        tokio::spawn(fetch.map(|_| ()));
        Ok(page)
      }
      None => fetch.await,
    }
  }

  /// A single project, cached by id.
  pub async fn get_project(&self, id: &str) -> Result<Project, ApiError> {
    let (previous, fetch) = {
      let mut cache = self.cache();
      let slot = cache.detail_slot(id);
      if let Some(project) = slot.fresh(self.config.stale_time()) {
        return Ok(project.clone());
      }

      let fetch = match slot.in_flight() {
        Some(fetch) => fetch,
        None => {
          let fetch = self.begin_detail_fetch(id.to_string(), slot.generation());
          slot.set_in_flight(fetch.clone());
          fetch
        }
      };
      (slot.value().cloned(), fetch)
    };

    match previous {
      Some(project) => {
        tokio::spawn(fetch.map(|_| ()));
        Ok(project)
      }
      None => fetch.await,
    }
  }

  /// True total number of projects, cached alongside the list pages.
  pub async fn count_projects(&self) -> Result<usize, ApiError> {
    let (previous, fetch) = {
      let mut cache = self.cache();
      let slot = cache.count_slot();
      if let Some(count) = slot.fresh(self.config.stale_time()) {
        return Ok(*count);
      }

      let fetch = match slot.in_flight() {
        Some(fetch) => fetch,
        None => {
          let fetch = self.begin_count_fetch(slot.generation());
          slot.set_in_flight(fetch.clone());
          fetch
        }
      };
      (slot.value().copied(), fetch)
    };

    match previous {
      Some(count) => {
        tokio::spawn(fetch.map(|_| ()));
        Ok(count)
      }
      None => fetch.await,
    }
  }

  /// Create a project, then expire cached pages so the next read
  /// reconciles with storage.
  pub async fn create_project(&self, draft: ProjectDraft) -> Result<Project, ApiError> {
    let _gate = self.mutation_gate.lock().await;

    let created = self.api.create(draft).await?;
    self.cache().invalidate_lists();
    Ok(created)
  }

  /// Merge a partial update into the matching project.
  ///
  /// A patch that touches the favorite flag is applied to the cache
  /// optimistically before the write starts: in-flight list fetches are
  /// detached so they cannot overwrite the patch, the touched slots are
  /// snapshotted, and a failed write restores that snapshot exactly.
  /// Successful writes expire cached pages either way.
  pub async fn update_project(&self, patch: ProjectPatch) -> Result<Project, ApiError> {
    let _gate = self.mutation_gate.lock().await;

    let mut speculation = Speculation::idle();
    if patch.touches_favorite() {
      let mut cache = self.cache();
      cache.cancel_lists();
      speculation = Speculation::patched(cache.snapshot_for(&patch.id));
      cache.apply_patch(&patch);
    }

    match self.api.update(patch).await {
      Ok(updated) => {
        speculation.commit();
        self.cache().invalidate_lists();
        Ok(updated)
      }
      Err(err) => {
        if let Some(snapshot) = speculation.rollback() {
          debug!("optimistic update failed, restoring cache snapshot");
          self.cache().restore(snapshot);
        }
        Err(err)
      }
    }
  }

  /// Delete by id (idempotent), then expire cached pages.
  pub async fn delete_project(&self, id: &str) -> Result<(), ApiError> {
    let _gate = self.mutation_gate.lock().await;

    self.api.delete(id).await?;
    self.cache().invalidate_lists();
    Ok(())
  }

  /// Currently cached page for an offset, regardless of staleness. Never
  /// triggers a fetch.
  pub fn peek_list(&self, offset: usize) -> Option<Vec<Project>> {
    self.cache().list_value(offset)
  }

  /// Currently cached record for an id, regardless of staleness. Never
  /// triggers a fetch.
  pub fn peek_project(&self, id: &str) -> Option<Project> {
    self.cache().detail_value(id)
  }

  /// Observable query handle for a list page, sized by the configured page
  /// size.
  pub fn list_query(&self, offset: usize) -> Query<Vec<Project>> {
    let client = self.clone();
    let limit = self.config.page_size;
    Query::new(move || {
      let client = client.clone();
      async move {
        client
          .list_projects(offset, limit)
          .await
          .map_err(|e| e.to_string())
      }
    })
    .with_stale_time(self.config.stale_time())
  }

  /// Observable query handle for a single project. With no id the query is
  /// disabled and never issues a fetch, mirroring a detail view that has no
  /// selection yet.
  pub fn detail_query(&self, id: Option<String>) -> Query<Project> {
    let client = self.clone();
    let enabled = id.is_some();
    let id = id.unwrap_or_default();
    Query::new(move || {
      let client = client.clone();
      let id = id.clone();
      async move { client.get_project(&id).await.map_err(|e| e.to_string()) }
    })
    .with_enabled(enabled)
    .with_stale_time(self.config.stale_time())
  }

  fn begin_list_fetch(
    &self,
    offset: usize,
    limit: usize,
    generation: u64,
  ) -> SharedFetch<Vec<Project>> {
    let api = self.api.clone();
    let cache = Arc::clone(&self.cache);
    async move {
      let result = api.list(offset, limit).await;
      let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
      let slot = cache.list_slot(offset);
      // Only the generation this fetch was started under may install;
      // a cancelled fetch still resolves for its awaiters.
      if slot.generation() == generation {
        match &result {
          Ok(page) => slot.install(page.clone()),
          Err(_) => slot.clear_in_flight(),
        }
      }
      result
    }
    .boxed()
    .shared()
  }

  fn begin_detail_fetch(&self, id: String, generation: u64) -> SharedFetch<Project> {
    let api = self.api.clone();
    let cache = Arc::clone(&self.cache);
    async move {
      let result = api.get_by_id(&id).await;
      let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
      let slot = cache.detail_slot(&id);
      if slot.generation() == generation {
        match &result {
          Ok(project) => slot.install(project.clone()),
          Err(_) => slot.clear_in_flight(),
        }
      }
      result
    }
    .boxed()
    .shared()
  }

  fn begin_count_fetch(&self, generation: u64) -> SharedFetch<usize> {
    let api = self.api.clone();
    let cache = Arc::clone(&self.cache);
    async move {
      let result = api.count().await;
      let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
      let slot = cache.count_slot();
      if slot.generation() == generation {
        match &result {
          Ok(count) => slot.install(*count),
          Err(_) => slot.clear_in_flight(),
        }
      }
      result
    }
    .boxed()
    .shared()
  }
}
