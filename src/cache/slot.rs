//! One cache entry: value, timestamp, in-flight request.

use futures::future::{BoxFuture, Shared};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::ApiError;

/// A fetch in flight for one cache key, shareable between concurrent
/// callers so that only a single underlying request runs.
pub type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, ApiError>>>;

/// A single cache entry.
///
/// The generation counter implements cancellation: a fetch records the
/// generation it was started under, and may only install its result while
/// that generation is still current. `cancel` bumps the generation, so a
/// late resolution of a detached fetch can never overwrite the slot.
pub struct Slot<T: Clone> {
  value: Option<T>,
  fetched_at: Option<Instant>,
  generation: u64,
  in_flight: Option<SharedFetch<T>>,
}

/// Value + timestamp captured before an optimistic patch, restored verbatim
/// on rollback.
#[derive(Debug, Clone)]
pub struct SlotSnapshot<T> {
  value: Option<T>,
  fetched_at: Option<Instant>,
}

impl<T: Clone> Default for Slot<T> {
  fn default() -> Self {
    Self {
      value: None,
      fetched_at: None,
      generation: 0,
      in_flight: None,
    }
  }
}

impl<T: Clone> Slot<T> {
  /// The cached value if it is still within the staleness window.
  pub fn fresh(&self, stale_time: Duration) -> Option<&T> {
    match (&self.value, self.fetched_at) {
      (Some(value), Some(at)) if at.elapsed() <= stale_time => Some(value),
      _ => None,
    }
  }

  /// The cached value regardless of staleness.
  pub fn value(&self) -> Option<&T> {
    self.value.as_ref()
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn in_flight(&self) -> Option<SharedFetch<T>> {
    self.in_flight.clone()
  }

  pub fn set_in_flight(&mut self, fetch: SharedFetch<T>) {
    self.in_flight = Some(fetch);
  }

  pub fn clear_in_flight(&mut self) {
    self.in_flight = None;
  }

  /// Store a freshly fetched value and restart the staleness window.
  pub fn install(&mut self, value: T) {
    self.value = Some(value);
    self.fetched_at = Some(Instant::now());
    self.in_flight = None;
  }

  /// Overwrite the cached value in place without touching the staleness
  /// window. Used for optimistic patches: the data is speculative, not a
  /// confirmed fetch.
  pub fn put(&mut self, value: T) {
    self.value = Some(value);
  }

  /// Expire the staleness window but keep the value, so the next access
  /// serves it while revalidating.
  pub fn invalidate(&mut self) {
    self.fetched_at = None;
  }

  /// Detach any in-flight fetch and bump the generation so it can no longer
  /// install into this slot. Callers already awaiting the detached fetch
  /// still receive its result.
  pub fn cancel(&mut self) {
    self.generation += 1;
    self.in_flight = None;
  }

  pub fn snapshot(&self) -> SlotSnapshot<T> {
    SlotSnapshot {
      value: self.value.clone(),
      fetched_at: self.fetched_at,
    }
  }

  pub fn restore(&mut self, snapshot: SlotSnapshot<T>) {
    self.value = snapshot.value;
    self.fetched_at = snapshot.fetched_at;
  }
}
