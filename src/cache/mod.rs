//! Generic query-cache primitives.
//!
//! This module provides the building blocks the cached project client is
//! assembled from:
//! - `Slot` is one cache entry: value, fetch timestamp, and the in-flight
//!   request for that key, with generation-based cancellation
//! - `Speculation` is the per-invocation state machine for optimistic
//!   mutations (snapshot, patch, then commit or roll back)
//!
//! Deliberately an explicit map-entry design rather than a third-party
//! cache: staleness, de-duplication, and cancellation carry the core
//! semantics here.

mod mutation;
mod slot;

pub use mutation::Speculation;
pub use slot::{SharedFetch, Slot, SlotSnapshot};
