//! Client-side project store with cached reads and optimistic writes.
//!
//! The crate layers, top to bottom:
//! - [`ProjectClient`]: cached list/get/count plus create/update/delete
//!   with invalidation, optimistic favorite toggles, and rollback
//! - [`ProjectApi`]: the simulated network, configurable artificial
//!   latency in front of every operation
//! - [`StoragePort`]: pluggable persistence of the whole collection as one
//!   serialized value under a fixed key ([`MemoryStore`], [`SqliteStore`])
//!
//! [`Query`] provides poll-based pending/success/error observability for
//! event-loop consumers. Presentation (tables, forms, navigation) is the
//! consumer's business.

pub mod cache;
pub mod config;
pub mod error;
pub mod projects;
pub mod query;
pub mod storage;

pub use config::{Config, ConfigError, LatencyConfig};
pub use error::{ApiError, StorageError};
pub use projects::{Project, ProjectApi, ProjectClient, ProjectDraft, ProjectPatch};
pub use query::{Query, QueryState};
pub use storage::{MemoryStore, SqliteStore, StoragePort, STORAGE_KEY};
