//! Project domain: records, the simulated API, and the cached client.

mod api;
mod cache;
mod cached_client;
mod types;

pub use api::ProjectApi;
pub use cached_client::ProjectClient;
pub use types::{Project, ProjectDraft, ProjectPatch};
