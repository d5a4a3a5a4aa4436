// File: ./src/client/mod.rs
//! Boundary to the remote task service.
pub mod core;
pub mod middleware;
pub mod wire;

pub use crate::client::core::TodoistClient;

use crate::engine::LabelUpdate;
use crate::model::Snapshot;
use anyhow::Result;

/// What the sync loop needs from the remote side.
#[allow(async_fn_in_trait)]
pub trait TaskService {
    /// Current projects, items and labels. May fail on network or auth errors.
    async fn fetch(&mut self) -> Result<Snapshot>;

    /// Sends one cycle's label updates in a single batch.
    async fn commit(&mut self, updates: Vec<LabelUpdate>) -> Result<()>;
}
