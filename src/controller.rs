// File: src/controller.rs
//! Sync loop: fetch a snapshot, run the engine over it, commit the net changes.
//!
//! Fetch and commit failures only abandon the current cycle; the loop carries on
//! after the configured delay. Configuration problems found at start-up (missing
//! labels) are returned as errors before any cycle runs.
use crate::client::TaskService;
use crate::config::Config;
use crate::engine::{Engine, EngineSettings};
use crate::model::Snapshot;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use log::{debug, error, info};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Label changes were committed.
    Committed(usize),
    /// Changes were queued but cancelled each other out.
    Cancelled,
    /// Nothing to change.
    Unchanged,
}

pub struct SyncController<S: TaskService> {
    service: S,
    config: Config,
}

impl<S: TaskService> SyncController<S> {
    pub fn new(service: S, config: Config) -> Self {
        Self { service, config }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Resolves the marker and skip labels into engine settings.
    pub fn engine_settings(&self, snapshot: &Snapshot) -> Result<EngineSettings> {
        let Some(marker) = snapshot.label_id(&self.config.label) else {
            bail!(
                "Label {} doesn't exist, please create it or pass --label",
                self.config.label
            );
        };
        let Some(skip) = snapshot.label_id(&self.config.skip_label) else {
            bail!(
                "Label {} doesn't exist, please create it or pass --skip-label",
                self.config.skip_label
            );
        };
        debug!("Label {} found as label id {}", self.config.label, marker);
        Ok(EngineSettings {
            marker,
            skip,
            classifier: self.config.classifier()?,
            hide_future_days: self.config.hide_future,
        })
    }

    /// Initial sync and label lookup. Any failure here is fatal.
    pub async fn prepare(&mut self) -> Result<Engine> {
        debug!("Syncing the current state from the API");
        let snapshot = self
            .service
            .fetch()
            .await
            .context("Initial sync with the API failed")?;
        Ok(Engine::new(self.engine_settings(&snapshot)?))
    }

    /// One fetch, evaluate, commit pass. Errors leave the remote state untouched
    /// for this cycle.
    pub async fn run_cycle(&mut self, engine: &Engine) -> Result<CycleOutcome> {
        let mut snapshot = self
            .service
            .fetch()
            .await
            .context("Error trying to sync with the API")?;

        let queue = engine.run_cycle(&mut snapshot, Utc::now());
        if queue.is_empty() {
            debug!("No changes queued, skipping sync.");
            return Ok(CycleOutcome::Unchanged);
        }

        let updates = queue.into_updates();
        if updates.is_empty() {
            debug!("Queued changes cancel out, skipping sync.");
            return Ok(CycleOutcome::Cancelled);
        }

        let count = updates.len();
        debug!("{} changes queued for sync... committing.", count);
        self.service
            .commit(updates)
            .await
            .context("Error trying to commit label changes")?;
        Ok(CycleOutcome::Committed(count))
    }

    /// Runs cycles until `onetime` is set, sleeping `delay` seconds in between.
    pub async fn run(mut self) -> Result<()> {
        let engine = self.prepare().await?;
        let delay = Duration::from_secs(self.config.delay);

        loop {
            match self.run_cycle(&engine).await {
                Ok(CycleOutcome::Committed(n)) => info!("Committed {} label changes", n),
                Ok(_) => {}
                Err(e) => error!("{:#}", e),
            }

            if self.config.onetime {
                break;
            }

            debug!("Sleeping for {} seconds", self.config.delay);
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}
