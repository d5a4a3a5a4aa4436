// Caching of the last synced remote state, so restarts can resume an incremental sync.
//
// ⚠️ VERSION BUMP REQUIRED:
// Changes to Snapshot or its nested types (Item, Project, Label) require
// incrementing CACHE_VERSION below to invalidate stale caches.
use crate::context::AppContext;
use crate::model::Snapshot;
use crate::storage::LocalStorage;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;

const CACHE_VERSION: u32 = 2; // last update: labels carry a deleted flag

#[derive(Serialize, Deserialize)]
struct SyncCache {
    // Missing in very old files; defaults to 0 and is rejected.
    #[serde(default)]
    version: u32,
    sync_token: Option<String>,
    state: Snapshot,
}

pub struct Cache;

impl Cache {
    pub fn save(ctx: &dyn AppContext, state: &Snapshot, sync_token: Option<&str>) -> Result<()> {
        if let Some(path) = ctx.get_sync_cache_path() {
            LocalStorage::with_lock(&path, || {
                let data = SyncCache {
                    version: CACHE_VERSION,
                    sync_token: sync_token.map(str::to_string),
                    state: state.clone(),
                };
                let json = serde_json::to_string(&data)?;
                LocalStorage::atomic_write(&path, json)?;
                Ok(())
            })?;
        }
        Ok(())
    }

    /// Returns the cached state and sync token, or an empty state with no token
    /// when the cache is missing, unreadable or from another version.
    pub fn load(ctx: &dyn AppContext) -> Result<(Snapshot, Option<String>)> {
        if let Some(path) = ctx.get_sync_cache_path()
            && path.exists()
        {
            return LocalStorage::with_lock(&path, || {
                let json = fs::read_to_string(&path)?;
                if let Ok(cache) = serde_json::from_str::<SyncCache>(&json)
                    && cache.version == CACHE_VERSION
                {
                    return Ok((cache.state, cache.sync_token));
                }
                log::debug!("Discarding stale sync cache at {}", path.display());
                Ok((Snapshot::default(), None))
            });
        }
        Ok((Snapshot::default(), None))
    }
}
