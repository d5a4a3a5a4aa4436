// File: ./src/engine/queue.rs
//! Per-cycle queue of label writes.
//!
//! Every effective add/remove is applied to the in-memory item straight away and
//! recorded as a full-label-set update. At the end of the cycle the queue is either
//! committed as-is or, when the adds and removes cancel out, dropped entirely.
use crate::model::{Id, Item};
use serde::{Deserialize, Serialize};

/// A request to replace the label set of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelUpdate {
    pub id: Id,
    pub labels: Vec<Id>,
}

#[derive(Debug, Default)]
pub struct ChangeQueue {
    added: Vec<Id>,
    removed: Vec<Id>,
    updates: Vec<LabelUpdate>,
}

impl ChangeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `marker` unless the item already has it or carries `skip`.
    pub fn add_label(&mut self, item: &mut Item, marker: &Id, skip: &Id) -> bool {
        if item.has_label(marker) || item.has_label(skip) {
            return false;
        }
        log::debug!("Updating '{}' with label", item.content);
        item.labels.push(marker.clone());
        self.added.push(item.id.clone());
        self.push_update(item);
        true
    }

    /// Removes `marker` if present.
    pub fn remove_label(&mut self, item: &mut Item, marker: &Id) -> bool {
        let Some(pos) = item.labels.iter().position(|l| l == marker) else {
            return false;
        };
        log::debug!("Updating '{}' without label", item.content);
        item.labels.remove(pos);
        self.removed.push(item.id.clone());
        self.push_update(item);
        true
    }

    fn push_update(&mut self, item: &Item) {
        self.updates.push(LabelUpdate {
            id: item.id.clone(),
            labels: item.labels.clone(),
        });
    }

    pub fn added(&self) -> &[Id] {
        &self.added
    }

    pub fn removed(&self) -> &[Id] {
        &self.removed
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// True when the sorted added ids equal the sorted removed ids (multiset equality).
    pub fn is_net_zero(&self) -> bool {
        let mut added = self.added.clone();
        let mut removed = self.removed.clone();
        added.sort();
        removed.sort();
        added == removed
    }

    /// Updates to send for this cycle; empty when the cycle cancelled out.
    pub fn into_updates(self) -> Vec<LabelUpdate> {
        if self.is_net_zero() {
            if !self.updates.is_empty() {
                log::debug!(
                    "{} queued label changes cancel out, dropping them",
                    self.updates.len()
                );
            }
            return Vec::new();
        }
        self.updates
    }
}
