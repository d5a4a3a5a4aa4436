// File: ./src/client/wire.rs
//! JSON payloads of the sync endpoint.
use crate::engine::LabelUpdate;
use crate::model::{Id, Item, Label, Project, Snapshot};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub const FULL_SYNC_TOKEN: &str = "*";
pub const RESOURCE_TYPES: [&str; 3] = ["projects", "items", "labels"];

#[derive(Debug, Serialize)]
pub struct ReadRequest<'a> {
    pub sync_token: &'a str,
    pub resource_types: [&'static str; 3],
}

#[derive(Debug, Deserialize)]
pub struct ReadResponse {
    pub sync_token: String,
    #[serde(default)]
    pub full_sync: bool,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl ReadResponse {
    /// Folds this response into the locally held state.
    pub fn apply_to(self, state: &mut Snapshot) -> String {
        let delta = Snapshot {
            projects: self.projects,
            items: self.items,
            labels: self.labels,
        };
        if self.full_sync {
            *state = delta;
            state.prune();
        } else {
            state.merge(delta);
        }
        self.sync_token
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateArgs {
    pub id: Id,
    pub labels: Vec<Id>,
}

#[derive(Debug, Serialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub uuid: String,
    pub args: UpdateArgs,
}

impl Command {
    pub fn item_update(update: LabelUpdate) -> Self {
        Self {
            kind: "item_update",
            uuid: Uuid::new_v4().to_string(),
            args: UpdateArgs {
                id: update.id,
                labels: update.labels,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WriteRequest {
    pub commands: Vec<Command>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CommandStatus {
    Ok(String),
    Failed(serde_json::Value),
}

#[derive(Debug, Deserialize)]
pub struct WriteResponse {
    #[serde(default)]
    pub sync_status: HashMap<String, CommandStatus>,
}

impl WriteResponse {
    /// Fails unless every sent command was acknowledged with `"ok"`.
    pub fn check(&self, sent: &[String]) -> Result<()> {
        let mut failures = Vec::new();
        for uuid in sent {
            match self.sync_status.get(uuid) {
                Some(CommandStatus::Ok(s)) if s == "ok" => {}
                Some(CommandStatus::Ok(other)) => failures.push(format!("{}: {}", uuid, other)),
                Some(CommandStatus::Failed(err)) => failures.push(format!("{}: {}", uuid, err)),
                None => failures.push(format!("{}: no status returned", uuid)),
            }
        }
        if !failures.is_empty() {
            bail!(
                "{} of {} commands were rejected: {}",
                failures.len(),
                sent.len(),
                failures.join("; ")
            );
        }
        Ok(())
    }
}
