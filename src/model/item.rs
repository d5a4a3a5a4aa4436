// File: ./src/model/item.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Legacy Todoist timestamp format, e.g. `Fri 26 Sep 2025 14:00:00 +0000`.
const LEGACY_DUE_FORMAT: &str = "%a %d %b %Y %H:%M:%S +0000";

/// Remote identifier. The API has shipped both numeric and string ids,
/// so both deserialize into the same opaque string form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Id(pub String);

impl Id {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Num(i64),
            Str(String),
        }
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Num(n) => Id(n.to_string()),
            RawId::Str(s) => Id(s),
        })
    }
}

/// Lifecycle flags come back as `0`/`1` from older endpoints and as booleans from newer ones.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Option::<RawFlag>::deserialize(deserializer)? {
        Some(RawFlag::Bool(b)) => b,
        Some(RawFlag::Int(n)) => n != 0,
        None => false,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DueObject {
    date: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Id,
    #[serde(default)]
    pub content: String,
    #[serde(alias = "item_order", alias = "child_order", default)]
    pub order: i64,
    #[serde(alias = "indent", default = "default_depth")]
    pub depth: u32,
    pub project_id: Id,
    #[serde(alias = "due_date_utc", default, deserialize_with = "due_text")]
    pub due: Option<String>,
    #[serde(default)]
    pub labels: Vec<Id>,

    #[serde(alias = "is_deleted", default, deserialize_with = "flag")]
    pub deleted: bool,
    #[serde(alias = "is_archived", default, deserialize_with = "flag")]
    pub archived: bool,
    #[serde(default, deserialize_with = "flag")]
    pub in_history: bool,
    #[serde(default, deserialize_with = "flag")]
    pub checked: bool,
}

fn default_depth() -> u32 {
    1
}

/// Accepts either the legacy flat string or a `{ "date": ... }` object.
fn due_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDue {
        Text(String),
        Object(DueObject),
    }
    Ok(match Option::<RawDue>::deserialize(deserializer)? {
        Some(RawDue::Text(s)) => Some(s),
        Some(RawDue::Object(o)) => Some(o.date),
        None => None,
    })
}

impl Item {
    pub fn new(id: &str, project_id: &str, content: &str, order: i64, depth: u32) -> Self {
        Self {
            id: Id::from(id),
            content: content.to_string(),
            order,
            depth,
            project_id: Id::from(project_id),
            due: None,
            labels: Vec::new(),
            deleted: false,
            archived: false,
            in_history: false,
            checked: false,
        }
    }

    /// Deleted, archived, completed-into-history or checked items are invisible
    /// to every downstream rule.
    pub fn is_visible(&self) -> bool {
        !(self.deleted || self.archived || self.in_history || self.checked)
    }

    pub fn has_label(&self, label: &Id) -> bool {
        self.labels.contains(label)
    }

    /// Due timestamp, if present and parsable.
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.due.as_deref()?;
        let parsed = parse_due(raw);
        if parsed.is_none() {
            log::warn!(
                "Ignoring unparsable due date '{}' on '{}'",
                raw,
                self.content
            );
        }
        parsed
    }
}

/// Parses the due formats the API has used over time.
/// Date-only values resolve to the end of that day.
pub fn parse_due(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, LEGACY_DUE_FORMAT) {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|d| d.and_utc())
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    pub name: String,
    #[serde(alias = "is_deleted", default, deserialize_with = "flag")]
    pub deleted: bool,
    #[serde(alias = "is_archived", default, deserialize_with = "flag")]
    pub archived: bool,
}

impl Project {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: Id::from(id),
            name: name.to_string(),
            deleted: false,
            archived: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !(self.deleted || self.archived)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: Id,
    pub name: String,
    #[serde(alias = "is_deleted", default, deserialize_with = "flag")]
    pub deleted: bool,
}

impl Label {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: Id::from(id),
            name: name.to_string(),
            deleted: false,
        }
    }
}

/// One consistent view of the remote account, fetched at the start of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub items: Vec<Item>,
    pub labels: Vec<Label>,
}

impl Snapshot {
    pub fn label_id(&self, name: &str) -> Option<Id> {
        self.labels
            .iter()
            .find(|l| !l.deleted && l.name == name)
            .map(|l| l.id.clone())
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id.as_str() == id)
    }

    /// Upserts by id, keeping the position of existing entries.
    pub fn merge(&mut self, other: Snapshot) {
        upsert(&mut self.projects, other.projects, |p| &p.id);
        upsert(&mut self.items, other.items, |i| &i.id);
        upsert(&mut self.labels, other.labels, |l| &l.id);
        self.prune();
    }

    /// Drops projects and labels that no longer exist remotely.
    pub fn prune(&mut self) {
        self.projects.retain(Project::is_active);
        self.labels.retain(|l| !l.deleted);
    }
}

fn upsert<T, F>(existing: &mut Vec<T>, incoming: Vec<T>, key: F)
where
    F: Fn(&T) -> &Id,
{
    for entry in incoming {
        if let Some(slot) = existing.iter_mut().find(|e| key(e) == key(&entry)) {
            *slot = entry;
        } else {
            existing.push(entry);
        }
    }
}
