// File: ./src/model/kind.rs
//! Parallel / serial classification from naming conventions.
use crate::model::item::{Item, Project};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub const INBOX_NAME: &str = "Inbox";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Sequencing {
    /// Every eligible child is actionable at once.
    Parallel,
    /// Only the first eligible child is actionable.
    Serial,
    #[default]
    #[serde(rename = "none")]
    #[strum(serialize = "none")]
    Untyped,
}

impl Sequencing {
    pub fn is_typed(self) -> bool {
        self != Sequencing::Untyped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suffixes {
    pub parallel: char,
    pub serial: char,
}

impl Default for Suffixes {
    fn default() -> Self {
        Self {
            parallel: '.',
            serial: '_',
        }
    }
}

/// Derives project and item sequencing from the last character of a name.
///
/// "Last character" means the last Unicode scalar value after trimming
/// whitespace, so a multi-byte suffix such as `…` works as long as it is a
/// single code point. Combining sequences are not treated as one suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classifier {
    pub suffixes: Suffixes,
    pub inbox: Sequencing,
}

impl Classifier {
    pub fn new(suffixes: Suffixes, inbox: Sequencing) -> Self {
        Self { suffixes, inbox }
    }

    pub fn project_type(&self, project: &Project) -> Sequencing {
        let name = project.name.trim();
        if name == INBOX_NAME {
            return self.inbox;
        }
        self.classify(name)
    }

    pub fn item_type(&self, item: &Item) -> Sequencing {
        self.classify(item.content.trim())
    }

    fn classify(&self, text: &str) -> Sequencing {
        match text.chars().next_back() {
            Some(c) if c == self.suffixes.parallel => Sequencing::Parallel,
            Some(c) if c == self.suffixes.serial => Sequencing::Serial,
            _ => Sequencing::Untyped,
        }
    }
}
