// File: ./src/model/mod.rs
pub mod item;
pub mod kind;
pub mod tree;

pub use item::{Id, Item, Label, Project, Snapshot, parse_due};
pub use kind::{Classifier, INBOX_NAME, Sequencing, Suffixes};
pub use tree::{ProjectTree, subitems};
