// File: ./src/engine/mod.rs
//! Next-action propagation.
//!
//! One linear pass per project over its order-sorted visible items decides, for each
//! item, whether the marker label should be present. Decisions are written to the
//! in-memory items immediately (later items in the same pass see them) and recorded
//! in a [`ChangeQueue`] for a single commit at the end of the cycle.
pub mod queue;

pub use queue::{ChangeQueue, LabelUpdate};

use crate::model::{Classifier, Id, Item, Project, ProjectTree, Sequencing, Snapshot};
use chrono::{DateTime, Duration, Utc};
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub marker: Id,
    pub skip: Id,
    pub classifier: Classifier,
    /// Items due further out than this many days never carry the marker. 0 disables.
    pub hide_future_days: u32,
}

/// Per-project evaluation state, reset for every project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectContext {
    pub kind: Sequencing,
    /// A serial chain in this project already exposes its next action.
    pub has_next_action: bool,
    /// The first serial root candidate has been resolved.
    pub root_first_found: bool,
}

impl ProjectContext {
    pub fn new(kind: Sequencing) -> Self {
        Self {
            kind,
            has_next_action: false,
            root_first_found: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    settings: EngineSettings,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Evaluates every project of the snapshot. Items are re-sorted by project and order.
    pub fn run_cycle(&self, snapshot: &mut Snapshot, now: DateTime<Utc>) -> ChangeQueue {
        let mut queue = ChangeQueue::new();
        let Snapshot {
            projects, items, ..
        } = snapshot;

        items.sort_by(|a, b| {
            a.project_id
                .cmp(&b.project_id)
                .then(a.order.cmp(&b.order))
        });

        for project in projects.iter() {
            let start = items.partition_point(|i| i.project_id < project.id);
            let end = items.partition_point(|i| i.project_id <= project.id);
            self.evaluate_project(project, &mut items[start..end], now, &mut queue);
        }
        queue
    }

    /// Evaluates one project. `items` must be that project's items sorted by order.
    pub fn evaluate_project(
        &self,
        project: &Project,
        items: &mut [Item],
        now: DateTime<Utc>,
        queue: &mut ChangeQueue,
    ) -> ProjectContext {
        let kind = self.settings.classifier.project_type(project);
        debug!("Project {} being processed as {}", project.name, kind);

        let tree = ProjectTree::build(items, &self.settings.classifier);
        let mut ctx = ProjectContext::new(kind);
        for node in 0..tree.len() {
            self.visit(&tree, node, items, now, &mut ctx, queue);
        }
        ctx
    }

    fn visit(
        &self,
        tree: &ProjectTree,
        node: usize,
        items: &mut [Item],
        now: DateTime<Utc>,
        ctx: &mut ProjectContext,
        queue: &mut ChangeQueue,
    ) {
        let marker = &self.settings.marker;
        let skip = &self.settings.skip;
        let pos = tree.node(node).item;

        if self.is_beyond_horizon(&items[pos], now) {
            queue.remove_label(&mut items[pos], marker);
            ctx.root_first_found = true;
            return;
        }

        let item_kind = tree.node(node).kind;
        let depth = tree.node(node).depth;
        let children = tree.child_items(node);
        let parent_kind = tree.effective_parent_kind(node);

        if item_kind.is_typed() {
            debug!("Identified '{}' as {} type", items[pos].content, item_kind);
        }

        if item_kind.is_typed() || !children.is_empty() {
            let serial_scope =
                ctx.kind == Sequencing::Serial || parent_kind == Sequencing::Serial;
            if serial_scope && ctx.has_next_action {
                for &child in &children {
                    queue.remove_label(&mut items[child], marker);
                }
            } else if item_kind == Sequencing::Serial {
                if parent_kind == Sequencing::Parallel && !children.is_empty() {
                    queue.remove_label(&mut items[pos], marker);
                    ctx.root_first_found = true;
                }
                let mut first_found = false;
                for &child in &children {
                    if !first_found {
                        queue.add_label(&mut items[child], marker, skip);
                        ctx.has_next_action = true;
                        first_found = true;
                    } else {
                        queue.remove_label(&mut items[child], marker);
                    }
                }
            } else if item_kind == Sequencing::Parallel
                || ctx.kind == Sequencing::Parallel
                || parent_kind == Sequencing::Parallel
            {
                for &child in &children {
                    queue.add_label(&mut items[child], marker, skip);
                }
                queue.remove_label(&mut items[pos], marker);
                ctx.root_first_found = true;
            }
        } else if depth == 1 {
            match ctx.kind {
                Sequencing::Serial => {
                    if !ctx.root_first_found {
                        queue.add_label(&mut items[pos], marker, skip);
                        ctx.has_next_action = true;
                    } else {
                        queue.remove_label(&mut items[pos], marker);
                    }
                    ctx.root_first_found = true;
                }
                Sequencing::Parallel => {
                    queue.add_label(&mut items[pos], marker, skip);
                }
                Sequencing::Untyped => {}
            }
        }

        if items[pos].has_label(marker) && items[pos].has_label(skip) {
            queue.remove_label(&mut items[pos], marker);
        }
    }

    fn is_beyond_horizon(&self, item: &Item, now: DateTime<Utc>) -> bool {
        if self.settings.hide_future_days == 0 {
            return false;
        }
        let Some(due) = item.due_at() else {
            return false;
        };
        // A horizon past the representable range hides nothing.
        Duration::try_days(i64::from(self.settings.hide_future_days))
            .and_then(|days| now.checked_add_signed(days))
            .is_some_and(|horizon| due > horizon)
    }
}
