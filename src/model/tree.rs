// File: ./src/model/tree.rs
//! Hierarchy over a project's flat, order-sorted item list.
//!
//! The remote side only gives us `depth` and an ordering key per item. Two views
//! are provided: [`subitems`], a direct scan of the flat list, and
//! [`ProjectTree`], an arena built once per project that adds parent links so the
//! nearest explicitly typed ancestor can be resolved at any depth.
use crate::model::item::Item;
use crate::model::kind::{Classifier, Sequencing};

/// Direct visible children of `anchor` (or the visible roots when `anchor` is `None`).
///
/// `items` must be sorted by ordering key. The scan stops at the first visible item
/// at or above the anchor's depth after the anchor, i.e. the end of its subtree.
pub fn subitems<'a>(items: &'a [Item], anchor: Option<&Item>) -> Vec<&'a Item> {
    let Some(anchor) = anchor else {
        return items
            .iter()
            .filter(|i| i.is_visible() && i.depth == 1)
            .collect();
    };

    let wanted = anchor.depth + 1;
    let mut result = Vec::new();
    let mut found = false;
    for item in items.iter().filter(|i| i.is_visible()) {
        if item.id == anchor.id {
            found = true;
            continue;
        }
        if !found {
            continue;
        }
        if item.depth <= anchor.depth {
            break;
        }
        if item.depth == wanted {
            result.push(item);
        }
    }
    result
}

#[derive(Debug, Clone)]
pub struct Node {
    /// Position of the item in the project slice the tree was built from.
    pub item: usize,
    pub depth: u32,
    pub kind: Sequencing,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Arena of the visible items of one project, in order.
#[derive(Debug, Clone, Default)]
pub struct ProjectTree {
    nodes: Vec<Node>,
}

impl ProjectTree {
    /// Builds the tree from order-sorted items. Invisible items are left out entirely.
    ///
    /// A node's parent is the nearest preceding visible item with a smaller depth;
    /// its children are the visible items exactly one level deeper inside its span.
    pub fn build(items: &[Item], classifier: &Classifier) -> Self {
        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();

        for (pos, item) in items.iter().enumerate() {
            if !item.is_visible() {
                continue;
            }
            while let Some(&top) = stack.last() {
                if nodes[top].depth < item.depth {
                    break;
                }
                stack.pop();
            }
            let parent = stack.last().copied();
            let id = nodes.len();
            if let Some(p) = parent
                && nodes[p].depth + 1 == item.depth
            {
                nodes[p].children.push(id);
            }
            nodes.push(Node {
                item: pos,
                depth: item.depth,
                kind: classifier.item_type(item),
                parent,
                children: Vec::new(),
            });
            stack.push(id);
        }

        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.nodes.iter().enumerate()
    }

    /// Item positions of the direct children of `id`, in order.
    pub fn child_items(&self, id: usize) -> Vec<usize> {
        self.nodes[id]
            .children
            .iter()
            .map(|&c| self.nodes[c].item)
            .collect()
    }

    /// Type of the nearest typed ancestor, or untyped for roots and untyped chains.
    pub fn effective_parent_kind(&self, id: usize) -> Sequencing {
        let mut cursor = self.nodes[id].parent;
        while let Some(p) = cursor {
            let node = &self.nodes[p];
            if node.kind.is_typed() {
                return node.kind;
            }
            cursor = node.parent;
        }
        Sequencing::Untyped
    }
}
