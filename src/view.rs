//! Serialized document consumed by the visualization layer.
//!
//! Shape per node: { id, name, data: { inside, outside }, children };
//! the document root additionally carries `max`, the largest `outside`
//! anywhere in the tree, so the client can scale edge widths.

use crate::hierarchy::Tree;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CountersView {
    pub inside: u64,
    pub outside: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NodeView {
    pub id: String,
    pub name: String,
    pub data: CountersView,
    pub children: Vec<NodeView>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TreeDocument {
    pub id: String,
    pub name: String,
    pub data: CountersView,
    pub children: Vec<NodeView>,
    pub max: u64,
}

/// Depth-first read of the aggregated tree. Never mutates; serializing the
/// same tree twice yields identical documents.
pub fn render_document(tree: &Tree) -> TreeDocument {
    let root = tree.node(tree.root);
    TreeDocument {
        id: root.path.to_string(),
        name: root.name.clone(),
        data: CountersView {
            inside: root.inside,
            outside: root.outside,
        },
        children: render_children(tree, tree.root),
        max: tree.max_outside(),
    }
}

fn render_children(tree: &Tree, ix: usize) -> Vec<NodeView> {
    tree.node(ix)
        .children
        .iter()
        .map(|&child_ix| {
            let child = tree.node(child_ix);
            NodeView {
                id: child.path.to_string(),
                name: child.name.clone(),
                data: CountersView {
                    inside: child.inside,
                    outside: child.outside,
                },
                children: render_children(tree, child_ix),
            }
        })
        .collect()
}
