//! Hierarchy construction from flat (child, parent) layout pairs.
//!
//! Nodes live in an arena (`Vec<Node>`) and are addressed by stable index;
//! the builder also produces the one path-to-index table that all later
//! mutation goes through. Children are attached in numeric order of their
//! last path component, so serialization order is stable.

use crate::error::{MoveError, Result};
use crate::path::NodePath;
use std::collections::BTreeMap;

/// One memory-hierarchy element with its traffic counters.
#[derive(Debug, Clone)]
pub struct Node {
    pub path: NodePath,
    pub name: String,
    /// Arena indices of children, ordered by numeric path suffix.
    pub children: Vec<usize>,
    /// Bytes moved entirely within this node's subtree.
    pub inside: u64,
    /// Bytes moved across this node's subtree boundary.
    pub outside: u64,
}

/// The built hierarchy. `index` is the only lookup used by the aggregator.
#[derive(Debug, Clone)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub root: usize,
    index: BTreeMap<NodePath, usize>,
}

/// Display label for a node: hierarchy rank at `depth` plus sibling index.
fn rank_label(depth: usize, index: Option<u32>) -> String {
    let rank = match depth {
        0 => return "Board (DRAM)".to_string(),
        1 => "Chip ",
        2 => "Unit ",
        3 => "Block ",
        4 => "XE ",
        _ => "",
    };
    match index {
        Some(i) => format!("{}{}", rank, i),
        None => rank.trim_end().to_string(),
    }
}

impl Tree {
    /// Build the tree from layout pairs. Every non-root path must appear as
    /// a child exactly once, and every declared parent must itself be in
    /// the layout (or be the root).
    pub fn build(pairs: &[(NodePath, NodePath)]) -> Result<Tree> {
        let mut nodes = vec![Node {
            path: NodePath::root(),
            name: rank_label(0, None),
            children: Vec::new(),
            inside: 0,
            outside: 0,
        }];
        let mut index = BTreeMap::new();
        index.insert(NodePath::root(), 0);

        // BTreeMap keys iterate in component order, so every parent path is
        // visited before any of its children and siblings come out in
        // numeric suffix order.
        let mut declared: BTreeMap<NodePath, NodePath> = BTreeMap::new();
        for (child, parent) in pairs {
            if child.is_root() {
                return Err(MoveError::duplicate_node(child));
            }
            if declared.insert(child.clone(), parent.clone()).is_some() {
                return Err(MoveError::duplicate_node(child));
            }
        }

        for (child, parent) in &declared {
            let derived = child.parent()?;
            if *parent != derived {
                return Err(MoveError::orphan_node(format!(
                    "layout declares parent {} for {}, but the path implies {}",
                    parent, child, derived
                )));
            }
            let parent_ix = *index.get(parent).ok_or_else(|| {
                MoveError::orphan_node(format!(
                    "layout node {} has no parent {} in the layout",
                    child, parent
                ))
            })?;

            let ix = nodes.len();
            nodes.push(Node {
                path: child.clone(),
                name: rank_label(child.depth(), child.last()),
                children: Vec::new(),
                inside: 0,
                outside: 0,
            });
            nodes[parent_ix].children.push(ix);
            index.insert(child.clone(), ix);
        }

        Ok(Tree {
            nodes,
            root: 0,
            index,
        })
    }

    pub fn lookup(&self, path: &NodePath) -> Option<usize> {
        self.index.get(path).copied()
    }

    pub fn node(&self, ix: usize) -> &Node {
        &self.nodes[ix]
    }

    pub fn node_mut(&mut self, ix: usize) -> &mut Node {
        &mut self.nodes[ix]
    }

    /// Maximum `outside` over all nodes, 0 for an all-zero tree.
    pub fn max_outside(&self) -> u64 {
        self.nodes.iter().map(|n| n.outside).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn p(s: &str) -> NodePath {
        NodePath::parse(s).unwrap()
    }

    fn pairs(spec: &[(&str, &str)]) -> Vec<(NodePath, NodePath)> {
        spec.iter().map(|(c, pa)| (p(c), p(pa))).collect()
    }

    #[test]
    fn builds_scenario_layout() {
        let tree =
            Tree::build(&pairs(&[("1", "b"), ("2", "b"), ("1.1", "1"), ("1.2", "1")])).unwrap();
        assert_eq!(tree.nodes.len(), 5);

        let root = tree.node(tree.root);
        assert_eq!(root.path, NodePath::root());
        assert_eq!(root.name, "Board (DRAM)");
        assert_eq!(root.children.len(), 2);

        let chip1 = tree.node(tree.lookup(&p("1")).unwrap());
        assert_eq!(chip1.name, "Chip 1");
        assert_eq!(chip1.children.len(), 2);
        assert_eq!(tree.node(chip1.children[0]).path, p("1.1"));
        assert_eq!(tree.node(chip1.children[1]).path, p("1.2"));
    }

    #[test]
    fn every_node_parent_chain_is_path_consistent() {
        let tree = Tree::build(&pairs(&[
            ("0", "b"),
            ("1", "b"),
            ("0.0", "0"),
            ("0.0.3", "0.0"),
        ]))
        .unwrap();
        for parent in &tree.nodes {
            for &child_ix in &parent.children {
                let child = tree.node(child_ix);
                assert_eq!(child.path.parent().unwrap(), parent.path);
            }
        }
    }

    #[test]
    fn children_sort_numerically_not_lexically() {
        let tree = Tree::build(&pairs(&[("2", "b"), ("10", "b"), ("1", "b")])).unwrap();
        let kids: Vec<String> = tree
            .node(tree.root)
            .children
            .iter()
            .map(|&ix| tree.node(ix).path.to_string())
            .collect();
        assert_eq!(kids, vec!["1", "2", "10"]);
    }

    #[test]
    fn missing_parent_is_an_orphan_error() {
        let err = Tree::build(&pairs(&[("1", "b"), ("2.4", "2")])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OrphanNode);
    }

    #[test]
    fn inconsistent_declared_parent_is_an_orphan_error() {
        let err = Tree::build(&pairs(&[("1", "b"), ("2", "b"), ("1.0", "2")])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OrphanNode);
    }

    #[test]
    fn repeated_path_is_a_duplicate_error() {
        let err = Tree::build(&pairs(&[("1", "b"), ("1", "b")])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateNode);
    }

    #[test]
    fn counters_start_at_zero() {
        let tree = Tree::build(&pairs(&[("1", "b")])).unwrap();
        assert!(tree.nodes.iter().all(|n| n.inside == 0 && n.outside == 0));
        assert_eq!(tree.max_outside(), 0);
    }

    #[test]
    fn deep_paths_get_plain_index_labels() {
        let tree = Tree::build(&pairs(&[
            ("0", "b"),
            ("0.0", "0"),
            ("0.0.0", "0.0"),
            ("0.0.0.0", "0.0.0"),
            ("0.0.0.0.7", "0.0.0.0"),
        ]))
        .unwrap();
        let leaf = tree.node(tree.lookup(&p("0.0.0.0.7")).unwrap());
        assert_eq!(leaf.name, "7");
        let xe = tree.node(tree.lookup(&p("0.0.0.0")).unwrap());
        assert_eq!(xe.name, "XE 0");
    }
}
