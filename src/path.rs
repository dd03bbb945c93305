//! Dotted-path addressing for memory-hierarchy nodes.
//!
//! Example: "1.2.0"  =>  NodePath(vec![1, 2, 0])
//!
//! The root of the hierarchy is the zero-length path, rendered with the
//! sentinel "b". Components are stored as u32 and the derived ordering is
//! component-wise numeric, so "1.10" sorts after "1.2" and BTreeMap keys
//! come out in tree order.

use crate::error::{MoveError, Result};
use std::fmt;

pub const ROOT_SENTINEL: &str = "b";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(pub Vec<u32>);

impl NodePath {
    pub fn new(components: Vec<u32>) -> Self {
        Self(components)
    }

    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path string. The root sentinel parses to the empty path.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text == ROOT_SENTINEL {
            return Ok(Self::root());
        }
        let mut components = Vec::new();
        for part in text.split('.') {
            let n: u32 = part
                .parse()
                .map_err(|_| MoveError::malformed_path(text))?;
            components.push(n);
        }
        Ok(Self(components))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Numeric index of the node among its siblings (last component).
    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }

    /// Drop the last component. The root has no parent.
    pub fn parent(&self) -> Result<Self> {
        if self.is_root() {
            return Err(MoveError::no_parent());
        }
        Ok(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Longest path that is a component-wise prefix of both `self` and
    /// `other`. Comparison is over parsed components, never raw characters:
    /// "1.2" and "1.21" share only the ancestor "1".
    pub fn common_ancestor(&self, other: &NodePath) -> Self {
        let shared = self
            .0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count();
        Self(self.0[..shared].to_vec())
    }

    /// Ancestor chain from `self` up to and including the root.
    pub fn ancestors_inclusive(&self) -> Vec<NodePath> {
        let mut chain = Vec::with_capacity(self.0.len() + 1);
        let mut current = self.0.as_slice();
        loop {
            chain.push(NodePath(current.to_vec()));
            match current.split_last() {
                Some((_, rest)) => current = rest,
                None => break,
            }
        }
        chain
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "{}", ROOT_SENTINEL);
        }
        let mut first = true;
        for c in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", c)?;
            first = false;
        }
        Ok(())
    }
}
