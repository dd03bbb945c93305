//! Charge movement records onto the built hierarchy.
//!
//! Per record: both endpoints are walked up to the lowest common ancestor,
//! charging `outside` to every subtree boundary crossed on the way; the
//! ancestor and everything above it is charged `inside`. All node access
//! goes through the tree's path index.

use crate::error::{MoveError, Result};
use crate::hierarchy::Tree;
use crate::path::NodePath;

/// One recorded transfer between two hierarchy nodes.
#[derive(Debug, Clone)]
pub struct MovementRecord {
    pub source: NodePath,
    pub destination: NodePath,
    pub size: u64,
    /// Originating unit of work. Filtering on it happens upstream, in SQL.
    pub tag: Option<String>,
}

/// Counts reported back after an aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub applied: usize,
    pub skipped: usize,
}

/// Apply all records to the tree. Records whose endpoints are absent from
/// the layout are skipped and counted; a broken record must not take the
/// whole batch down with it.
pub fn apply_movements(tree: &mut Tree, records: &[MovementRecord]) -> AggregateStats {
    let mut stats = AggregateStats::default();
    for record in records {
        match apply_one(tree, record) {
            Ok(()) => stats.applied += 1,
            Err(err) => {
                stats.skipped += 1;
                eprintln!(
                    "WARN: skipping movement {} -> {} ({} bytes): {}",
                    record.source, record.destination, record.size, err
                );
            }
        }
    }
    stats
}

fn apply_one(tree: &mut Tree, record: &MovementRecord) -> Result<()> {
    let src = &record.source;
    let dst = &record.destination;
    let lca = src.common_ancestor(dst);

    // Resolve every touched path first so a bad record changes nothing.
    let src_chain = boundary_chain(tree, src, &lca)?;
    let dst_chain = boundary_chain(tree, dst, &lca)?;
    let lca_chain: Vec<usize> = lca
        .ancestors_inclusive()
        .iter()
        .map(|p| lookup(tree, p))
        .collect::<Result<_>>()?;

    for ix in src_chain.into_iter().chain(dst_chain) {
        tree.node_mut(ix).outside += record.size;
    }
    for ix in lca_chain {
        tree.node_mut(ix).inside += record.size;
    }
    Ok(())
}

/// Arena indices of the proper descendants of `lca` on the chain from
/// `endpoint` up to (excluding) `lca`. Empty when the endpoint is the lca.
fn boundary_chain(tree: &Tree, endpoint: &NodePath, lca: &NodePath) -> Result<Vec<usize>> {
    endpoint
        .ancestors_inclusive()
        .iter()
        .take_while(|p| *p != lca)
        .map(|p| lookup(tree, p))
        .collect()
}

fn lookup(tree: &Tree, path: &NodePath) -> Result<usize> {
    tree.lookup(path)
        .ok_or_else(|| MoveError::unknown_path(path))
}
