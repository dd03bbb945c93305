use crate::aggregate::MovementRecord;
use crate::path::NodePath;

/// Hardware component kind announced by a `DATAMOVE INFO` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Board,
    Chip,
    Unit,
    Block,
    Worker,
}

impl ComponentKind {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "board" => Some(Self::Board),
            "chip" => Some(Self::Chip),
            "unit" => Some(Self::Unit),
            "block" => Some(Self::Block),
            "worker" => Some(Self::Worker),
            _ => None,
        }
    }
}

/// Per-level element counts from the `DATAMOVE hierarchy` header:
/// chips per board, units per chip, blocks per unit, workers per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelCounts {
    pub chips: u32,
    pub units: u32,
    pub blocks: u32,
    pub workers: u32,
}

impl LevelCounts {
    /// Dotted path of a component from its kind and flat enumeration index.
    /// The trace numbers each level globally, so the index is decomposed
    /// with the per-level counts.
    pub fn component_path(&self, kind: ComponentKind, index: u32) -> NodePath {
        match kind {
            ComponentKind::Board => NodePath::root(),
            ComponentKind::Chip => NodePath::new(vec![index]),
            ComponentKind::Unit => {
                NodePath::new(vec![index / self.units, index % self.units])
            }
            ComponentKind::Block => NodePath::new(vec![
                index / (self.blocks * self.units),
                index / self.blocks % self.units,
                index % self.blocks,
            ]),
            ComponentKind::Worker => NodePath::new(vec![
                index / (self.workers * self.blocks * self.units),
                index / (self.workers * self.blocks) % self.units,
                index / self.workers % self.blocks,
                index % self.workers,
            ]),
        }
    }
}

/// Everything extracted from one trace: layout pairs derived from the
/// component map plus the resolved movement rows.
#[derive(Debug, Clone, Default)]
pub struct TraceData {
    pub layout: Vec<(NodePath, NodePath)>,
    pub movements: Vec<MovementRecord>,
    /// Movement lines dropped because an endpoint address was never
    /// announced by an INFO line.
    pub skipped: usize,
}
