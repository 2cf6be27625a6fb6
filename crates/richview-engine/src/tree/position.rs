use std::collections::HashMap;

use crate::document::NodeId;
use crate::error::{EngineError, Result};

/// Where a rendered node sat in the current pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub index: usize,
    pub parent: NodeId,
}

/// Sibling index and parent for every node rendered in the current pass.
///
/// Only the visible window is rendered, so this index is always partial.
/// Positions of off-window nodes are unknown until they are rendered; use
/// [`crate::tree::PathResolver`] for a document-wide answer instead.
#[derive(Debug, Default)]
pub struct PositionIndex {
    entries: HashMap<NodeId, Position>,
    pass: u64,
}

impl PositionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all positions and start a new pass.
    pub fn begin_pass(&mut self) -> u64 {
        self.entries.clear();
        self.pass += 1;
        self.pass
    }

    /// Counter of the current pass; 0 before the first pass.
    pub fn pass(&self) -> u64 {
        self.pass
    }

    pub fn record_position(&mut self, node: NodeId, index: usize, parent: NodeId) {
        self.entries.insert(node, Position { index, parent });
    }

    pub fn position(&self, node: NodeId) -> Result<Position> {
        self.entries
            .get(&node)
            .copied()
            .ok_or(EngineError::PositionUnknown(node))
    }

    pub fn sibling_index(&self, node: NodeId) -> Result<usize> {
        self.position(node).map(|position| position.index)
    }

    pub fn parent_of(&self, node: NodeId) -> Result<NodeId> {
        self.position(node).map(|position| position.parent)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
