use crate::document::{Document, NodeId};
use crate::error::{EngineError, Result};
use crate::tree::Path;

/// Maps node handles to their current path.
///
/// Every call walks the document's parent and sibling-index side tables, so
/// the answer is correct right after a structural change and costs O(depth)
/// however many siblings a node has. Nothing is cached between calls.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    document: &'a Document,
}

impl<'a> PathResolver<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Resolve `node` to its root-relative path.
    ///
    /// Fails with [`EngineError::PathNotFound`] if the handle is stale or the
    /// node is not attached under the root.
    pub fn resolve(&self, node: NodeId) -> Result<Path> {
        if !self.document.contains(node) {
            return Err(EngineError::PathNotFound(node));
        }

        let root = self.document.root();
        let mut indices = Vec::new();
        let mut current = node;

        while current != root {
            let parent = self
                .document
                .parent_of(current)
                .ok_or(EngineError::PathNotFound(node))?;
            let index = self
                .document
                .index_in_parent(current)
                .filter(|&index| self.document.children_of(parent).get(index) == Some(&current))
                .ok_or(EngineError::PathNotFound(node))?;
            indices.push(index);
            current = parent;
        }

        indices.reverse();
        Ok(Path::from(indices))
    }
}

/// Convenience wrapper around [`PathResolver::resolve`].
pub fn resolve_path(document: &Document, node: NodeId) -> Result<Path> {
    PathResolver::new(document).resolve(node)
}
