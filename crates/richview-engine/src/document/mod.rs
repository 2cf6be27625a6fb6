//! # Document Model
//!
//! An arena-backed tree of [`Node`]s. This is the engine's view of the host's
//! document: it answers `children_of`, `range_for_path` and the inline/block
//! predicates, and it is the only thing that owns nodes.
//!
//! ## Ownership
//!
//! Nodes are addressed by [`NodeId`] handles. Children are stored as handle
//! lists on their element, and the child-to-parent relation lives in a side
//! table keyed by handle, so there is no cyclic ownership between a node and
//! its parent. A second side table keeps each node's index among its
//! siblings, so walking from a node up to the root costs O(depth) whatever
//! the width of the tree. Removing a subtree frees every handle inside it; handles are
//! never handed out again, so a stale handle can always be detected with
//! [`Document::contains`].

pub mod builder;

use std::collections::HashMap;
use std::fmt;

use crate::range::{Point, Range};
use crate::tree::Path;

pub use builder::{DocumentBuilder, generate_huge_document, parse_plain_text};

/// Handle to a node in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DocumentError {
    #[error("Node {0} does not exist in the document")]
    UnknownNode(NodeId),
    #[error("Node {0} is a text leaf and cannot have children")]
    NotAnElement(NodeId),
    #[error("Child index {index} is out of bounds for node {parent} with {len} children")]
    IndexOutOfBounds {
        parent: NodeId,
        index: usize,
        len: usize,
    },
}

/// A structural node with an ordered child list.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Host-defined element type ("heading", "paragraph", "link", ...)
    pub kind: String,
    /// Whether the host treats this element as inline content
    pub inline: bool,
    pub(crate) children: Vec<NodeId>,
}

impl Element {
    pub fn block(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            inline: false,
            children: Vec::new(),
        }
    }

    pub fn inline(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            inline: true,
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A text leaf. Offsets into it count `char`s.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub text: String,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Length in `char`s, the unit used by [`Point::offset`].
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    pub fn element(kind: impl Into<String>) -> Self {
        Node::Element(Element::block(kind))
    }

    pub fn inline_element(kind: impl Into<String>) -> Self {
        Node::Element(Element::inline(kind))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::new(text))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Element(element) => element.children(),
            Node::Text(_) => &[],
        }
    }
}

/// Arena-backed document tree.
#[derive(Debug, Clone)]
pub struct Document {
    /// Slots are never reused, so a `NodeId` names at most one node instance ever
    nodes: Vec<Option<Node>>,
    /// Child -> parent side table
    parents: HashMap<NodeId, NodeId>,
    /// Child -> index in its parent's child list
    sibling_indices: HashMap<NodeId, usize>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only a root element.
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::element("root"))],
            parents: HashMap::new(),
            sibling_indices: HashMap::new(),
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Ordered children of `id`; empty for text leaves and unknown handles.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Index of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        self.sibling_indices.get(&id).copied()
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.children_of(self.root).is_empty()
    }

    /// Insert `node` as the `index`-th child of `parent`.
    ///
    /// Elements are always inserted without children; populate them with
    /// further calls using the returned handle.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        mut node: Node,
    ) -> Result<NodeId, DocumentError> {
        let len = match self.node(parent) {
            None => return Err(DocumentError::UnknownNode(parent)),
            Some(Node::Text(_)) => return Err(DocumentError::NotAnElement(parent)),
            Some(Node::Element(element)) => element.children.len(),
        };
        if index > len {
            return Err(DocumentError::IndexOutOfBounds { parent, index, len });
        }

        if let Node::Element(element) = &mut node {
            element.children.clear();
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(node));
        self.parents.insert(id, parent);
        if let Some(Some(Node::Element(element))) = self.nodes.get_mut(parent.0) {
            element.children.insert(index, id);
            for (offset, &child) in element.children[index..].iter().enumerate() {
                self.sibling_indices.insert(child, index + offset);
            }
        }
        Ok(id)
    }

    /// Append `node` as the last child of `parent`.
    pub fn push_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId, DocumentError> {
        let len = self.children_of(parent).len();
        self.insert_child(parent, len, node)
    }

    /// Detach the `index`-th child of `parent` and free its whole subtree.
    ///
    /// Every handle inside the removed subtree becomes stale.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Result<NodeId, DocumentError> {
        let removed = match self.nodes.get_mut(parent.0).and_then(Option::as_mut) {
            None => return Err(DocumentError::UnknownNode(parent)),
            Some(Node::Text(_)) => return Err(DocumentError::NotAnElement(parent)),
            Some(Node::Element(element)) => {
                let len = element.children.len();
                if index >= len {
                    return Err(DocumentError::IndexOutOfBounds { parent, index, len });
                }
                let removed = element.children.remove(index);
                for (offset, &child) in element.children[index..].iter().enumerate() {
                    self.sibling_indices.insert(child, index + offset);
                }
                removed
            }
        };

        let mut stack = vec![removed];
        while let Some(id) = stack.pop() {
            self.parents.remove(&id);
            self.sibling_indices.remove(&id);
            if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) {
                stack.extend_from_slice(node.children());
            }
        }
        Ok(removed)
    }

    /// Follow `path` down from the root.
    pub fn node_at_path(&self, path: &Path) -> Option<NodeId> {
        let mut current = self.root;
        for &index in path.indices() {
            current = *self.children_of(current).get(index)?;
        }
        Some(current)
    }

    /// Full span of the subtree at `path`: from offset 0 of its first text
    /// descendant to the end of its last text descendant.
    ///
    /// An element without text descendants spans a collapsed range at its own
    /// path.
    pub fn range_for_path(&self, path: &Path) -> Option<Range> {
        let node = self.node_at_path(path)?;
        let (first_path, _) = self.edge_leaf(node, path.clone(), Edge::First);
        let (last_path, last_len) = self.edge_leaf(node, path.clone(), Edge::Last);
        Some(Range::new(
            Point::new(first_path, 0),
            Point::new(last_path, last_len),
        ))
    }

    fn edge_leaf(&self, mut node: NodeId, mut path: Path, edge: Edge) -> (Path, usize) {
        loop {
            match self.node(node) {
                Some(Node::Text(text)) => return (path, text.len()),
                Some(Node::Element(element)) if !element.children.is_empty() => {
                    let index = match edge {
                        Edge::First => 0,
                        Edge::Last => element.children.len() - 1,
                    };
                    node = element.children[index];
                    path = path.child(index);
                }
                _ => return (path, 0),
            }
        }
    }

    pub fn is_inline(&self, id: NodeId) -> bool {
        matches!(self.node(id), Some(Node::Element(element)) if element.inline)
    }

    /// True when the element's content is inline: its first child is text or
    /// an inline element.
    pub fn has_inlines(&self, id: NodeId) -> bool {
        self.children_of(id)
            .first()
            .is_some_and(|&child| match self.node(child) {
                Some(Node::Text(_)) => true,
                Some(Node::Element(element)) => element.inline,
                None => false,
            })
    }

    /// A block element whose children are inline content.
    pub fn is_leaf_block(&self, id: NodeId) -> bool {
        matches!(self.node(id), Some(Node::Element(element)) if !element.inline)
            && self.has_inlines(id)
    }
}

#[derive(Clone, Copy)]
enum Edge {
    First,
    Last,
}
