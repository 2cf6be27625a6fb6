//! Shared fixtures for unit tests.

use crate::document::{Document, Node, NodeId};
use crate::range::{Decoration, Range};
use crate::tree::{Key, Path};
use crate::window::{RenderRow, RowProps};

/// A root holding two paragraphs, each with a single text leaf.
pub fn two_paragraphs(first: &str, second: &str) -> (Document, Vec<NodeId>) {
    let mut doc = Document::new();
    let root = doc.root();
    let mut paragraphs = Vec::new();
    for text in [first, second] {
        let paragraph = doc.push_child(root, Node::element("paragraph")).unwrap();
        doc.push_child(paragraph, Node::text(text)).unwrap();
        paragraphs.push(paragraph);
    }
    (doc, paragraphs)
}

/// What a row renderer was handed for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRow {
    pub path: Path,
    pub key: Key,
    pub decorations: Vec<Decoration>,
    pub selection: Option<Range>,
    pub is_selected: bool,
    pub is_last: bool,
}

/// Row renderer that records its props.
pub struct Capture;

impl RenderRow for Capture {
    type Output = CapturedRow;

    fn render_row(&mut self, props: RowProps<'_>) -> CapturedRow {
        CapturedRow {
            path: props.path.clone(),
            key: props.key,
            decorations: props.decorations.to_vec(),
            selection: props.selection.cloned(),
            is_selected: props.is_selected,
            is_last: props.is_last_in_parent,
        }
    }
}
