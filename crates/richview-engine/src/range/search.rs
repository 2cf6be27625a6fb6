use crate::document::{Document, Node, NodeId};
use crate::range::{Decoration, Point, Range};
use crate::tree::Path;

/// Decorations for every occurrence of `term` in the document's text leaves,
/// in document order, each carrying `highlight = search`.
///
/// Matching is exact and does not cross leaf boundaries. An empty term has no
/// matches.
pub fn search_decorations(document: &Document, term: &str) -> Vec<Decoration> {
    let mut matches = Vec::new();
    if term.is_empty() {
        return matches;
    }

    let term_len = term.chars().count();
    let mut stack: Vec<(NodeId, Path)> = vec![(document.root(), Path::root())];
    while let Some((id, path)) = stack.pop() {
        match document.node(id) {
            Some(Node::Text(text)) => {
                for (byte, _) in text.text.match_indices(term) {
                    let offset = text.text[..byte].chars().count();
                    matches.push(
                        Decoration::new(Range::new(
                            Point::new(path.clone(), offset),
                            Point::new(path.clone(), offset + term_len),
                        ))
                        .with_mark("highlight", "search"),
                    );
                }
            }
            Some(Node::Element(element)) => {
                for (index, &child) in element.children().iter().enumerate().rev() {
                    stack.push((child, path.child(index)));
                }
            }
            None => {}
        }
    }
    matches
}
