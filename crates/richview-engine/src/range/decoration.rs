use std::collections::BTreeMap;

use crate::document::{Node, NodeId};
use crate::range::{Range, intersect};
use crate::tree::Path;

/// A range plus render attributes the engine carries without interpreting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub range: Range,
    pub marks: BTreeMap<String, String>,
}

impl Decoration {
    pub fn new(range: Range) -> Self {
        Self {
            range,
            marks: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_mark(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.marks.insert(name.into(), value.into());
        self
    }

    /// This decoration restricted to `span`, marks unchanged.
    pub fn clip_to(&self, span: &Range) -> Option<Decoration> {
        intersect(&self.range, span).map(|range| Decoration {
            range,
            marks: self.marks.clone(),
        })
    }
}

/// A node together with the path it was found at.
#[derive(Debug, Clone, Copy)]
pub struct NodeEntry<'a> {
    pub id: NodeId,
    pub node: &'a Node,
    pub path: &'a Path,
}

/// Plugin hook producing extra decorations for one node.
///
/// Called at most once per visible child per pass and must be pure for the
/// duration of a pass. Its output is trusted to already be scoped to the node.
pub trait Decorate {
    fn decorate(&self, entry: NodeEntry<'_>) -> Vec<Decoration>;
}

impl<F> Decorate for F
where
    F: Fn(NodeEntry<'_>) -> Vec<Decoration>,
{
    fn decorate(&self, entry: NodeEntry<'_>) -> Vec<Decoration> {
        self(entry)
    }
}

/// The default hook: no plugin decorations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDecorations;

impl Decorate for NoDecorations {
    fn decorate(&self, _entry: NodeEntry<'_>) -> Vec<Decoration> {
        Vec::new()
    }
}

/// Decorations and selection scoped to a single child.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedDecorations {
    /// External decorations clipped to the child, in input order, followed by
    /// the plugin's decorations
    pub decorations: Vec<Decoration>,
    /// The part of the selection inside the child, kept apart from the marks
    pub selection: Option<Range>,
}

impl ResolvedDecorations {
    pub fn is_selected(&self) -> bool {
        self.selection.is_some()
    }
}

/// Combine external decorations, plugin decorations and the selection for one
/// child whose full span is `child_span`.
///
/// External entries are clipped to the span and keep their input order;
/// plugin output is appended as-is. The result depends only on the inputs.
pub fn decorations_for<D>(
    entry: NodeEntry<'_>,
    child_span: &Range,
    external: &[Decoration],
    decorate: &D,
    selection: Option<&Range>,
) -> ResolvedDecorations
where
    D: Decorate + ?Sized,
{
    let mut decorations: Vec<Decoration> = external
        .iter()
        .filter_map(|decoration| decoration.clip_to(child_span))
        .collect();
    decorations.extend(decorate.decorate(entry));

    ResolvedDecorations {
        decorations,
        selection: selection.and_then(|selection| intersect(selection, child_span)),
    }
}
