//! # Windowed Children Rendering
//!
//! [`ChildrenRenderer::render`] runs one render pass over the children of a
//! single parent:
//!
//! 1. Validate the viewport (a bad viewport aborts before any row exists)
//! 2. Start a fresh [`PositionIndex`] pass
//! 3. Let the [`Virtualizer`] bind a slot to every realized index and hand
//!    each one over in ascending order
//! 4. Drive each realized row through
//!    `Pending -> PathResolved -> DecorationsResolved -> Rendered`
//!
//! Positions are recorded from the resolved path and the document's parent
//! table, so they agree with [`PathResolver`] even when the host's children
//! snapshot is stale.
//!
//! Rows are independent. A row whose node can no longer be reached stops at
//! `Pending`, is reported in [`RenderPass::skipped`], and the pass carries on.
//!
//! A pass borrows the renderer mutably for its whole duration, so a row
//! callback cannot start a nested pass on the same renderer. Hosts that see a
//! scroll or resize while a pass is running simply render again afterwards.

use crate::document::{Document, Node, NodeId};
use crate::error::{EngineError, Result};
use crate::range::{Decorate, Decoration, NodeEntry, Range, ResolvedDecorations, decorations_for};
use crate::tree::{IdentityRegistry, Key, Path, PathResolver, PositionIndex};
use crate::window::{SlotId, ViewportState, VisibleRange, Virtualizer};

/// Inputs of one pass: a snapshot of the parent's children plus everything
/// that decorates them.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub parent: NodeId,
    /// Children as the host last saw them; handles may have gone stale
    pub children: &'a [NodeId],
    /// External decorations such as search matches, valid for the whole pass
    pub decorations: &'a [Decoration],
    pub selection: Option<&'a Range>,
    pub viewport: ViewportState,
}

impl<'a> RenderRequest<'a> {
    pub fn new(parent: NodeId, children: &'a [NodeId], viewport: ViewportState) -> Self {
        Self {
            parent,
            children,
            decorations: &[],
            selection: None,
            viewport,
        }
    }

    /// Request covering the current children of `parent` in `document`.
    pub fn for_parent(document: &'a Document, parent: NodeId, viewport: ViewportState) -> Self {
        Self::new(parent, document.children_of(parent), viewport)
    }

    #[must_use]
    pub fn with_decorations(mut self, decorations: &'a [Decoration]) -> Self {
        self.decorations = decorations;
        self
    }

    #[must_use]
    pub fn with_selection(mut self, selection: Option<&'a Range>) -> Self {
        self.selection = selection;
        self
    }
}

/// Everything a row renderer gets for one child.
#[derive(Debug, Clone, Copy)]
pub struct RowProps<'a> {
    pub id: NodeId,
    pub node: &'a Node,
    pub path: &'a Path,
    pub key: Key,
    pub decorations: &'a [Decoration],
    /// Selection clipped to this child, for renderers that recurse
    pub selection: Option<&'a Range>,
    pub is_selected: bool,
    /// Text child that closes a leaf block
    pub is_last_in_parent: bool,
}

/// The external leaf/element renderer. Its output is opaque to the engine.
pub trait RenderRow {
    type Output;

    fn render_row(&mut self, props: RowProps<'_>) -> Self::Output;
}

/// A materialized row.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow<O> {
    pub index: usize,
    pub key: Key,
    pub slot: SlotId,
    /// Top edge of the row in viewport units
    pub offset: f64,
    pub output: O,
}

/// A row left out of the pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub index: usize,
    pub node: NodeId,
    pub error: EngineError,
}

/// Result of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass<O> {
    pub pass: u64,
    pub window: VisibleRange,
    /// Height of the full list, for sizing the scroll area
    pub total_height: f64,
    /// Rendered rows in ascending index order
    pub rows: Vec<RenderedRow<O>>,
    pub skipped: Vec<SkippedRow>,
}

/// Progress of a single row through a pass.
#[derive(Debug)]
enum RowState<O> {
    Pending {
        index: usize,
        slot: SlotId,
        node: NodeId,
    },
    PathResolved {
        index: usize,
        slot: SlotId,
        node: NodeId,
        path: Path,
    },
    DecorationsResolved {
        index: usize,
        slot: SlotId,
        node: NodeId,
        path: Path,
        resolved: ResolvedDecorations,
    },
    Rendered(RenderedRow<O>),
}

/// Per-pass borrows shared by every row.
struct PassContext<'p, 'r, D: ?Sized, R> {
    document: &'p Document,
    request: &'p RenderRequest<'r>,
    decorate: &'p D,
    renderer: &'p mut R,
    identities: &'p mut IdentityRegistry,
    positions: &'p mut PositionIndex,
}

impl<D, R> PassContext<'_, '_, D, R>
where
    D: Decorate + ?Sized,
    R: RenderRow,
{
    fn advance(&mut self, state: RowState<R::Output>) -> Result<RowState<R::Output>> {
        match state {
            RowState::Pending { index, slot, node } => {
                let path = PathResolver::new(self.document).resolve(node)?;
                Ok(RowState::PathResolved {
                    index,
                    slot,
                    node,
                    path,
                })
            }
            RowState::PathResolved {
                index,
                slot,
                node,
                path,
            } => {
                let not_found = || EngineError::PathNotFound(node);
                let span = self.document.range_for_path(&path).ok_or_else(not_found)?;
                let entry = NodeEntry {
                    id: node,
                    node: self.document.node(node).ok_or_else(not_found)?,
                    path: &path,
                };
                let resolved = decorations_for(
                    entry,
                    &span,
                    self.request.decorations,
                    self.decorate,
                    self.request.selection,
                );
                Ok(RowState::DecorationsResolved {
                    index,
                    slot,
                    node,
                    path,
                    resolved,
                })
            }
            RowState::DecorationsResolved {
                index,
                slot,
                node,
                path,
                resolved,
            } => {
                let data = self
                    .document
                    .node(node)
                    .ok_or(EngineError::PathNotFound(node))?;
                let parent = self.document.parent_of(node);
                let sibling = path.last();

                if let (Some(parent), Some(sibling)) = (parent, sibling) {
                    self.positions.record_position(node, sibling, parent);
                }
                let key = self.identities.key_for(node);
                let is_last_in_parent = data.is_text()
                    && parent.is_some_and(|parent| {
                        self.document.is_leaf_block(parent)
                            && sibling.map(|sibling| sibling + 1)
                                == Some(self.document.children_of(parent).len())
                    });

                let output = self.renderer.render_row(RowProps {
                    id: node,
                    node: data,
                    path: &path,
                    key,
                    decorations: &resolved.decorations,
                    selection: resolved.selection.as_ref(),
                    is_selected: resolved.is_selected(),
                    is_last_in_parent,
                });

                Ok(RowState::Rendered(RenderedRow {
                    index,
                    key,
                    slot,
                    offset: self.request.viewport.row_offset(index),
                    output,
                }))
            }
            RowState::Rendered(row) => Ok(RowState::Rendered(row)),
        }
    }

    fn materialize(
        &mut self,
        index: usize,
        slot: SlotId,
        node: NodeId,
    ) -> Result<RenderedRow<R::Output>> {
        let mut state = RowState::Pending { index, slot, node };
        loop {
            match self.advance(state)? {
                RowState::Rendered(row) => return Ok(row),
                next => state = next,
            }
        }
    }
}

/// Renders the visible window of one parent's children, keeping identity keys
/// and positions up to date as a side effect.
#[derive(Debug, Default)]
pub struct ChildrenRenderer {
    identities: IdentityRegistry,
    positions: PositionIndex,
    virtualizer: Virtualizer,
}

impl ChildrenRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    /// For evicting keys of structurally removed nodes.
    pub fn identities_mut(&mut self) -> &mut IdentityRegistry {
        &mut self.identities
    }

    /// Positions recorded by the latest pass.
    pub fn positions(&self) -> &PositionIndex {
        &self.positions
    }

    pub fn virtualizer(&self) -> &Virtualizer {
        &self.virtualizer
    }

    /// Run one render pass.
    ///
    /// Fails only with [`EngineError::ConfigurationError`], before any row is
    /// produced. Rows whose node cannot be resolved are skipped.
    pub fn render<D, R>(
        &mut self,
        document: &Document,
        request: &RenderRequest<'_>,
        decorate: &D,
        renderer: &mut R,
    ) -> Result<RenderPass<R::Output>>
    where
        D: Decorate + ?Sized,
        R: RenderRow,
    {
        request.viewport.validate()?;
        let total = request.children.len();
        let pass = self.positions.begin_pass();

        let mut context = PassContext {
            document,
            request,
            decorate,
            renderer,
            identities: &mut self.identities,
            positions: &mut self.positions,
        };

        let mut skipped = Vec::new();
        let rows = self
            .virtualizer
            .materialize(&request.viewport, total, |index, slot| {
                let node = request.children[index];
                match context.materialize(index, slot, node) {
                    Ok(row) => Ok(Some(row)),
                    Err(error @ EngineError::PathNotFound(_)) => {
                        log::warn!("skipping row {index}: {error}");
                        skipped.push(SkippedRow { index, node, error });
                        Ok(None)
                    }
                    Err(error) => Err(error),
                }
            })?;

        let window = self.virtualizer.window();
        log::debug!(
            "render pass {pass}: rows {:?}..={:?} of {total}, {} skipped",
            window.first(),
            window.last(),
            skipped.len()
        );

        Ok(RenderPass {
            pass,
            window,
            total_height: request.viewport.total_height(total),
            rows,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Node;
    use crate::range::{NoDecorations, Point};
    use crate::tests::{CapturedRow, Capture, two_paragraphs};
    use pretty_assertions::assert_eq;

    fn tall_viewport() -> ViewportState {
        ViewportState::new(0.0, 500.0, 60.0)
    }

    #[test]
    fn test_render_assigns_paths_keys_and_positions() {
        // Given two paragraphs under the root
        let (doc, paragraphs) = two_paragraphs("first", "second");
        let mut renderer = ChildrenRenderer::new();
        let request = RenderRequest::for_parent(&doc, doc.root(), tall_viewport());

        // When rendering
        let pass = renderer
            .render(&doc, &request, &NoDecorations, &mut Capture)
            .unwrap();

        // Then both rows are rendered with their paths and recorded positions
        assert_eq!(pass.rows.len(), 2);
        assert_eq!(pass.rows[0].output.path, Path::from(vec![0]));
        assert_eq!(pass.rows[1].output.path, Path::from(vec![1]));
        assert_eq!(pass.rows[1].offset, 60.0);
        assert_eq!(renderer.positions().sibling_index(paragraphs[1]), Ok(1));
        assert_eq!(renderer.positions().parent_of(paragraphs[0]), Ok(doc.root()));
        assert_eq!(
            renderer.identities().get(paragraphs[0]),
            Some(pass.rows[0].key)
        );
        assert_eq!(pass.total_height, 120.0);
    }

    #[test]
    fn test_invalid_viewport_aborts_before_rows() {
        let (doc, _) = two_paragraphs("first", "second");
        let mut renderer = ChildrenRenderer::new();
        let request = RenderRequest::for_parent(&doc, doc.root(), ViewportState::new(0.0, 500.0, 0.0));

        let result = renderer.render(&doc, &request, &NoDecorations, &mut Capture);

        assert!(matches!(result, Err(EngineError::ConfigurationError(_))));
        assert!(renderer.identities().is_empty());
        assert_eq!(renderer.positions().pass(), 0);
    }

    #[test]
    fn test_stale_child_is_skipped() {
        // Given a children snapshot taken before the first paragraph was removed
        let (mut doc, paragraphs) = two_paragraphs("first", "second");
        let snapshot = paragraphs.clone();
        let root = doc.root();
        doc.remove_child(root, 0).unwrap();

        // When rendering the stale snapshot
        let mut renderer = ChildrenRenderer::new();
        let request = RenderRequest::new(root, &snapshot, tall_viewport());
        let pass = renderer
            .render(&doc, &request, &NoDecorations, &mut Capture)
            .unwrap();

        // Then the removed row is skipped and the other still renders
        assert_eq!(
            pass.skipped,
            vec![SkippedRow {
                index: 0,
                node: paragraphs[0],
                error: EngineError::PathNotFound(paragraphs[0]),
            }]
        );
        assert_eq!(pass.rows.len(), 1);
        assert_eq!(pass.rows[0].index, 1);
        assert_eq!(pass.rows[0].output.path, Path::from(vec![0]));
        assert!(renderer.positions().sibling_index(paragraphs[0]).is_err());
        assert_eq!(renderer.identities().get(paragraphs[0]), None);
    }

    #[test]
    fn test_stale_snapshot_records_document_positions() {
        // Given a snapshot of two paragraphs taken before the first was removed
        let (mut doc, paragraphs) = two_paragraphs("first", "second");
        let snapshot = paragraphs.clone();
        let root = doc.root();
        doc.remove_child(root, 0).unwrap();

        // When rendering the stale snapshot
        let mut renderer = ChildrenRenderer::new();
        let request = RenderRequest::new(root, &snapshot, tall_viewport());
        renderer
            .render(&doc, &request, &NoDecorations, &mut Capture)
            .unwrap();

        // Then the recorded position is the node's real place in the document
        let path = crate::tree::resolve_path(&doc, paragraphs[1]).unwrap();
        assert_eq!(
            renderer.positions().sibling_index(paragraphs[1]).ok(),
            path.last()
        );
        assert_eq!(renderer.positions().sibling_index(paragraphs[1]), Ok(0));
        assert_eq!(renderer.positions().parent_of(paragraphs[1]), Ok(root));
    }

    #[test]
    fn test_foreign_child_records_its_real_parent() {
        // Given a request for the root that lists a text leaf of paragraph 1
        let (doc, paragraphs) = two_paragraphs("first", "second");
        let text = doc.children_of(paragraphs[1])[0];
        let snapshot = vec![paragraphs[0], text];

        // When rendering it
        let mut renderer = ChildrenRenderer::new();
        let request = RenderRequest::new(doc.root(), &snapshot, tall_viewport());
        let pass = renderer
            .render(&doc, &request, &NoDecorations, &mut Capture)
            .unwrap();

        // Then positions follow the document, not the request
        assert_eq!(pass.rows[1].output.path, Path::from(vec![1, 0]));
        assert_eq!(renderer.positions().parent_of(text), Ok(paragraphs[1]));
        assert_eq!(renderer.positions().sibling_index(text), Ok(0));
        assert!(pass.rows[1].output.is_last);
    }

    #[test]
    fn test_rows_carry_their_bound_slots() {
        let doc = crate::document::generate_huge_document(10, 7);
        let mut renderer = ChildrenRenderer::new();
        let viewport = tall_viewport().scrolled_to(1234.0);

        let pass = renderer
            .render(
                &doc,
                &RenderRequest::for_parent(&doc, doc.root(), viewport),
                &NoDecorations,
                &mut Capture,
            )
            .unwrap();

        assert_eq!(pass.rows.len(), pass.window.len());
        for row in &pass.rows {
            assert_eq!(renderer.virtualizer().slot_for(row.index), Some(row.slot));
        }
    }

    #[test]
    fn test_last_text_in_leaf_block_is_flagged() {
        // Given a paragraph with text, an inline link and closing text
        let mut doc = Document::new();
        let root = doc.root();
        let paragraph = doc.push_child(root, Node::element("paragraph")).unwrap();
        doc.push_child(paragraph, Node::text("see ")).unwrap();
        let link = doc.push_child(paragraph, Node::inline_element("link")).unwrap();
        doc.push_child(link, Node::text("here")).unwrap();
        doc.push_child(paragraph, Node::text(".")).unwrap();

        // When rendering the paragraph's children
        let mut renderer = ChildrenRenderer::new();
        let request = RenderRequest::for_parent(&doc, paragraph, tall_viewport());
        let pass = renderer
            .render(&doc, &request, &NoDecorations, &mut Capture)
            .unwrap();

        // Then only the closing text is last-in-parent
        let flags: Vec<bool> = pass.rows.iter().map(|row| row.output.is_last).collect();
        assert_eq!(flags, vec![false, false, true]);
        assert_eq!(pass.rows[1].output.path, Path::from(vec![0, 1]));
    }

    #[test]
    fn test_block_children_never_flagged_last() {
        let (doc, _) = two_paragraphs("first", "second");
        let mut renderer = ChildrenRenderer::new();
        let request = RenderRequest::for_parent(&doc, doc.root(), tall_viewport());

        let pass = renderer
            .render(&doc, &request, &NoDecorations, &mut Capture)
            .unwrap();

        assert!(pass.rows.iter().all(|row| !row.output.is_last));
    }

    #[test]
    fn test_selection_clipped_and_passed_to_row() {
        let (doc, _) = two_paragraphs("first", "second");
        let selection = Range::new(Point::new(vec![0, 0], 2), Point::new(vec![1, 0], 3));
        let mut renderer = ChildrenRenderer::new();
        let request = RenderRequest::for_parent(&doc, doc.root(), tall_viewport())
            .with_selection(Some(&selection));

        let pass = renderer
            .render(&doc, &request, &NoDecorations, &mut Capture)
            .unwrap();

        let rows: Vec<&CapturedRow> = pass.rows.iter().map(|row| &row.output).collect();
        assert_eq!(
            rows[0].selection,
            Some(Range::new(Point::new(vec![0, 0], 2), Point::new(vec![0, 0], 5)))
        );
        assert_eq!(
            rows[1].selection,
            Some(Range::new(Point::new(vec![1, 0], 0), Point::new(vec![1, 0], 3)))
        );
    }

    #[test]
    fn test_each_pass_rebuilds_positions() {
        // Given a long document rendered at the top
        let doc = crate::document::generate_huge_document(10, 7);
        let children = doc.children_of(doc.root());
        let mut renderer = ChildrenRenderer::new();
        let viewport = tall_viewport();
        renderer
            .render(
                &doc,
                &RenderRequest::for_parent(&doc, doc.root(), viewport),
                &NoDecorations,
                &mut Capture,
            )
            .unwrap();
        assert_eq!(renderer.positions().sibling_index(children[0]), Ok(0));

        // When scrolling far down
        let pass = renderer
            .render(
                &doc,
                &RenderRequest::for_parent(&doc, doc.root(), viewport.scrolled_to(3000.0)),
                &NoDecorations,
                &mut Capture,
            )
            .unwrap();

        // Then only the new window has positions
        assert_eq!(pass.pass, 2);
        assert_eq!(pass.window, VisibleRange::inclusive(50, 59));
        assert_eq!(
            renderer.positions().sibling_index(children[0]),
            Err(EngineError::PositionUnknown(children[0]))
        );
        assert_eq!(renderer.positions().sibling_index(children[55]), Ok(55));
        assert_eq!(renderer.positions().len(), 10);
    }
}
