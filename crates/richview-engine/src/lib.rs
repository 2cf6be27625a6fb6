//! # richview engine
//!
//! Windowed rendering and decoration resolution for large rich-text
//! documents. Given a tree of block/inline nodes ending in text leaves, the
//! engine renders only the children that fall inside a scrollable viewport,
//! and for each of them works out which decorations (search matches, plugin
//! marks) and which part of the selection apply.
//!
//! ## Usage Pattern
//!
//! ```rust
//! use richview_engine::{
//!     ChildrenRenderer, DocumentBuilder, NoDecorations, RenderRequest, RenderRow, RowProps,
//!     ViewportState,
//! };
//!
//! struct Paths;
//!
//! impl RenderRow for Paths {
//!     type Output = String;
//!
//!     fn render_row(&mut self, props: RowProps<'_>) -> String {
//!         props.path.to_string()
//!     }
//! }
//!
//! let doc = DocumentBuilder::new().heading("Title").paragraph("Body").build();
//! let mut renderer = ChildrenRenderer::new();
//! let request = RenderRequest::for_parent(&doc, doc.root(), ViewportState::new(0.0, 500.0, 60.0));
//!
//! let pass = renderer.render(&doc, &request, &NoDecorations, &mut Paths).unwrap();
//! let paths: Vec<_> = pass.rows.iter().map(|row| row.output.as_str()).collect();
//! assert_eq!(paths, ["[0]", "[1]"]);
//! ```

pub mod document;
pub mod error;
pub mod range;
pub mod tree;
pub mod window;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use document::{
    Document, DocumentBuilder, DocumentError, Element, Node, NodeId, Text, generate_huge_document,
    parse_plain_text,
};
pub use error::EngineError;
pub use range::{
    Decorate, Decoration, NoDecorations, NodeEntry, Point, Range, ResolvedDecorations,
    decorations_for, intersect, search_decorations,
};
pub use tree::{IdentityRegistry, Key, Path, PathResolver, Position, PositionIndex, resolve_path};
pub use window::{
    ChildrenRenderer, RenderPass, RenderRequest, RenderRow, RenderedRow, RowProps, SkippedRow,
    SlotId, ViewportState, Virtualizer, VisibleRange, visible_range,
};
