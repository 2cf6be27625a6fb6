//! Viewport-driven windowing: which children are realized, and rendering
//! them.

pub mod renderer;
pub mod virtualizer;

pub use renderer::{
    ChildrenRenderer, RenderPass, RenderRequest, RenderRow, RenderedRow, RowProps, SkippedRow,
};
pub use virtualizer::{SlotId, ViewportState, VisibleRange, Virtualizer, visible_range};
