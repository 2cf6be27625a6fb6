//! # Points, Ranges and Decorations
//!
//! A [`Point`] addresses a position inside a text leaf; a [`Range`] is an
//! unordered pair of points. [`intersect`] is the range algebra every
//! decoration and the selection go through before they reach a row.

pub mod decoration;
pub mod search;

use std::cmp::{max, min};
use std::fmt;

use crate::tree::Path;

pub use decoration::{
    Decorate, Decoration, NoDecorations, NodeEntry, ResolvedDecorations, decorations_for,
};
pub use search::search_decorations;

/// A position within a text leaf: the leaf's path plus a `char` offset.
///
/// Points order by path first, then by offset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.offset)
    }
}

/// An anchor/focus pair. The two points may come in either order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    /// The earlier of the two points.
    pub fn start(&self) -> &Point {
        min(&self.anchor, &self.focus)
    }

    /// The later of the two points.
    pub fn end(&self) -> &Point {
        max(&self.anchor, &self.focus)
    }

    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Same span with anchor before focus.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self::new(self.start().clone(), self.end().clone())
    }

    pub fn intersection(&self, other: &Range) -> Option<Range> {
        intersect(self, other)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start(), self.end())
    }
}

/// Overlap of two ranges, normalized so anchor <= focus.
///
/// Zero-width overlaps are dropped: ranges that only touch at a boundary (the
/// end of one is the start of the other) do not intersect, so a highlight
/// never leaks onto a neighbouring node.
pub fn intersect(a: &Range, b: &Range) -> Option<Range> {
    let start = max(a.start(), b.start());
    let end = min(a.end(), b.end());

    if start >= end {
        return None;
    }
    Some(Range::new(start.clone(), end.clone()))
}
