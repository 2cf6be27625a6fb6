use std::collections::BTreeMap;
use std::ops;

use crate::error::{EngineError, Result};

/// Scroll position and geometry of the viewport, in host units (pixels,
/// terminal lines, ...). Rows have a fixed height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    pub row_height: f64,
    /// Extra rows realized on each side of the visible range
    pub overscan: usize,
}

impl ViewportState {
    pub fn new(scroll_offset: f64, viewport_height: f64, row_height: f64) -> Self {
        Self {
            scroll_offset,
            viewport_height,
            row_height,
            overscan: 0,
        }
    }

    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    #[must_use]
    pub fn scrolled_to(mut self, scroll_offset: f64) -> Self {
        self.scroll_offset = scroll_offset;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.row_height.is_finite() || self.row_height <= 0.0 {
            return Err(EngineError::ConfigurationError(format!(
                "row height must be positive, got {}",
                self.row_height
            )));
        }
        if !self.viewport_height.is_finite() || self.viewport_height < 0.0 {
            return Err(EngineError::ConfigurationError(format!(
                "viewport height must be non-negative, got {}",
                self.viewport_height
            )));
        }
        if !self.scroll_offset.is_finite() {
            return Err(EngineError::ConfigurationError(format!(
                "scroll offset must be finite, got {}",
                self.scroll_offset
            )));
        }
        Ok(())
    }

    /// Height of the whole scrollable strip.
    pub fn total_height(&self, total_count: usize) -> f64 {
        total_count as f64 * self.row_height
    }

    /// Top edge of row `index`.
    pub fn row_offset(&self, index: usize) -> f64 {
        index as f64 * self.row_height
    }

    /// Realized range: the visible range widened by `overscan` on both sides.
    pub fn window(&self, total_count: usize) -> Result<VisibleRange> {
        let visible = visible_range(
            self.scroll_offset,
            self.viewport_height,
            self.row_height,
            total_count,
        )?;
        if visible.is_empty() {
            return Ok(visible);
        }
        Ok(VisibleRange {
            start: visible.start.saturating_sub(self.overscan),
            end: visible.end.saturating_add(self.overscan).min(total_count),
        })
    }
}

/// Contiguous run of row indices, stored half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibleRange {
    start: usize,
    end: usize,
}

impl VisibleRange {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Inclusive `first..=last`.
    pub fn inclusive(first: usize, last: usize) -> Self {
        Self {
            start: first,
            end: last + 1,
        }
    }

    pub fn first(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.start)
    }

    pub fn last(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.end - 1)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    pub fn indices(&self) -> ops::Range<usize> {
        self.start..self.end
    }
}

/// Rows intersecting the viewport, inclusive and clamped to the row count.
///
/// `first = floor(scroll / row_height)` and
/// `last = min(count - 1, ceil((scroll + viewport) / row_height))`. A negative
/// scroll offset counts as 0 and a scroll past the end shows the last row.
pub fn visible_range(
    scroll_offset: f64,
    viewport_height: f64,
    row_height: f64,
    total_count: usize,
) -> Result<VisibleRange> {
    ViewportState::new(scroll_offset, viewport_height, row_height).validate()?;
    if total_count == 0 {
        return Ok(VisibleRange::empty());
    }

    let scroll = scroll_offset.max(0.0);
    let max_index = total_count - 1;
    let first = ((scroll / row_height).floor() as usize).min(max_index);
    let last = (((scroll + viewport_height) / row_height).ceil() as usize).min(max_index);

    Ok(VisibleRange::inclusive(first, last))
}

/// Identifier of a recyclable row slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub usize);

/// Computes the realized window and binds each realized index to a slot.
///
/// Indices that stay in the window keep their slot across passes, indices
/// that leave give theirs back to a free list, and newly visible indices reuse
/// freed slots before new ones are allocated. The pool therefore never grows
/// past the largest window it has served, whatever the document size.
#[derive(Debug, Default)]
pub struct Virtualizer {
    bound: BTreeMap<usize, SlotId>,
    free: Vec<SlotId>,
    allocated: usize,
    window: VisibleRange,
}

impl Virtualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the window for `viewport` and rebind slots.
    pub fn update(&mut self, viewport: &ViewportState, total_count: usize) -> Result<VisibleRange> {
        let window = viewport.window(total_count)?;

        let leaving: Vec<usize> = self
            .bound
            .keys()
            .copied()
            .filter(|&index| !window.contains(index))
            .collect();
        for index in leaving {
            if let Some(slot) = self.bound.remove(&index) {
                self.free.push(slot);
            }
        }

        for index in window.indices() {
            if self.bound.contains_key(&index) {
                continue;
            }
            let slot = self.free.pop().unwrap_or_else(|| {
                let slot = SlotId(self.allocated);
                self.allocated += 1;
                slot
            });
            self.bound.insert(index, slot);
        }

        log::trace!(
            "window {:?}..{:?} of {total_count}, {} slots allocated",
            window.first(),
            window.last(),
            self.allocated
        );
        self.window = window;
        Ok(window)
    }

    /// Update the window and call `row` once per realized index, in ascending
    /// order, with the slot bound to that index. Rows for which `row` returns
    /// `Ok(None)` are left out; an error stops the walk and is returned.
    pub fn materialize<R>(
        &mut self,
        viewport: &ViewportState,
        total_count: usize,
        mut row: impl FnMut(usize, SlotId) -> Result<Option<R>>,
    ) -> Result<Vec<R>> {
        let window = self.update(viewport, total_count)?;
        let mut rows = Vec::with_capacity(window.len());
        for index in window.indices() {
            let slot = self.slot_for(index);
            debug_assert!(slot.is_some(), "update binds every index in the window");
            let Some(slot) = slot else {
                continue;
            };
            if let Some(output) = row(index, slot)? {
                rows.push(output);
            }
        }
        Ok(rows)
    }

    pub fn slot_for(&self, index: usize) -> Option<SlotId> {
        self.bound.get(&index).copied()
    }

    pub fn window(&self) -> VisibleRange {
        self.window
    }

    /// Number of slots ever allocated.
    pub fn pool_size(&self) -> usize {
        self.allocated
    }
}
