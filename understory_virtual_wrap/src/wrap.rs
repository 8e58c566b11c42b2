// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wrap geometry: items per row, extent, and arranged positions.
//!
//! Items are laid out as a flat sequence of cells wrapped into rows. In a
//! vertical orientation rows stack top to bottom and cells fill each row from
//! the left; a horizontal orientation swaps the axes. All formulas here are
//! written against the logical primary/secondary axes of [`Orientation`].

use kurbo::{Rect, Size, Vec2};

use crate::util::floor_index;
use crate::{Orientation, SpacingMode};

/// Geometry of one layout pass over a uniform-sized item sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapMetrics {
    orientation: Orientation,
    item_count: usize,
    child_size: Size,
    items_per_row: usize,
    row_count: usize,
}

impl WrapMetrics {
    /// Computes the row structure for `item_count` items of `child_size`
    /// within `available`.
    ///
    /// An infinite primary extent places every item in a single row.
    #[must_use]
    pub fn new(
        orientation: Orientation,
        item_count: usize,
        child_size: Size,
        available: Size,
    ) -> Self {
        let available_primary = orientation.primary(available);
        let child_primary = orientation.primary(child_size);
        let items_per_row = if available_primary.is_infinite() || child_primary <= 0.0 {
            item_count.max(1)
        } else {
            floor_index(available_primary / child_primary).max(1)
        };
        let row_count = item_count.div_ceil(items_per_row);
        Self {
            orientation,
            item_count,
            child_size,
            items_per_row,
            row_count,
        }
    }

    /// Orientation the metrics were computed for.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Number of items.
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    /// Measured (unstretched) size of one item.
    #[must_use]
    pub const fn child_size(&self) -> Size {
        self.child_size
    }

    /// Items in one row. Always at least `1`.
    #[must_use]
    pub const fn items_per_row(&self) -> usize {
        self.items_per_row
    }

    /// Number of rows, `ceil(item_count / items_per_row)`.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    /// Secondary extent of one row.
    #[must_use]
    pub const fn row_extent(&self) -> f64 {
        self.orientation.secondary(self.child_size)
    }

    /// Secondary extent of all rows.
    #[must_use]
    pub fn content_secondary(&self) -> f64 {
        #[allow(
            clippy::cast_precision_loss,
            reason = "Row counts stay far below the f64 mantissa limit"
        )]
        let rows = self.row_count as f64;
        self.row_extent() * rows
    }

    /// Row containing `index`.
    #[must_use]
    pub const fn row_of(&self, index: usize) -> usize {
        index / self.items_per_row
    }

    /// Position of `index` within its row.
    #[must_use]
    pub const fn column_of(&self, index: usize) -> usize {
        index % self.items_per_row
    }

    /// Row whose span contains secondary `offset`, clamped to the last populated row.
    #[must_use]
    pub fn row_at(&self, offset: f64) -> usize {
        let row_extent = self.row_extent();
        if self.row_count == 0 || row_extent <= 0.0 {
            return 0;
        }
        floor_index(offset / row_extent).min(self.row_count - 1)
    }

    /// Secondary offset of the start of `row`.
    #[must_use]
    pub fn row_offset(&self, row: usize) -> f64 {
        #[allow(
            clippy::cast_precision_loss,
            reason = "Row indices stay far below the f64 mantissa limit"
        )]
        let row = row as f64;
        row * self.row_extent()
    }

    /// Total logical size of the laid-out sequence.
    ///
    /// When spacing is active and the available primary extent is finite the
    /// rows fill it; otherwise the rows are exactly as wide as their items.
    #[must_use]
    pub fn extent(&self, available: Size, spacing: SpacingMode) -> Size {
        let o = self.orientation;
        let available_primary = o.primary(available);
        let primary = if spacing != SpacingMode::None && available_primary.is_finite() {
            available_primary
        } else {
            o.primary(self.child_size) * self.items_per_row_f64()
        };
        o.size(primary, self.content_secondary())
    }

    /// Arranged child size and spacing for a row of `final_size`.
    ///
    /// With `stretch`, items grow along the primary axis towards an equal share
    /// of the row, never beyond `max_child` and never below their measured size.
    #[must_use]
    pub fn row_layout(
        &self,
        final_size: Size,
        spacing: SpacingMode,
        stretch: bool,
        max_child: Size,
    ) -> RowLayout {
        let o = self.orientation;
        let per_row = self.items_per_row_f64();
        let final_primary = o.primary(final_size);
        let measured = o.primary(self.child_size);

        let mut child_primary = measured;
        if stretch && final_primary.is_finite() {
            let share = (final_primary / per_row).min(o.primary(max_child));
            child_primary = measured.max(share);
        }

        let unused = if final_primary.is_finite() {
            (final_primary - (child_primary * per_row).min(final_primary)).max(0.0)
        } else {
            0.0
        };
        let (inner, outer) = distribute(unused, self.items_per_row, spacing);
        RowLayout {
            child_size: o.size(child_primary, self.row_extent()),
            inner_spacing: inner,
            outer_spacing: outer,
        }
    }

    /// Arranged rect of `index`, shifted by the scroll `offset`.
    #[must_use]
    pub fn item_rect(&self, index: usize, layout: &RowLayout, offset: Vec2) -> Rect {
        let o = self.orientation;
        #[allow(
            clippy::cast_precision_loss,
            reason = "Row and column indices stay far below the f64 mantissa limit"
        )]
        let column = self.column_of(index) as f64;
        let child_primary = o.primary(layout.child_size);
        let primary = layout.outer_spacing + column * (child_primary + layout.inner_spacing)
            - o.primary_of(offset);
        let secondary = self.row_offset(self.row_of(index)) - o.secondary_of(offset);
        Rect::from_origin_size(o.point(primary, secondary), layout.child_size)
    }

    fn items_per_row_f64(&self) -> f64 {
        #[allow(
            clippy::cast_precision_loss,
            reason = "Items per row stay far below the f64 mantissa limit"
        )]
        let per_row = self.items_per_row as f64;
        per_row
    }
}

/// Arranged child size and the spacing applied within a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLayout {
    /// Size every realized child is arranged with.
    pub child_size: Size,
    /// Gap between adjacent items.
    pub inner_spacing: f64,
    /// Gap before the first and after the last item.
    pub outer_spacing: f64,
}

/// Splits `unused` row space into `(inner, outer)` gaps for `per_row` items.
fn distribute(unused: f64, per_row: usize, mode: SpacingMode) -> (f64, f64) {
    #[allow(
        clippy::cast_precision_loss,
        reason = "Items per row stay far below the f64 mantissa limit"
    )]
    let per_row = per_row as f64;
    match mode {
        SpacingMode::None => (0.0, 0.0),
        SpacingMode::Uniform => {
            let gap = unused / (per_row + 1.0);
            (gap, gap)
        }
        SpacingMode::BetweenItemsOnly => (unused / (per_row - 1.0).max(1.0), 0.0),
        SpacingMode::StartAndEndOnly => (0.0, unused / 2.0),
    }
}
