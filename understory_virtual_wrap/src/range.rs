// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item range computation under the different cache policies.

use core::ops::RangeInclusive;

use crate::WrapMetrics;
use crate::util::{ceil_index, floor_index};

/// Closed interval `[first, last]` of item indices that must be realized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemRange {
    /// First index (inclusive).
    pub first: usize,
    /// Last index (inclusive).
    pub last: usize,
}

impl ItemRange {
    /// Creates a range. `first` must not exceed `last`.
    #[must_use]
    pub fn new(first: usize, last: usize) -> Self {
        debug_assert!(first <= last, "ItemRange requires first <= last; got {first}..={last}");
        Self { first, last }
    }

    /// Number of indices in the range.
    pub(crate) const fn len(&self) -> usize {
        self.last - self.first + 1
    }

    /// Returns `true` if `index` lies within the range.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        index >= self.first && index <= self.last
    }

    /// Iterator over all indices in the range.
    pub fn indices(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }

    /// Grows the range by `before`/`after` indices, clamped to `[0, len - 1]`.
    #[must_use]
    pub fn expand(self, before: usize, after: usize, len: usize) -> Self {
        let max = len.saturating_sub(1);
        Self {
            first: self.first.saturating_sub(before),
            last: self.last.saturating_add(after).min(max),
        }
    }

    /// Widens the range so that it starts and ends on whole rows.
    #[must_use]
    pub fn snap_to_rows(self, items_per_row: usize, len: usize) -> Self {
        let per_row = items_per_row.max(1);
        let max = len.saturating_sub(1);
        let first = (self.first / per_row) * per_row;
        let last = ((self.last / per_row) * per_row)
            .saturating_add(per_row - 1)
            .min(max);
        Self { first, last }
    }
}

/// Unit of a [`CacheLength`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CacheUnit {
    /// Logical pixels.
    Pixel,
    /// Items.
    Item,
    /// Viewports worth of items. Not supported inside a group.
    #[default]
    Page,
}

/// Extra realization margin before and after the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheLength {
    /// Margin before the viewport.
    pub before: f64,
    /// Margin after the viewport.
    pub after: f64,
}

impl CacheLength {
    /// No cache.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates an asymmetric cache length.
    #[must_use]
    pub const fn new(before: f64, after: f64) -> Self {
        Self { before, after }
    }

    /// Creates the same cache length on both sides.
    #[must_use]
    pub const fn uniform(length: f64) -> Self {
        Self::new(length, length)
    }

    fn clamped(self) -> Self {
        let fix = |v: f64| if v.is_nan() || v < 0.0 { 0.0 } else { v };
        Self::new(fix(self.before), fix(self.after))
    }
}

/// Inputs of one item range computation along the secondary (row) axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeRequest {
    /// Scroll offset along the secondary axis.
    pub offset: f64,
    /// Viewport extent along the secondary axis.
    pub viewport: f64,
    /// Cache zone.
    pub cache_length: CacheLength,
    /// Unit of the cache zone.
    pub cache_unit: CacheUnit,
    /// Secondary extent of the enclosing group header, when hosted in a group.
    pub group_header: Option<f64>,
}

impl RangeRequest {
    /// Creates a flat (non-grouped) request.
    #[must_use]
    pub const fn flat(
        offset: f64,
        viewport: f64,
        cache_length: CacheLength,
        cache_unit: CacheUnit,
    ) -> Self {
        Self {
            offset,
            viewport,
            cache_length,
            cache_unit,
            group_header: None,
        }
    }

    /// The cache unit that actually applies. Groups cannot cache by page and
    /// fall back to item semantics with the same counts.
    #[must_use]
    pub fn effective_cache_unit(&self) -> CacheUnit {
        match (self.group_header, self.cache_unit) {
            (Some(_), CacheUnit::Page) => CacheUnit::Item,
            (_, unit) => unit,
        }
    }
}

/// Computes the closed index range to keep realized, or `None` when nothing
/// intersects the (cache-extended) viewport.
///
/// The result always satisfies `first <= last <= item_count - 1`.
pub fn compute_item_range(metrics: &WrapMetrics, request: &RangeRequest) -> Option<ItemRange> {
    let len = metrics.item_count();
    if len == 0 {
        return None;
    }
    let per_row = metrics.items_per_row();
    let row_extent = metrics.row_extent();

    let unit = request.effective_cache_unit();
    #[cfg(feature = "tracing")]
    if unit != request.cache_unit {
        tracing::warn!(
            requested = ?request.cache_unit,
            "page cache is not supported inside a group; using item cache"
        );
    }
    let cache = request.cache_length.clamped();

    if row_extent.is_nan() || row_extent <= 0.0 {
        // Degenerate zero-extent rows: everything sits at offset zero.
        return Some(ItemRange::new(0, per_row.min(len) - 1));
    }

    let header = request.group_header.unwrap_or(0.0).max(0.0);
    let mut start = request.offset - header;
    let mut end = start + request.viewport.max(0.0);
    if unit == CacheUnit::Pixel {
        start -= cache.before;
        end += cache.after;
    }
    let start = start.max(0.0);
    let end = end.min(metrics.content_secondary());
    if end.is_nan() || end <= start {
        return None;
    }

    let last_row_index = metrics.row_count() - 1;
    let first_row = metrics.row_at(start);
    let last_row = ceil_index(end / row_extent)
        .saturating_sub(1)
        .clamp(first_row, last_row_index);

    let visible = ItemRange::new(
        first_row * per_row,
        last_row
            .saturating_mul(per_row)
            .saturating_add(per_row - 1)
            .min(len - 1),
    );

    let range = match unit {
        CacheUnit::Pixel => visible,
        CacheUnit::Item => visible
            .expand(floor_index(cache.before), floor_index(cache.after), len)
            .snap_to_rows(per_row, len),
        CacheUnit::Page => {
            #[allow(
                clippy::cast_precision_loss,
                reason = "Page sizes are far below the f64 mantissa limit"
            )]
            let page = visible.len() as f64;
            visible
                .expand(
                    floor_index(page * cache.before),
                    floor_index(page * cache.after),
                    len,
                )
                .snap_to_rows(per_row, len)
        }
    };
    Some(range)
}
