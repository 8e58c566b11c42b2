// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Panel configuration.

use kurbo::Size;

use crate::{CacheLength, CacheUnit, Orientation};

/// Pixel distance of one line scroll in [`ScrollUnit::Pixel`] mode.
pub const SCROLL_LINE_DELTA: f64 = 16.0;
/// Pixel distance of one wheel notch in [`ScrollUnit::Pixel`] mode.
pub const MOUSE_WHEEL_DELTA: f64 = 48.0;
/// Items scrolled by one line in [`ScrollUnit::Item`] mode.
pub const SCROLL_LINE_DELTA_ITEMS: usize = 1;
/// Items scrolled by one wheel notch in [`ScrollUnit::Item`] mode.
pub const MOUSE_WHEEL_DELTA_ITEMS: usize = 3;

/// How unused row space is distributed around items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SpacingMode {
    /// No distribution; items are packed at the row start.
    None,
    /// Equal gaps between items and at both row edges.
    #[default]
    Uniform,
    /// Gaps only between items; the row edges stay flush.
    BetweenItemsOnly,
    /// Gaps only at the two row edges; items stay packed together.
    StartAndEndOnly,
}

/// Unit of line and wheel scrolling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScrollUnit {
    /// Fixed pixel deltas.
    #[default]
    Pixel,
    /// Deltas expressed as a number of items.
    Item,
}

/// Axis the mouse wheel scrolls along.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    /// Wheel up/down scroll vertically.
    #[default]
    Vertical,
    /// Wheel up/down are redirected to left/right.
    Horizontal,
}

/// What happens to a container when its item leaves the item range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VirtualizationMode {
    /// Containers are discarded.
    Standard,
    /// Containers are unbound and kept for reuse.
    #[default]
    Recycling,
}

/// Configuration for a [`VirtualWrapPanel`](crate::VirtualWrapPanel).
#[derive(Debug, Clone, PartialEq)]
pub struct WrapConfig {
    /// Row stacking direction.
    pub orientation: Orientation,
    /// Fixed item size. When `None` the size is taken from the first realized container.
    pub item_size: Option<Size>,
    /// Distribution of unused row space.
    pub spacing_mode: SpacingMode,
    /// Expand items along the primary axis to fill the row.
    pub stretch_items: bool,
    /// Unit of line and wheel scrolling.
    pub scroll_unit: ScrollUnit,
    /// Axis the mouse wheel scrolls along.
    pub wheel_direction: ScrollDirection,
    /// Cache zone before and after the viewport.
    pub cache_length: CacheLength,
    /// Unit of [`WrapConfig::cache_length`].
    pub cache_unit: CacheUnit,
    /// Recycling policy for virtualized containers.
    pub virtualization_mode: VirtualizationMode,
    /// Pixel line delta.
    pub line_delta: f64,
    /// Pixel wheel delta.
    pub wheel_delta: f64,
    /// Item line delta.
    pub line_delta_items: usize,
    /// Item wheel delta.
    pub wheel_delta_items: usize,
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            item_size: None,
            spacing_mode: SpacingMode::Uniform,
            stretch_items: false,
            scroll_unit: ScrollUnit::Pixel,
            wheel_direction: ScrollDirection::Vertical,
            cache_length: CacheLength::uniform(1.0),
            cache_unit: CacheUnit::Page,
            virtualization_mode: VirtualizationMode::Recycling,
            line_delta: SCROLL_LINE_DELTA,
            wheel_delta: MOUSE_WHEEL_DELTA,
            line_delta_items: SCROLL_LINE_DELTA_ITEMS,
            wheel_delta_items: MOUSE_WHEEL_DELTA_ITEMS,
        }
    }
}

impl WrapConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`WrapConfig::orientation`].
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Sets a fixed item size.
    #[must_use]
    pub fn with_item_size(mut self, size: Size) -> Self {
        debug_assert!(
            size.width.is_finite() && size.height.is_finite(),
            "fixed item sizes must be finite; got {size:?}"
        );
        self.item_size = Some(size);
        self
    }

    /// Sets [`WrapConfig::spacing_mode`].
    #[must_use]
    pub fn with_spacing_mode(mut self, mode: SpacingMode) -> Self {
        self.spacing_mode = mode;
        self
    }

    /// Sets [`WrapConfig::stretch_items`].
    #[must_use]
    pub fn with_stretch_items(mut self, stretch: bool) -> Self {
        self.stretch_items = stretch;
        self
    }

    /// Sets [`WrapConfig::scroll_unit`].
    #[must_use]
    pub fn with_scroll_unit(mut self, unit: ScrollUnit) -> Self {
        self.scroll_unit = unit;
        self
    }

    /// Sets [`WrapConfig::wheel_direction`].
    #[must_use]
    pub fn with_wheel_direction(mut self, direction: ScrollDirection) -> Self {
        self.wheel_direction = direction;
        self
    }

    /// Sets the cache zone.
    #[must_use]
    pub fn with_cache(mut self, length: CacheLength, unit: CacheUnit) -> Self {
        self.cache_length = length;
        self.cache_unit = unit;
        self
    }

    /// Sets [`WrapConfig::virtualization_mode`].
    #[must_use]
    pub fn with_virtualization_mode(mut self, mode: VirtualizationMode) -> Self {
        self.virtualization_mode = mode;
        self
    }
}
