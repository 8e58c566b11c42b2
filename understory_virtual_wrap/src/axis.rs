// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Orientation-aware coordinate mapping.
//!
//! Every wrap formula is written once in terms of two logical axes:
//!
//! - the **primary** axis, along which items are placed within a row, and
//! - the **secondary** axis, along which rows are stacked (and which is the
//!   usual scrolling direction).
//!
//! [`Orientation`] maps those logical axes onto physical `x`/`y` components.

use kurbo::{Point, Size, Vec2};

/// A physical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The `x` axis.
    Horizontal,
    /// The `y` axis.
    Vertical,
}

impl Axis {
    /// Returns the other axis.
    #[must_use]
    pub const fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Component of `size` along this axis.
    #[must_use]
    pub const fn of_size(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Component of `v` along this axis.
    #[must_use]
    pub const fn of_vec(self, v: Vec2) -> f64 {
        match self {
            Self::Horizontal => v.x,
            Self::Vertical => v.y,
        }
    }

    /// Returns `v` with the component along this axis replaced by `value`.
    #[must_use]
    pub const fn with_vec(self, v: Vec2, value: f64) -> Vec2 {
        match self {
            Self::Horizontal => Vec2::new(value, v.y),
            Self::Vertical => Vec2::new(v.x, value),
        }
    }

    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        }
    }
}

/// Direction in which rows are stacked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Items fill a row left to right; rows stack top to bottom.
    #[default]
    Vertical,
    /// Items fill a column top to bottom; columns stack left to right.
    Horizontal,
}

impl Orientation {
    /// Physical axis items advance along within one row.
    #[must_use]
    pub const fn primary_axis(self) -> Axis {
        match self {
            Self::Vertical => Axis::Horizontal,
            Self::Horizontal => Axis::Vertical,
        }
    }

    /// Physical axis rows advance along.
    #[must_use]
    pub const fn secondary_axis(self) -> Axis {
        self.primary_axis().cross()
    }

    /// Primary component of `size`.
    #[must_use]
    pub const fn primary(self, size: Size) -> f64 {
        self.primary_axis().of_size(size)
    }

    /// Secondary component of `size`.
    #[must_use]
    pub const fn secondary(self, size: Size) -> f64 {
        self.secondary_axis().of_size(size)
    }

    /// Primary component of `v`.
    #[must_use]
    pub const fn primary_of(self, v: Vec2) -> f64 {
        self.primary_axis().of_vec(v)
    }

    /// Secondary component of `v`.
    #[must_use]
    pub const fn secondary_of(self, v: Vec2) -> f64 {
        self.secondary_axis().of_vec(v)
    }

    /// Builds a physical size from logical components.
    #[must_use]
    pub const fn size(self, primary: f64, secondary: f64) -> Size {
        match self {
            Self::Vertical => Size::new(primary, secondary),
            Self::Horizontal => Size::new(secondary, primary),
        }
    }

    /// Builds a physical point from logical components.
    #[must_use]
    pub const fn point(self, primary: f64, secondary: f64) -> Point {
        match self {
            Self::Vertical => Point::new(primary, secondary),
            Self::Horizontal => Point::new(secondary, primary),
        }
    }

    /// Builds a physical vector from logical components.
    #[must_use]
    pub const fn vec(self, primary: f64, secondary: f64) -> Vec2 {
        match self {
            Self::Vertical => Vec2::new(primary, secondary),
            Self::Horizontal => Vec2::new(secondary, primary),
        }
    }
}
