// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll state, scroll commands, and the scroll-owner seam.

use kurbo::{Size, Vec2};

use crate::util::clamp_non_negative;
use crate::{Axis, ScrollDirection};

/// Offset, extent, and viewport of a scrollable panel.
///
/// The offset is kept within `[0, extent - viewport]` on both axes at all
/// times, and is forced to `0` on an axis whose viewport covers the extent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollState {
    offset: Vec2,
    extent: Size,
    viewport: Size,
}

impl ScrollState {
    /// Creates an empty state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            offset: Vec2::ZERO,
            extent: Size::ZERO,
            viewport: Size::ZERO,
        }
    }

    /// Current scroll offset.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Total size of the content.
    #[must_use]
    pub const fn extent(&self) -> Size {
        self.extent
    }

    /// Size of the visible window.
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    /// Largest valid offset along `axis`.
    #[must_use]
    pub fn max_offset(&self, axis: Axis) -> f64 {
        let extent = axis.of_size(self.extent);
        let viewport = axis.of_size(self.viewport);
        if viewport >= extent {
            0.0
        } else {
            extent - viewport
        }
    }

    /// Sets the offset along `axis`, clamped. Returns `true` if it changed.
    pub fn set_offset(&mut self, axis: Axis, value: f64) -> bool {
        let clamped = clamp_non_negative(value, self.max_offset(axis));
        if clamped == axis.of_vec(self.offset) {
            return false;
        }
        self.offset = axis.with_vec(self.offset, clamped);
        true
    }

    /// Replaces extent and viewport, re-clamping the offset.
    /// Returns `true` if any of offset, extent, or viewport changed.
    pub fn set_bounds(&mut self, extent: Size, viewport: Size) -> bool {
        let mut changed = extent != self.extent || viewport != self.viewport;
        self.extent = extent;
        self.viewport = viewport;
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let current = axis.of_vec(self.offset);
            changed |= self.set_offset(axis, current);
        }
        changed
    }

    /// Adopts offset and viewport from an enclosing group verbatim.
    pub(crate) fn adopt(&mut self, offset: Vec2, extent: Size, viewport: Size) {
        self.offset = offset;
        self.extent = extent;
        self.viewport = viewport;
    }
}

/// Configured scrollbar policy of the scroll owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScrollBarPolicy {
    /// Shown only when the content overflows.
    #[default]
    Auto,
    /// Always shown.
    Visible,
    /// Never shown, but scrolling is still possible.
    Hidden,
    /// Never shown and scrolling is disabled.
    Disabled,
}

/// Visibility of a scrollbar as computed by the scroll owner's last layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScrollBarVisibility {
    /// Shown.
    Visible,
    /// Not shown, but still occupies space.
    Hidden,
    /// Not shown and takes no space.
    #[default]
    Collapsed,
}

/// The host's scroll viewer.
///
/// It is notified whenever offset, extent, or viewport change and reports its
/// scrollbar state to break measure feedback loops.
pub trait ScrollOwner {
    /// Offset, extent, or viewport changed.
    fn invalidate_scroll_info(&mut self);

    /// Configured scrollbar policy for `axis`.
    fn scroll_bar_policy(&self, axis: Axis) -> ScrollBarPolicy {
        let _ = axis;
        ScrollBarPolicy::Auto
    }

    /// Scrollbar visibility computed in the owner's last layout for `axis`.
    fn computed_visibility(&self, axis: Axis) -> ScrollBarVisibility {
        let _ = axis;
        ScrollBarVisibility::Visible
    }

    /// Whether the owner's own measure is currently valid.
    fn is_measure_valid(&self) -> bool {
        true
    }
}

/// Detects scrollbars that disappeared for a reason other than this panel's
/// last measure.
///
/// Measuring in such a state would swap the scrollbar back in, which shrinks
/// the viewport, which hides it again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityGuard {
    previous: [ScrollBarVisibility; 2],
}

impl VisibilityGuard {
    /// Creates a guard assuming both scrollbars start collapsed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            previous: [ScrollBarVisibility::Collapsed; 2],
        }
    }

    /// Records the owner's current visibility and returns `true` if this
    /// measure pass should be skipped.
    pub fn should_skip(&mut self, owner: &dyn ScrollOwner) -> bool {
        let mut got_hidden = false;
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let computed = owner.computed_visibility(axis);
            let previous = core::mem::replace(&mut self.previous[axis.slot()], computed);
            got_hidden |= owner.scroll_bar_policy(axis) == ScrollBarPolicy::Auto
                && computed != ScrollBarVisibility::Visible
                && computed != previous;
        }
        got_hidden && !owner.is_measure_valid()
    }
}

/// A line, wheel, or page scroll request bound to input handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollCommand {
    /// One line up.
    LineUp,
    /// One line down.
    LineDown,
    /// One line left.
    LineLeft,
    /// One line right.
    LineRight,
    /// One wheel notch up.
    WheelUp,
    /// One wheel notch down.
    WheelDown,
    /// One wheel notch left.
    WheelLeft,
    /// One wheel notch right.
    WheelRight,
    /// One viewport up.
    PageUp,
    /// One viewport down.
    PageDown,
    /// One viewport left.
    PageLeft,
    /// One viewport right.
    PageRight,
}

/// Magnitude class of a [`ScrollCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollStep {
    /// Line.
    Line,
    /// Wheel notch.
    Wheel,
    /// Viewport.
    Page,
}

impl ScrollCommand {
    /// Physical axis the command scrolls along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::LineUp
            | Self::LineDown
            | Self::WheelUp
            | Self::WheelDown
            | Self::PageUp
            | Self::PageDown => Axis::Vertical,
            _ => Axis::Horizontal,
        }
    }

    /// `-1.0` towards the start, `1.0` towards the end.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::LineUp
            | Self::LineLeft
            | Self::WheelUp
            | Self::WheelLeft
            | Self::PageUp
            | Self::PageLeft => -1.0,
            _ => 1.0,
        }
    }

    /// Magnitude class.
    #[must_use]
    pub const fn step(self) -> ScrollStep {
        match self {
            Self::LineUp | Self::LineDown | Self::LineLeft | Self::LineRight => ScrollStep::Line,
            Self::WheelUp | Self::WheelDown | Self::WheelLeft | Self::WheelRight => {
                ScrollStep::Wheel
            }
            Self::PageUp | Self::PageDown | Self::PageLeft | Self::PageRight => ScrollStep::Page,
        }
    }

    /// Redirects vertical wheel commands to the horizontal pair when the wheel
    /// is configured to scroll horizontally.
    #[must_use]
    pub const fn redirect_wheel(self, direction: ScrollDirection) -> Self {
        match (self, direction) {
            (Self::WheelUp, ScrollDirection::Horizontal) => Self::WheelLeft,
            (Self::WheelDown, ScrollDirection::Horizontal) => Self::WheelRight,
            (other, _) => other,
        }
    }
}

/// Alignment mode when scrolling a specific index into view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Align the start of the item's row with the start of the viewport.
    #[default]
    Start,
    /// Center the row within the viewport.
    Center,
    /// Align the end of the row with the end of the viewport.
    End,
    /// Move just enough to make the row fully visible, preferring the
    /// smallest change from the current scroll offset.
    Nearest,
}

impl ScrollAlign {
    /// Offset that brings `[item_start, item_end)` into a viewport of length
    /// `viewport` currently scrolled to `current`. The result is unclamped.
    #[must_use]
    pub fn resolve(self, item_start: f64, item_end: f64, current: f64, viewport: f64) -> f64 {
        match self {
            Self::Start => item_start,
            Self::End => (item_end - viewport).max(0.0),
            Self::Center => ((item_start + item_end) / 2.0 - viewport / 2.0).max(0.0),
            Self::Nearest => {
                let viewport_end = current + viewport;
                if item_start >= current && item_end <= viewport_end {
                    current
                } else if item_start < current {
                    item_start
                } else {
                    (item_end - viewport).max(0.0)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Size, Vec2};

    use super::*;

    fn state() -> ScrollState {
        let mut s = ScrollState::new();
        s.set_bounds(Size::new(200.0, 1250.0), Size::new(200.0, 400.0));
        s
    }

    #[test]
    fn set_offset_clamps_to_max() {
        let mut s = state();
        assert!(s.set_offset(Axis::Vertical, 10_000.0));
        assert_eq!(s.offset().y, 850.0);
        assert!(!s.set_offset(Axis::Vertical, 10_000.0));
        assert!(s.set_offset(Axis::Vertical, -5.0));
        assert_eq!(s.offset().y, 0.0);
    }

    #[test]
    fn axis_covered_by_viewport_pins_offset_to_zero() {
        let mut s = state();
        assert!(!s.set_offset(Axis::Horizontal, 30.0));
        assert_eq!(s.offset().x, 0.0);
    }

    #[test]
    fn shrinking_extent_reclamps_offset() {
        let mut s = state();
        s.set_offset(Axis::Vertical, 800.0);
        assert!(s.set_bounds(Size::new(200.0, 600.0), Size::new(200.0, 400.0)));
        assert_eq!(s.offset(), Vec2::new(0.0, 200.0));
        assert!(!s.set_bounds(Size::new(200.0, 600.0), Size::new(200.0, 400.0)));
    }

    struct Owner {
        policy: ScrollBarPolicy,
        vertical: ScrollBarVisibility,
        measure_valid: bool,
    }

    impl ScrollOwner for Owner {
        fn invalidate_scroll_info(&mut self) {}

        fn scroll_bar_policy(&self, _axis: Axis) -> ScrollBarPolicy {
            self.policy
        }

        fn computed_visibility(&self, axis: Axis) -> ScrollBarVisibility {
            match axis {
                Axis::Vertical => self.vertical,
                Axis::Horizontal => ScrollBarVisibility::Collapsed,
            }
        }

        fn is_measure_valid(&self) -> bool {
            self.measure_valid
        }
    }

    #[test]
    fn guard_skips_only_unexplained_scrollbar_flips() {
        let mut guard = VisibilityGuard::new();
        let mut owner = Owner {
            policy: ScrollBarPolicy::Auto,
            vertical: ScrollBarVisibility::Visible,
            measure_valid: false,
        };
        assert!(!guard.should_skip(&owner), "scrollbar appearing is fine");

        owner.vertical = ScrollBarVisibility::Collapsed;
        assert!(guard.should_skip(&owner), "scrollbar vanished mid-measure");
        assert!(!guard.should_skip(&owner), "same state twice is not a flip");

        owner.vertical = ScrollBarVisibility::Visible;
        guard.should_skip(&owner);
        owner.vertical = ScrollBarVisibility::Collapsed;
        owner.measure_valid = true;
        assert!(!guard.should_skip(&owner), "valid measure means the flip was ours");

        owner.policy = ScrollBarPolicy::Visible;
        owner.measure_valid = false;
        owner.vertical = ScrollBarVisibility::Hidden;
        assert!(!guard.should_skip(&owner), "only auto policies oscillate");
    }

    #[test]
    fn wheel_redirect_and_command_shape() {
        let cmd = ScrollCommand::WheelUp.redirect_wheel(ScrollDirection::Horizontal);
        assert_eq!(cmd, ScrollCommand::WheelLeft);
        assert_eq!(cmd.axis(), Axis::Horizontal);
        assert_eq!(cmd.sign(), -1.0);
        assert_eq!(
            ScrollCommand::WheelDown.redirect_wheel(ScrollDirection::Vertical),
            ScrollCommand::WheelDown
        );
        assert_eq!(ScrollCommand::PageRight.step(), ScrollStep::Page);
    }

    #[test]
    fn align_resolution() {
        assert_eq!(ScrollAlign::Start.resolve(150.0, 200.0, 0.0, 100.0), 150.0);
        assert_eq!(ScrollAlign::End.resolve(150.0, 200.0, 0.0, 100.0), 100.0);
        assert_eq!(ScrollAlign::Center.resolve(150.0, 200.0, 0.0, 100.0), 125.0);
        assert_eq!(ScrollAlign::Nearest.resolve(20.0, 70.0, 0.0, 100.0), 0.0);
        assert_eq!(ScrollAlign::Nearest.resolve(150.0, 200.0, 0.0, 100.0), 100.0);
        assert_eq!(ScrollAlign::Nearest.resolve(10.0, 60.0, 40.0, 100.0), 10.0);
    }
}
