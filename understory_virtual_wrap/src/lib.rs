// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Virtual Wrap: a virtualizing wrap panel core.
//!
//! This crate lays out a large, uniformly sized item collection in rows that
//! wrap along one axis and stack along the other, and realizes visual
//! containers only for the items near the viewport.
//!
//! The core concepts are:
//!
//! - [`Orientation`]: which axis items flow along within a row (the *primary*
//!   axis) and which axis rows stack along (the *secondary*, scrolling axis).
//! - [`WrapMetrics`]: item size, items per row, and row count for one pass,
//!   plus the [`RowLayout`] the arrange pass derives from them.
//! - [`compute_item_range`]: the inclusive [`ItemRange`] of indices intersecting
//!   the viewport extended by a cache zone measured in [`CacheUnit`]s.
//! - [`ContainerPool`]: a generational arena of containers that are either
//!   bound to an item index or parked for recycling.
//! - [`VirtualWrapPanel`]: the controller that owns scroll state
//!   ([`ScrollState`]) and a pool, and runs measure and arrange passes against
//!   a host [`ItemSource`] and [`ContainerGenerator`].
//!
//! This crate deliberately does **not** know about widgets or any particular UI
//! framework. Host frameworks are responsible for:
//!
//! - Owning the items and implementing [`ContainerGenerator`] for their views.
//! - Calling [`VirtualWrapPanel::measure`] and [`VirtualWrapPanel::arrange`]
//!   when [`VirtualWrapPanel::take_invalidation`] asks for it.
//! - Optionally attaching a [`ScrollOwner`] to be told about scroll changes.
//! - Optionally passing [`GroupConstraints`] when the panel lays out the items
//!   of one group inside a grouped list.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use understory_virtual_wrap::{
//!     CacheLength, CacheUnit, ContainerGenerator, LayoutCx, VirtualWrapPanel, WrapConfig,
//! };
//!
//! #[derive(Default)]
//! struct Tiles {
//!     placed: Vec<(usize, Rect)>,
//! }
//!
//! impl ContainerGenerator for Tiles {
//!     type Item = &'static str;
//!     type Container = usize;
//!
//!     fn generate_container(&mut self, index: usize) -> usize {
//!         index
//!     }
//!     fn prepare_container(&mut self, c: &mut usize, index: usize, _item: &&'static str) {
//!         *c = index;
//!     }
//!     fn measure_container(&mut self, _c: &mut usize, _available: Size) -> Size {
//!         Size::new(100.0, 40.0)
//!     }
//!     fn arrange_container(&mut self, c: &mut usize, rect: Rect) {
//!         self.placed.push((*c, rect));
//!     }
//! }
//!
//! let items = vec!["tile"; 1_000];
//! let mut tiles = Tiles::default();
//! let mut panel = VirtualWrapPanel::new(
//!     WrapConfig::new().with_cache(CacheLength::uniform(1.0), CacheUnit::Page),
//! );
//!
//! let viewport = Size::new(300.0, 200.0);
//! panel.measure(viewport, LayoutCx::new(&items, &mut tiles));
//! panel.arrange(viewport, &mut tiles);
//! assert_eq!(panel.items_per_row(), 3);
//!
//! panel.page_down();
//! panel.measure(viewport, LayoutCx::new(&items, &mut tiles));
//! assert_eq!(panel.offset().y, 200.0);
//! assert!(panel.item_range().unwrap().contains(15));
//! ```
//!
//! This crate is `no_std` and uses `alloc`. Enable the `tracing` feature to get
//! `wrap_measure` and `wrap_arrange` spans plus container lifecycle events.

#![no_std]

extern crate alloc;

mod axis;
mod config;
mod error;
mod host;
mod panel;
mod pool;
mod range;
mod scroll;
mod util;
mod wrap;

pub use axis::{Axis, Orientation};
pub use config::{
    MOUSE_WHEEL_DELTA, MOUSE_WHEEL_DELTA_ITEMS, SCROLL_LINE_DELTA, SCROLL_LINE_DELTA_ITEMS,
    ScrollDirection, ScrollUnit, SpacingMode, VirtualizationMode, WrapConfig,
};
pub use error::LayoutError;
pub use host::{
    ContainerGenerator, GroupConstraints, GroupConstraintsProvider, ItemSource, ItemsChange,
    LayoutCx,
};
pub use panel::{Invalidation, VirtualWrapPanel};
pub use pool::{ContainerFlags, ContainerId, ContainerPool};
pub use range::{CacheLength, CacheUnit, ItemRange, RangeRequest, compute_item_range};
pub use scroll::{
    ScrollAlign, ScrollBarPolicy, ScrollBarVisibility, ScrollCommand, ScrollOwner, ScrollState,
    ScrollStep, VisibilityGuard,
};
pub use wrap::{RowLayout, WrapMetrics};
