// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Seams to the host UI framework.
//!
//! The panel never owns items or knows how containers are drawn. Hosts plug in:
//!
//! - an [`ItemSource`] over the backing collection,
//! - a [`ContainerGenerator`] that creates, binds, measures, arranges, recycles,
//!   and discards visual containers,
//! - optionally a [`GroupConstraintsProvider`] when the panel lays out the
//!   items of one group inside a grouped hierarchy,
//! - optionally a [`ScrollOwner`](crate::ScrollOwner) attached to the panel.

use alloc::vec::Vec;
use kurbo::{Rect, Size};

use crate::{CacheLength, CacheUnit};

/// Ordered collection backing the panel. Indices are `0..len()`.
pub trait ItemSource {
    /// Item type.
    type Item: ?Sized;

    /// Number of items.
    fn len(&self) -> usize;

    /// Returns `true` if there are no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item at `index`, or `None` if out of bounds.
    fn item_at(&self, index: usize) -> Option<&Self::Item>;
}

impl<T> ItemSource for [T] {
    type Item = T;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn item_at(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

impl<T> ItemSource for Vec<T> {
    type Item = T;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn item_at(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

/// Creates and drives the visual containers for one kind of item.
///
/// The panel is the only caller, and only from inside its own passes. Reuse of
/// recycled containers is handled by the panel's pool: `generate_container`
/// is only called when no recycled container is available.
pub trait ContainerGenerator {
    /// Item type the containers are bound to.
    type Item: ?Sized;
    /// Visual container type.
    type Container;

    /// Creates a new container for `index`.
    fn generate_container(&mut self, index: usize) -> Self::Container;

    /// Binds `container` to `item` at `index`.
    fn prepare_container(
        &mut self,
        container: &mut Self::Container,
        index: usize,
        item: &Self::Item,
    );

    /// Measures `container` within `available` and returns its desired size.
    fn measure_container(&mut self, container: &mut Self::Container, available: Size) -> Size;

    /// Places `container` at `rect` in panel coordinates.
    fn arrange_container(&mut self, container: &mut Self::Container, rect: Rect);

    /// Clears the item binding of a container moving to the recycle pool.
    fn recycle_container(&mut self, container: &mut Self::Container) {
        let _ = container;
    }

    /// Destroys a container that will not be reused.
    fn discard_container(&mut self, container: Self::Container) {
        drop(container);
    }

    /// Hands group constraints to a container that hosts a nested group.
    /// Returns `false` for ordinary item containers.
    fn apply_group_constraints(
        &mut self,
        container: &mut Self::Container,
        constraints: &GroupConstraints,
    ) -> bool {
        let _ = (container, constraints);
        false
    }

    /// Maximum size of an item container, bounding stretched items.
    fn container_max_size(&self) -> Size {
        Size::new(f64::INFINITY, f64::INFINITY)
    }
}

/// Viewport and cache constraints an enclosing group imposes on its items panel.
pub trait GroupConstraintsProvider {
    /// Visible window in the group's coordinate space, header included.
    fn viewport(&self) -> Rect;

    /// Cache length and unit requested by the group.
    fn cache(&self) -> (CacheLength, CacheUnit);

    /// Desired size of the group header.
    fn header_size(&self) -> Size;
}

/// Plain-data [`GroupConstraintsProvider`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupConstraints {
    /// Visible window in the group's coordinate space.
    pub viewport: Rect,
    /// Cache length.
    pub cache_length: CacheLength,
    /// Unit of [`GroupConstraints::cache_length`].
    pub cache_unit: CacheUnit,
    /// Desired size of the group header.
    pub header_size: Size,
}

impl GroupConstraintsProvider for GroupConstraints {
    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn cache(&self) -> (CacheLength, CacheUnit) {
        (self.cache_length, self.cache_unit)
    }

    fn header_size(&self) -> Size {
        self.header_size
    }
}

/// Incremental change to the [`ItemSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemsChange {
    /// `count` items were inserted at `index`.
    Insert {
        /// First inserted index.
        index: usize,
        /// Number of inserted items.
        count: usize,
    },
    /// `count` items starting at `index` were removed.
    Remove {
        /// First removed index.
        index: usize,
        /// Number of removed items.
        count: usize,
    },
    /// `count` items starting at `index` were replaced in place.
    Replace {
        /// First replaced index.
        index: usize,
        /// Number of replaced items.
        count: usize,
    },
    /// `count` items moved from `from` to `to` (`to` is measured after removal).
    Move {
        /// Original first index.
        from: usize,
        /// New first index.
        to: usize,
        /// Number of moved items.
        count: usize,
    },
    /// The collection changed wholesale.
    Reset,
}

/// Collaborators borrowed for one measure pass.
pub struct LayoutCx<'a, S: ?Sized, G: ?Sized> {
    /// Backing items.
    pub items: &'a S,
    /// Container generator.
    pub generator: &'a mut G,
    /// Constraints of the enclosing group, if any.
    pub group: Option<&'a dyn GroupConstraintsProvider>,
}

impl<'a, S: ?Sized, G: ?Sized> LayoutCx<'a, S, G> {
    /// Creates a context for a flat (non-grouped) pass.
    pub fn new(items: &'a S, generator: &'a mut G) -> Self {
        Self {
            items,
            generator,
            group: None,
        }
    }

    /// Lays out the items of a group under `group`'s constraints.
    #[must_use]
    pub fn with_group(mut self, group: &'a dyn GroupConstraintsProvider) -> Self {
        self.group = Some(group);
        self
    }
}

impl<S: ?Sized, G: ?Sized> core::fmt::Debug for LayoutCx<'_, S, G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutCx")
            .field("grouped", &self.group.is_some())
            .finish_non_exhaustive()
    }
}
