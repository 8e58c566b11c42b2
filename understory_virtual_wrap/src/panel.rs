// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The virtualizing wrap panel: scroll authority and layout pass orchestration.

use alloc::boxed::Box;
use alloc::vec::Vec;
use kurbo::{Point, Rect, Size, Vec2};
use smallvec::SmallVec;

use crate::{
    Axis, CacheLength, CacheUnit, ContainerGenerator, ContainerId, ContainerPool, GroupConstraints,
    ItemRange, ItemSource, ItemsChange, LayoutCx, LayoutError, RangeRequest, ScrollAlign,
    ScrollCommand, ScrollOwner, ScrollState, ScrollStep, ScrollUnit, VirtualizationMode,
    VisibilityGuard, WrapConfig, WrapMetrics, compute_item_range,
};

const UNBOUNDED: Size = Size::new(f64::INFINITY, f64::INFINITY);

bitflags::bitflags! {
    /// Work the host must schedule after calling into the panel.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Invalidation: u8 {
        /// Run another measure pass.
        const MEASURE     = 0b0000_0001;
        /// Run another arrange pass.
        const ARRANGE     = 0b0000_0010;
        /// Offset, extent, or viewport changed.
        const SCROLL_INFO = 0b0000_0100;
    }
}

/// Virtualizing wrap layout over an [`ItemSource`].
///
/// The panel owns scroll state and a [`ContainerPool`]. Each measure pass:
///
/// 1. skips itself if the scroll owner reports an unexplained scrollbar flip,
/// 2. resolves the item size and row structure ([`WrapMetrics`]),
/// 3. updates extent/viewport and re-clamps the offset (or adopts the enclosing
///    group's constraints),
/// 4. computes the [`ItemRange`],
/// 5. realizes every index in the range, reusing recycled containers first,
/// 6. virtualizes every container bound outside the range.
///
/// Realization always precedes virtualization, so an index that stays in range
/// keeps its container.
///
/// ## Example
///
/// ```rust
/// use kurbo::{Rect, Size};
/// use understory_virtual_wrap::{
///     CacheLength, CacheUnit, ContainerGenerator, LayoutCx, VirtualWrapPanel, WrapConfig,
/// };
///
/// struct Cells;
///
/// impl ContainerGenerator for Cells {
///     type Item = u32;
///     type Container = Option<u32>;
///
///     fn generate_container(&mut self, _index: usize) -> Option<u32> {
///         None
///     }
///     fn prepare_container(&mut self, c: &mut Option<u32>, _index: usize, item: &u32) {
///         *c = Some(*item);
///     }
///     fn measure_container(&mut self, _c: &mut Option<u32>, _available: Size) -> Size {
///         Size::new(50.0, 50.0)
///     }
///     fn arrange_container(&mut self, _c: &mut Option<u32>, _rect: Rect) {}
/// }
///
/// let items: Vec<u32> = (0..100).collect();
/// let mut cells = Cells;
/// let mut panel = VirtualWrapPanel::new(
///     WrapConfig::new().with_cache(CacheLength::ZERO, CacheUnit::Item),
/// );
///
/// let desired = panel.measure(Size::new(200.0, 400.0), LayoutCx::new(&items, &mut cells));
/// assert_eq!(desired, Size::new(200.0, 400.0));
/// assert_eq!(panel.realized_count(), 32);
/// panel.arrange(Size::new(200.0, 400.0), &mut cells);
/// ```
pub struct VirtualWrapPanel<C> {
    config: WrapConfig,
    scroll: ScrollState,
    pool: ContainerPool<C>,
    metrics: Option<WrapMetrics>,
    range: Option<ItemRange>,
    item_count: usize,
    /// header extent when the last pass ran inside a group
    group_header: Option<f64>,
    /// size the current metrics were laid out in
    layout_size: Size,
    guard: VisibilityGuard,
    scroll_owner: Option<Box<dyn ScrollOwner>>,
    invalidation: Invalidation,
}

impl<C> core::fmt::Debug for VirtualWrapPanel<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualWrapPanel")
            .field("config", &self.config)
            .field("scroll", &self.scroll)
            .field("pool", &self.pool)
            .field("metrics", &self.metrics)
            .field("range", &self.range)
            .field("item_count", &self.item_count)
            .field("group_header", &self.group_header)
            .field("layout_size", &self.layout_size)
            .field("has_scroll_owner", &self.scroll_owner.is_some())
            .field("invalidation", &self.invalidation)
            .finish_non_exhaustive()
    }
}

impl<C> Default for VirtualWrapPanel<C> {
    fn default() -> Self {
        Self::new(WrapConfig::default())
    }
}

impl<C> VirtualWrapPanel<C> {
    /// Creates a panel with `config`.
    #[must_use]
    pub fn new(config: WrapConfig) -> Self {
        Self {
            config,
            scroll: ScrollState::new(),
            pool: ContainerPool::new(),
            metrics: None,
            range: None,
            item_count: 0,
            group_header: None,
            layout_size: Size::ZERO,
            guard: VisibilityGuard::new(),
            scroll_owner: None,
            invalidation: Invalidation::MEASURE,
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &WrapConfig {
        &self.config
    }

    /// Replaces the configuration and invalidates measure.
    ///
    /// Changing the fixed item size or the orientation forgets the measured
    /// sizes of all containers so they are measured again.
    pub fn set_config(&mut self, config: WrapConfig) {
        if config == self.config {
            return;
        }
        if config.item_size != self.config.item_size
            || config.orientation != self.config.orientation
        {
            self.pool.invalidate_measurements();
        }
        self.config = config;
        self.invalidation |= Invalidation::MEASURE;
    }

    /// Attaches (or detaches) the host scroll viewer.
    pub fn set_scroll_owner(&mut self, owner: Option<Box<dyn ScrollOwner>>) {
        self.scroll_owner = owner;
    }

    /// Returns and clears the accumulated invalidation.
    pub fn take_invalidation(&mut self) -> Invalidation {
        core::mem::take(&mut self.invalidation)
    }

    /// Accumulated invalidation, without clearing it.
    #[must_use]
    pub const fn invalidation(&self) -> Invalidation {
        self.invalidation
    }

    /// Current scroll offset.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.scroll.offset()
    }

    /// Extent from the last measure pass.
    #[must_use]
    pub const fn extent(&self) -> Size {
        self.scroll.extent()
    }

    /// Viewport from the last measure pass.
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.scroll.viewport()
    }

    /// Item range from the last measure pass.
    #[must_use]
    pub const fn item_range(&self) -> Option<ItemRange> {
        self.range
    }

    /// Row structure from the last measure pass.
    #[must_use]
    pub const fn metrics(&self) -> Option<&WrapMetrics> {
        self.metrics.as_ref()
    }

    /// Items per row, or `0` before the first measure pass.
    #[must_use]
    pub fn items_per_row(&self) -> usize {
        self.metrics.map_or(0, |m| m.items_per_row())
    }

    /// Item size used by the last measure pass.
    #[must_use]
    pub fn child_size(&self) -> Option<Size> {
        self.metrics.map(|m| m.child_size())
    }

    /// Number of items known to the panel.
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    /// Container pool.
    #[must_use]
    pub const fn pool(&self) -> &ContainerPool<C> {
        &self.pool
    }

    /// Container bound to `index`, if realized.
    #[must_use]
    pub fn container(&self, index: usize) -> Option<&C> {
        self.pool.id_for(index).and_then(|id| self.pool.get(id))
    }

    /// Number of realized containers.
    #[must_use]
    pub fn realized_count(&self) -> usize {
        self.pool.realized_len()
    }

    /// Indices with a realized container, ascending.
    #[must_use]
    pub fn realized_indices(&self) -> Vec<usize> {
        self.pool.realized_indices()
    }

    /// Number of containers waiting in the recycle pool.
    #[must_use]
    pub fn recycled_count(&self) -> usize {
        self.pool.recycled_len()
    }

    // --- scrolling ---------------------------------------------------------

    /// Sets the offset along `axis`, clamped to `[0, extent - viewport]`.
    ///
    /// Notifies the scroll owner and invalidates measure only if the clamped
    /// offset differs from the current one. Returns whether it changed.
    ///
    /// Inside a group the enclosing panel owns scrolling, so the call is
    /// ignored and returns `false`.
    pub fn set_offset(&mut self, axis: Axis, value: f64) -> bool {
        if self.group_header.is_some() || !self.scroll.set_offset(axis, value) {
            return false;
        }
        self.invalidation |= Invalidation::MEASURE;
        self.notify_scroll_info();
        true
    }

    /// Sets the horizontal offset.
    pub fn set_horizontal_offset(&mut self, value: f64) -> bool {
        self.set_offset(Axis::Horizontal, value)
    }

    /// Sets the vertical offset.
    pub fn set_vertical_offset(&mut self, value: f64) -> bool {
        self.set_offset(Axis::Vertical, value)
    }

    /// Applies a line, wheel, or page scroll.
    pub fn scroll(&mut self, command: ScrollCommand) -> bool {
        let command = command.redirect_wheel(self.config.wheel_direction);
        let axis = command.axis();
        let delta = self.scroll_delta(command);
        self.set_offset(axis, axis.of_vec(self.scroll.offset()) + delta)
    }

    /// Scrolls one line up.
    pub fn line_up(&mut self) -> bool {
        self.scroll(ScrollCommand::LineUp)
    }

    /// Scrolls one line down.
    pub fn line_down(&mut self) -> bool {
        self.scroll(ScrollCommand::LineDown)
    }

    /// Scrolls one line left.
    pub fn line_left(&mut self) -> bool {
        self.scroll(ScrollCommand::LineLeft)
    }

    /// Scrolls one line right.
    pub fn line_right(&mut self) -> bool {
        self.scroll(ScrollCommand::LineRight)
    }

    /// Scrolls one wheel notch up (or left, for a horizontal wheel).
    pub fn mouse_wheel_up(&mut self) -> bool {
        self.scroll(ScrollCommand::WheelUp)
    }

    /// Scrolls one wheel notch down (or right, for a horizontal wheel).
    pub fn mouse_wheel_down(&mut self) -> bool {
        self.scroll(ScrollCommand::WheelDown)
    }

    /// Scrolls one wheel notch left.
    pub fn mouse_wheel_left(&mut self) -> bool {
        self.scroll(ScrollCommand::WheelLeft)
    }

    /// Scrolls one wheel notch right.
    pub fn mouse_wheel_right(&mut self) -> bool {
        self.scroll(ScrollCommand::WheelRight)
    }

    /// Scrolls one viewport up.
    pub fn page_up(&mut self) -> bool {
        self.scroll(ScrollCommand::PageUp)
    }

    /// Scrolls one viewport down.
    pub fn page_down(&mut self) -> bool {
        self.scroll(ScrollCommand::PageDown)
    }

    /// Scrolls one viewport left.
    pub fn page_left(&mut self) -> bool {
        self.scroll(ScrollCommand::PageLeft)
    }

    /// Scrolls one viewport right.
    pub fn page_right(&mut self) -> bool {
        self.scroll(ScrollCommand::PageRight)
    }

    fn scroll_delta(&self, command: ScrollCommand) -> f64 {
        let axis = command.axis();
        let viewport = axis.of_size(self.scroll.viewport());
        let child = self
            .config
            .item_size
            .or_else(|| self.child_size())
            .map_or(0.0, |size| axis.of_size(size));
        #[allow(
            clippy::cast_precision_loss,
            reason = "Item deltas are small counts"
        )]
        let magnitude = match (command.step(), self.config.scroll_unit) {
            (ScrollStep::Page, _) => viewport,
            (ScrollStep::Line, ScrollUnit::Pixel) => self.config.line_delta,
            (ScrollStep::Wheel, ScrollUnit::Pixel) => self.config.wheel_delta,
            (ScrollStep::Line, ScrollUnit::Item) => {
                (child * self.config.line_delta_items as f64).min(viewport)
            }
            (ScrollStep::Wheel, ScrollUnit::Item) => {
                (child * self.config.wheel_delta_items as f64).min(viewport)
            }
        };
        command.sign() * magnitude
    }

    /// Scrolls so the row containing `index` starts the viewport.
    ///
    /// # Errors
    ///
    /// [`LayoutError::LayoutNotMeasured`] before the first measure pass and
    /// [`LayoutError::IndexOutOfRange`] if `index` is not a valid item index.
    pub fn bring_index_into_view(&mut self, index: usize) -> Result<(), LayoutError> {
        self.scroll_to_index(index, ScrollAlign::Start)
    }

    /// Scrolls the row containing `index` into view with `align`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::bring_index_into_view`].
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign) -> Result<(), LayoutError> {
        let metrics = self.metrics.ok_or(LayoutError::LayoutNotMeasured)?;
        if index >= self.item_count {
            return Err(LayoutError::IndexOutOfRange {
                index,
                len: self.item_count,
            });
        }
        let axis = self.config.orientation.secondary_axis();
        let start =
            metrics.row_offset(metrics.row_of(index)) + self.group_header.unwrap_or(0.0);
        let end = start + metrics.row_extent();
        let target = align.resolve(
            start,
            end,
            axis.of_vec(self.scroll.offset()),
            axis.of_size(self.scroll.viewport()),
        );
        self.set_offset(axis, target);
        Ok(())
    }

    /// Scrolls the minimum distance to reveal `rect` (in content coordinates)
    /// and returns the part of `rect` inside the viewport afterwards.
    pub fn make_visible(&mut self, rect: Rect) -> Rect {
        let viewport = self.scroll.viewport();
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let (start, len) = match axis {
                Axis::Horizontal => (rect.x0, rect.width()),
                Axis::Vertical => (rect.y0, rect.height()),
            };
            let offset = axis.of_vec(self.scroll.offset());
            let window = axis.of_size(viewport);
            let amount = if start < offset {
                start - offset
            } else if start + len > offset + window {
                (start + len - (offset + window)).min(start - offset)
            } else {
                0.0
            };
            if amount != 0.0 {
                self.set_offset(axis, offset + amount);
            }
        }
        let visible = Rect::from_origin_size(self.scroll.offset().to_point(), viewport);
        rect.intersect(visible)
    }

    /// Returns `true` if the row of `index` lies entirely within the viewport.
    #[must_use]
    pub fn is_index_fully_visible(&self, index: usize) -> bool {
        self.row_span(index).is_some_and(|(start, end, view_start, view_end)| {
            start >= view_start && end <= view_end
        })
    }

    /// Returns `true` if the row of `index` overlaps the viewport at all.
    #[must_use]
    pub fn is_index_partially_visible(&self, index: usize) -> bool {
        self.row_span(index).is_some_and(|(start, end, view_start, view_end)| {
            end > view_start && start < view_end
        })
    }

    /// First index intersecting the viewport, ignoring the cache zone.
    #[must_use]
    pub fn first_visible_index(&self) -> Option<usize> {
        self.visible_range().map(|r| r.first)
    }

    /// Last index intersecting the viewport, ignoring the cache zone.
    #[must_use]
    pub fn last_visible_index(&self) -> Option<usize> {
        self.visible_range().map(|r| r.last)
    }

    fn visible_range(&self) -> Option<ItemRange> {
        let metrics = self.metrics.as_ref()?;
        let o = self.config.orientation;
        let request = RangeRequest {
            offset: o.secondary_of(self.scroll.offset()),
            viewport: o.secondary(self.scroll.viewport()),
            cache_length: CacheLength::ZERO,
            cache_unit: CacheUnit::Pixel,
            group_header: self.group_header,
        };
        compute_item_range(metrics, &request)
    }

    fn row_span(&self, index: usize) -> Option<(f64, f64, f64, f64)> {
        let metrics = self.metrics.as_ref()?;
        if index >= metrics.item_count() {
            return None;
        }
        let o = self.config.orientation;
        let start = metrics.row_offset(metrics.row_of(index)) + self.group_header.unwrap_or(0.0);
        let view_start = o.secondary_of(self.scroll.offset());
        Some((
            start,
            start + metrics.row_extent(),
            view_start,
            view_start + o.secondary(self.scroll.viewport()),
        ))
    }

    fn notify_scroll_info(&mut self) {
        self.invalidation |= Invalidation::SCROLL_INFO;
        if let Some(owner) = self.scroll_owner.as_deref_mut() {
            owner.invalidate_scroll_info();
        }
    }

    // --- layout passes -----------------------------------------------------

    /// Runs a measure pass within `available` and returns the desired size.
    pub fn measure<S, G>(&mut self, available: Size, cx: LayoutCx<'_, S, G>) -> Size
    where
        S: ItemSource + ?Sized,
        G: ContainerGenerator<Item = S::Item, Container = C> + ?Sized,
    {
        let LayoutCx {
            items,
            generator,
            group,
        } = cx;
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "wrap_measure",
            width = available.width,
            height = available.height,
            items = items.len(),
            grouped = group.is_some(),
        )
        .entered();

        if let Some(owner) = self.scroll_owner.as_deref()
            && self.guard.should_skip(owner)
        {
            #[cfg(feature = "tracing")]
            tracing::debug!("scrollbar visibility flipped outside of measure; skipping pass");
            return available;
        }

        if self.config.virtualization_mode == VirtualizationMode::Standard {
            self.drain_recycled(generator);
        }

        let o = self.config.orientation;
        let spacing = self.config.spacing_mode;
        self.item_count = items.len();

        let (desired, cache_length, cache_unit) = if let Some(group) = group {
            let viewport = group.viewport();
            let header = o.secondary(group.header_size()).max(0.0);
            let area = o.size(
                o.primary(viewport.size()),
                (o.secondary(viewport.size()) - header).max(0.0),
            );
            let child = self.resolve_child_size(items, generator);
            let metrics = WrapMetrics::new(o, self.item_count, child, area);
            let extent = metrics.extent(area, spacing);
            self.metrics = Some(metrics);
            self.group_header = Some(header);
            self.layout_size = area;
            self.scroll
                .adopt(viewport.origin().to_vec2(), extent, viewport.size());
            let (cache_length, cache_unit) = group.cache();
            (extent, cache_length, cache_unit)
        } else {
            let child = self.resolve_child_size(items, generator);
            let metrics = WrapMetrics::new(o, self.item_count, child, available);
            let extent = metrics.extent(available, spacing);
            let desired = Size::new(
                available.width.min(extent.width),
                available.height.min(extent.height),
            );
            self.metrics = Some(metrics);
            self.group_header = None;
            self.layout_size = available;
            if self.scroll.set_bounds(extent, desired) {
                self.notify_scroll_info();
            }
            (desired, self.config.cache_length, self.config.cache_unit)
        };

        let request = RangeRequest {
            offset: o.secondary_of(self.scroll.offset()),
            viewport: o.secondary(self.scroll.viewport()),
            cache_length,
            cache_unit,
            group_header: self.group_header,
        };
        self.range = self
            .metrics
            .as_ref()
            .and_then(|m| compute_item_range(m, &request));

        self.realize_range(items, generator);
        self.virtualize_outside_range(generator);

        self.invalidation.remove(Invalidation::MEASURE);
        self.invalidation |= Invalidation::ARRANGE;
        desired
    }

    /// Runs an arrange pass and returns `final_size`.
    pub fn arrange<G>(&mut self, final_size: Size, generator: &mut G) -> Size
    where
        G: ContainerGenerator<Container = C> + ?Sized,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "wrap_arrange",
            width = final_size.width,
            height = final_size.height,
            realized = self.pool.realized_len(),
        )
        .entered();

        self.invalidation.remove(Invalidation::ARRANGE);
        let Some(metrics) = self.metrics else {
            return final_size;
        };
        let o = self.config.orientation;
        let mut offset = self.scroll.offset();
        if self.group_header.is_some() {
            // The enclosing panel scrolls the group along the row axis.
            offset = o.secondary_axis().with_vec(offset, 0.0);
        }
        let layout = metrics.row_layout(
            final_size,
            self.config.spacing_mode,
            self.config.stretch_items,
            generator.container_max_size(),
        );
        let collapsed = o.secondary(final_size) <= 0.0;

        let realized: SmallVec<[(usize, ContainerId); 64]> = self.pool.realized().collect();
        for (index, id) in realized {
            let rect = if collapsed {
                Rect::ZERO
            } else {
                metrics.item_rect(index, &layout, offset)
            };
            if let Some(container) = self.pool.get_mut(id) {
                generator.arrange_container(container, rect);
            }
        }
        final_size
    }

    /// Applies an incremental change of the item source.
    ///
    /// Containers of removed, replaced, or moved items are virtualized; the
    /// bindings of all other containers are shifted to their new indices.
    pub fn on_items_changed<G>(&mut self, change: ItemsChange, generator: &mut G)
    where
        G: ContainerGenerator<Container = C> + ?Sized,
    {
        match change {
            ItemsChange::Insert { index, count } => {
                self.pool
                    .remap(|i| if i >= index { i + count } else { i });
                self.item_count = self.item_count.saturating_add(count);
                self.refresh_metrics();
            }
            ItemsChange::Remove { index, count } => {
                self.virtualize_where(generator, |i| i >= index && i - index < count);
                self.pool
                    .remap(|i| if i >= index { i - count } else { i });
                self.item_count = self.item_count.saturating_sub(count);
                self.refresh_metrics();
            }
            ItemsChange::Replace { index, count } => {
                self.virtualize_where(generator, |i| i >= index && i - index < count);
            }
            ItemsChange::Move { from, to, count } => {
                self.virtualize_where(generator, |i| i >= from && i - from < count);
                self.pool.remap(|i| {
                    let removed = if i >= from { i - count } else { i };
                    if removed >= to { removed + count } else { removed }
                });
            }
            ItemsChange::Reset => {
                self.virtualize_where(generator, |_| true);
                self.metrics = None;
                self.range = None;
            }
        }
        self.invalidation |= Invalidation::MEASURE;
    }

    /// Re-derives rows, extent, and scroll bounds for a new item count from the
    /// last pass's item size and layout size, so index-targeted scrolling and
    /// visibility queries are correct before the next measure pass.
    fn refresh_metrics(&mut self) {
        let Some(previous) = self.metrics else {
            return;
        };
        let o = self.config.orientation;
        let count = self.item_count;
        let metrics = WrapMetrics::new(o, count, previous.child_size(), self.layout_size);
        let extent = metrics.extent(self.layout_size, self.config.spacing_mode);
        self.metrics = Some(metrics);
        self.range = self
            .range
            .filter(|r| r.first < count)
            .map(|r| ItemRange::new(r.first, r.last.min(count - 1)));
        if self.group_header.is_some() {
            self.scroll
                .adopt(self.scroll.offset(), extent, self.scroll.viewport());
            return;
        }
        let viewport = Size::new(
            self.layout_size.width.min(extent.width),
            self.layout_size.height.min(extent.height),
        );
        if self.scroll.set_bounds(extent, viewport) {
            self.notify_scroll_info();
        }
    }

    /// Item size: the configured one, else the first realized container's
    /// measurement, else the measurement of one speculatively realized item.
    fn resolve_child_size<S, G>(&mut self, items: &S, generator: &mut G) -> Size
    where
        S: ItemSource + ?Sized,
        G: ContainerGenerator<Item = S::Item, Container = C> + ?Sized,
    {
        if let Some(size) = self.config.item_size {
            return size;
        }
        let measured = self
            .pool
            .realized()
            .filter_map(|(index, id)| self.pool.desired_size(id).map(|size| (index, size)))
            .min_by_key(|(index, _)| *index);
        if let Some((_, size)) = measured {
            return size;
        }
        if items.is_empty() {
            return Size::ZERO;
        }
        let index = self
            .range
            .map_or(0, |r| r.first)
            .min(items.len() - 1);
        self.realize(index, items, generator)
            .and_then(|id| self.pool.desired_size(id))
            .unwrap_or(Size::ZERO)
    }

    fn realize_range<S, G>(&mut self, items: &S, generator: &mut G)
    where
        S: ItemSource + ?Sized,
        G: ContainerGenerator<Item = S::Item, Container = C> + ?Sized,
    {
        let Some(range) = self.range else {
            return;
        };
        for index in range.indices() {
            self.realize(index, items, generator);
        }
    }

    /// Realizes `index` (if needed) and measures it (if unmeasured).
    fn realize<S, G>(&mut self, index: usize, items: &S, generator: &mut G) -> Option<ContainerId>
    where
        S: ItemSource + ?Sized,
        G: ContainerGenerator<Item = S::Item, Container = C> + ?Sized,
    {
        let id = match self.pool.id_for(index) {
            Some(id) => id,
            None => {
                let item = items.item_at(index)?;
                let recycled = match self.config.virtualization_mode {
                    VirtualizationMode::Recycling => self.pool.pop_recycled(),
                    VirtualizationMode::Standard => None,
                };
                let id = if let Some(id) = recycled {
                    self.pool.bind(id, index);
                    id
                } else {
                    let container = generator.generate_container(index);
                    self.pool.insert(container, index)
                };
                #[cfg(feature = "tracing")]
                tracing::trace!(index, ?id, reused = recycled.is_some(), "realized container");
                let container = self.pool.get_mut(id)?;
                generator.prepare_container(container, index, item);
                id
            }
        };
        if self.pool.desired_size(id).is_none() {
            self.measure_container(id, generator);
        }
        Some(id)
    }

    fn measure_container<G>(&mut self, id: ContainerId, generator: &mut G)
    where
        G: ContainerGenerator<Container = C> + ?Sized,
    {
        let available = self.config.item_size.unwrap_or(UNBOUNDED);
        let viewport = self.scroll.viewport();
        let Some(container) = self.pool.get_mut(id) else {
            return;
        };
        let mut desired = generator.measure_container(container, available);
        let nested = GroupConstraints {
            viewport: Rect::from_origin_size(Point::ORIGIN, viewport),
            cache_length: CacheLength::ZERO,
            cache_unit: CacheUnit::Item,
            header_size: Size::ZERO,
        };
        let is_group = generator.apply_group_constraints(container, &nested);
        if is_group {
            desired = generator.measure_container(container, viewport);
        }
        self.pool.set_group(id, is_group);
        self.pool.set_desired_size(id, desired);
    }

    fn virtualize_outside_range<G>(&mut self, generator: &mut G)
    where
        G: ContainerGenerator<Container = C> + ?Sized,
    {
        let range = self.range;
        self.virtualize_where(generator, |i| !range.is_some_and(|r| r.contains(i)));
    }

    fn virtualize_where<G>(&mut self, generator: &mut G, mut pred: impl FnMut(usize) -> bool)
    where
        G: ContainerGenerator<Container = C> + ?Sized,
    {
        let doomed: SmallVec<[ContainerId; 32]> = self
            .pool
            .realized()
            .filter(|(index, _)| pred(*index))
            .map(|(_, id)| id)
            .collect();
        for id in doomed {
            self.virtualize(id, generator);
        }
    }

    fn virtualize<G>(&mut self, id: ContainerId, generator: &mut G)
    where
        G: ContainerGenerator<Container = C> + ?Sized,
    {
        #[cfg(feature = "tracing")]
        tracing::trace!(index = ?self.pool.bound_index(id), ?id, "virtualized container");
        match self.config.virtualization_mode {
            VirtualizationMode::Recycling => {
                if let Some(container) = self.pool.recycle(id) {
                    generator.recycle_container(container);
                }
            }
            VirtualizationMode::Standard => {
                if let Some(container) = self.pool.discard(id) {
                    generator.discard_container(container);
                }
            }
        }
    }

    fn drain_recycled<G>(&mut self, generator: &mut G)
    where
        G: ContainerGenerator<Container = C> + ?Sized,
    {
        while let Some(id) = self.pool.pop_recycled() {
            if let Some(container) = self.pool.discard(id) {
                generator.discard_container(container);
            }
        }
    }
}
