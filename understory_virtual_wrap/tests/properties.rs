// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for range computation, offset clamping, and realization.
//!
//! 1. Computed ranges stay within `0..item_count` and cover whole rows.
//! 2. Computed ranges cover every item intersecting the viewport.
//! 3. Offsets never leave `[0, extent - viewport]`.
//! 4. Setting the same offset twice notifies only once.
//! 5. After a measure pass exactly the range is realized, whatever the
//!    scroll history was.
//! 6. An index brought into view is realized by the next measure pass.
//! 7. Spacing modes distribute exactly the unused row space.

use kurbo::{Rect, Size};
use proptest::prelude::*;
use understory_virtual_wrap::{
    Axis, CacheLength, CacheUnit, ContainerGenerator, Invalidation, LayoutCx, Orientation,
    RangeRequest, ScrollState, SpacingMode, VirtualWrapPanel, WrapConfig, WrapMetrics,
    compute_item_range,
};

struct Fixed(Size);

impl ContainerGenerator for Fixed {
    type Item = u16;
    type Container = Option<usize>;

    fn generate_container(&mut self, _index: usize) -> Option<usize> {
        None
    }

    fn prepare_container(&mut self, container: &mut Option<usize>, index: usize, _item: &u16) {
        *container = Some(index);
    }

    fn measure_container(&mut self, _container: &mut Option<usize>, _available: Size) -> Size {
        self.0
    }

    fn arrange_container(&mut self, _container: &mut Option<usize>, _rect: Rect) {}
}

fn unit_strategy() -> impl Strategy<Value = CacheUnit> {
    prop_oneof![
        Just(CacheUnit::Pixel),
        Just(CacheUnit::Item),
        Just(CacheUnit::Page)
    ]
}

fn orientation_strategy() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::Vertical), Just(Orientation::Horizontal)]
}

proptest! {
    #[test]
    fn ranges_are_bounded_and_row_aligned(
        count in 1_usize..5_000,
        child in (1.0_f64..120.0, 1.0_f64..120.0),
        available in (10.0_f64..2_000.0, 10.0_f64..2_000.0),
        offset in 0.0_f64..100_000.0,
        cache in (0.0_f64..10.0, 0.0_f64..10.0),
        unit in unit_strategy(),
        orientation in orientation_strategy(),
    ) {
        let child = Size::new(child.0, child.1);
        let available = Size::new(available.0, available.1);
        let metrics = WrapMetrics::new(orientation, count, child, available);
        let request = RangeRequest::flat(
            offset,
            orientation.secondary(available),
            CacheLength::new(cache.0, cache.1),
            unit,
        );
        let per_row = metrics.items_per_row();

        if let Some(range) = compute_item_range(&metrics, &request) {
            prop_assert!(range.first <= range.last);
            prop_assert!(range.last < count, "{range:?} exceeds {count} items");
            prop_assert_eq!(range.first % per_row, 0);
            prop_assert!(range.last == count - 1 || (range.last + 1) % per_row == 0);
        } else {
            prop_assert!(offset >= metrics.content_secondary(), "nothing realized at {offset}");
        }
    }

    #[test]
    fn ranges_cover_the_viewport(
        count in 1_usize..2_000,
        side in 10.0_f64..80.0,
        width in 100.0_f64..800.0,
        viewport in 50.0_f64..800.0,
        offset_fraction in 0.0_f64..1.0,
        unit in unit_strategy(),
    ) {
        let child = Size::new(side, side);
        let metrics = WrapMetrics::new(Orientation::Vertical, count, child, Size::new(width, viewport));
        let max_offset = (metrics.content_secondary() - viewport).max(0.0);
        let offset = max_offset * offset_fraction;
        let request = RangeRequest::flat(offset, viewport, CacheLength::uniform(1.0), unit);
        let range = compute_item_range(&metrics, &request);
        prop_assert!(range.is_some());
        let range = range.unwrap();

        for index in 0..count {
            let top = metrics.row_offset(metrics.row_of(index));
            let bottom = top + metrics.row_extent();
            if bottom > offset && top < offset + viewport {
                prop_assert!(range.contains(index), "visible {index} outside {range:?}");
            }
        }
    }

    #[test]
    fn offsets_stay_clamped(
        extent in (0.0_f64..5_000.0, 0.0_f64..5_000.0),
        viewport in (0.0_f64..2_000.0, 0.0_f64..2_000.0),
        requests in prop::collection::vec((any::<bool>(), -10_000.0_f64..10_000.0), 1..20),
    ) {
        let mut state = ScrollState::new();
        state.set_bounds(Size::new(extent.0, extent.1), Size::new(viewport.0, viewport.1));
        for (horizontal, value) in requests {
            let axis = if horizontal { Axis::Horizontal } else { Axis::Vertical };
            state.set_offset(axis, value);
            let current = axis.of_vec(state.offset());
            prop_assert!(current >= 0.0);
            prop_assert!(current <= state.max_offset(axis));
        }
    }

    #[test]
    fn measure_realizes_exactly_the_range(
        count in 0_u16..600,
        offsets in prop::collection::vec(0.0_f64..20_000.0, 1..8),
        cache in 0.0_f64..3.0,
        unit in unit_strategy(),
        spacing in prop_oneof![Just(SpacingMode::None), Just(SpacingMode::Uniform)],
    ) {
        let items: Vec<u16> = (0..count).collect();
        let mut generator = Fixed(Size::new(40.0, 30.0));
        let mut panel = VirtualWrapPanel::new(
            WrapConfig::new()
                .with_spacing_mode(spacing)
                .with_cache(CacheLength::uniform(cache), unit),
        );
        let viewport = Size::new(330.0, 240.0);
        panel.measure(viewport, LayoutCx::new(&items, &mut generator));

        for offset in offsets {
            panel.set_vertical_offset(offset);
            panel.measure(viewport, LayoutCx::new(&items, &mut generator));

            let expected: Vec<usize> = panel
                .item_range()
                .map(|r| r.indices().collect())
                .unwrap_or_default();
            prop_assert_eq!(panel.realized_indices(), expected);
            for index in panel.realized_indices() {
                prop_assert_eq!(panel.container(index).copied().flatten(), Some(index));
            }
            prop_assert!(panel.offset().y <= (panel.extent().height - panel.viewport().height).max(0.0));
        }
    }

    #[test]
    fn set_offset_is_idempotent(count in 1_u16..2_000, value in -1_000.0_f64..50_000.0) {
        let items: Vec<u16> = (0..count).collect();
        let mut generator = Fixed(Size::new(40.0, 30.0));
        let mut panel = VirtualWrapPanel::new(WrapConfig::new());
        panel.measure(Size::new(330.0, 240.0), LayoutCx::new(&items, &mut generator));
        panel.take_invalidation();

        panel.set_vertical_offset(value);
        let first = panel.offset();
        panel.take_invalidation();

        prop_assert!(!panel.set_vertical_offset(value));
        prop_assert_eq!(panel.offset(), first);
        prop_assert_eq!(panel.take_invalidation(), Invalidation::empty());
    }

    #[test]
    fn brought_into_view_index_is_realized(
        count in 1_u16..3_000,
        pick in 0.0_f64..1.0,
        unit in unit_strategy(),
    ) {
        let items: Vec<u16> = (0..count).collect();
        let mut generator = Fixed(Size::new(40.0, 30.0));
        let mut panel = VirtualWrapPanel::new(
            WrapConfig::new().with_cache(CacheLength::ZERO, unit),
        );
        let viewport = Size::new(330.0, 240.0);
        panel.measure(viewport, LayoutCx::new(&items, &mut generator));

        #[allow(clippy::cast_possible_truncation, reason = "pick is in [0, 1)")]
        let index = ((f64::from(count) * pick) as usize).min(usize::from(count) - 1);
        panel.bring_index_into_view(index).unwrap();
        panel.measure(viewport, LayoutCx::new(&items, &mut generator));

        prop_assert!(panel.item_range().is_some_and(|r| r.contains(index)));
        prop_assert!(panel.container(index).is_some());
        prop_assert!(panel.is_index_partially_visible(index));
    }

    #[test]
    fn spacing_distributes_unused_space(
        count in 1_usize..500,
        child in 5.0_f64..100.0,
        width in 100.0_f64..1_000.0,
    ) {
        let metrics = WrapMetrics::new(
            Orientation::Vertical,
            count,
            Size::new(child, child),
            Size::new(width, 500.0),
        );
        let k = metrics.items_per_row();
        #[allow(clippy::cast_precision_loss, reason = "small counts")]
        let kf = k as f64;
        let final_size = Size::new(width, 500.0);
        let unused = width - child * kf;
        let unbounded = Size::new(f64::INFINITY, f64::INFINITY);

        let uniform = metrics.row_layout(final_size, SpacingMode::Uniform, false, unbounded);
        prop_assert!((uniform.inner_spacing - unused / (kf + 1.0)).abs() < 1e-9);
        prop_assert!((uniform.outer_spacing - uniform.inner_spacing).abs() < 1e-9);

        let between = metrics.row_layout(final_size, SpacingMode::BetweenItemsOnly, false, unbounded);
        prop_assert_eq!(between.outer_spacing, 0.0);
        if k > 1 {
            let used = child * kf + between.inner_spacing * (kf - 1.0);
            prop_assert!((used - width).abs() < 1e-6, "{used} != {width}");
        }

        let edges = metrics.row_layout(final_size, SpacingMode::StartAndEndOnly, false, unbounded);
        prop_assert_eq!(edges.inner_spacing, 0.0);
        prop_assert!((edges.outer_spacing * 2.0 - unused).abs() < 1e-9);

        let none = metrics.row_layout(final_size, SpacingMode::None, false, unbounded);
        prop_assert_eq!((none.inner_spacing, none.outer_spacing), (0.0, 0.0));
    }
}
