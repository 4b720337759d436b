#![forbid(unsafe_code)]

//! Property tests for tooltip placement.

use ftour_core::geometry::Rect;
use ftour_overlay::{Coord, Placement, TooltipPosition, compute_tooltip_position};
use proptest::prelude::*;

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (
        -2000.0f64..2000.0,
        -2000.0f64..2000.0,
        0.0f64..1500.0,
        0.0f64..1500.0,
    )
        .prop_map(|(left, top, width, height)| Rect::new(left, top, width, height))
}

fn placement_strategy() -> impl Strategy<Value = Placement> {
    prop_oneof![
        Just(Placement::Top),
        Just(Placement::Bottom),
        Just(Placement::Left),
        Just(Placement::Right),
        Just(Placement::Center),
    ]
}

fn px(coord: Coord) -> f64 {
    match coord {
        Coord::Px(v) => v,
        Coord::Percent(_) => panic!("expected px, got {coord:?}"),
    }
}

proptest! {
    #[test]
    fn no_rect_is_always_centered(placement in placement_strategy(), offset in 0.0f64..200.0) {
        prop_assert_eq!(compute_tooltip_position(None, placement, offset), TooltipPosition::CENTERED);
    }

    #[test]
    fn anchor_sits_offset_from_requested_edge(
        rect in rect_strategy(),
        placement in placement_strategy(),
        offset in 0.0f64..200.0,
    ) {
        let pos = compute_tooltip_position(Some(rect), placement, offset);
        prop_assert_eq!(pos.placement, placement);
        let (x, y) = (px(pos.left), px(pos.top));
        let eps = 1e-9;
        match placement {
            Placement::Bottom => prop_assert!((y - (rect.bottom() + offset)).abs() < eps),
            Placement::Top => prop_assert!((y - (rect.top - offset)).abs() < eps),
            Placement::Left => prop_assert!((x - (rect.left - offset)).abs() < eps),
            Placement::Right => prop_assert!((x - (rect.right() + offset)).abs() < eps),
            Placement::Center => {
                prop_assert!((x - rect.center_x()).abs() < eps);
                prop_assert!((y - rect.center_y()).abs() < eps);
            }
        }
    }

    #[test]
    fn cross_axis_is_centered(rect in rect_strategy(), offset in 0.0f64..200.0) {
        for placement in [Placement::Top, Placement::Bottom] {
            let pos = compute_tooltip_position(Some(rect), placement, offset);
            prop_assert!((px(pos.left) - rect.center_x()).abs() < 1e-9);
            prop_assert_eq!(pos.transform.x, -50.0);
        }
        for placement in [Placement::Left, Placement::Right] {
            let pos = compute_tooltip_position(Some(rect), placement, offset);
            prop_assert!((px(pos.top) - rect.center_y()).abs() < 1e-9);
            prop_assert_eq!(pos.transform.y, -50.0);
        }
    }
}
