//! Property tests for the tracking geometry and the smoothing filter

use proptest::prelude::*;

use lamco_gaze_cursor::cursor::{
    compute_gain, speed_multiplier, AdaptiveSmoothingFilter, SmoothingConfig, MAX_SPEED_FACTOR,
    MIN_SPEED_FACTOR,
};
use lamco_gaze_cursor::geometry::{Point, Size};
use lamco_gaze_cursor::tracking::{
    gap_for_level, level_for_gap, level_for_padding, padding_for_level, TrackingRegion,
    MAX_INNER_LEVEL, MAX_OUTER_LEVEL, MIN_INNER_LEVEL, MIN_OUTER_LEVEL, PAD_AT_LEVEL_1,
    PAD_AT_MAX_LEVEL,
};

const SCREEN: Size = Size::new(1920, 1080);

#[test]
fn test_level_pixel_round_trip() {
    for level in MIN_INNER_LEVEL..=MAX_INNER_LEVEL {
        let padding = padding_for_level(level);
        assert_eq!(padding_for_level(level_for_padding(padding)), padding);
        assert_eq!(level_for_padding(padding), level);
    }
    for level in MIN_OUTER_LEVEL..=MAX_OUTER_LEVEL {
        let gap = gap_for_level(level);
        assert_eq!(gap_for_level(level_for_gap(gap)), gap);
        assert_eq!(level_for_gap(gap), level);
    }
}

proptest! {
    #[test]
    fn prop_padding_snaps_to_nearest_level(padding in 0u32..400) {
        let level = level_for_padding(padding);
        prop_assert!((MIN_INNER_LEVEL..=MAX_INNER_LEVEL).contains(&level));

        let clamped = padding.clamp(PAD_AT_MAX_LEVEL, PAD_AT_LEVEL_1);
        let snapped = padding_for_level(level);
        prop_assert!(snapped.abs_diff(clamped) <= 3, "{} snapped to {}", padding, snapped);
    }

    #[test]
    fn prop_outer_contains_inner(
        inner in MIN_INNER_LEVEL..=MAX_INNER_LEVEL,
        outer in MIN_OUTER_LEVEL..=MAX_OUTER_LEVEL,
        width in 1u32..2000,
        height in 1u32..2000,
    ) {
        let region = TrackingRegion::compute(inner, outer, Size::new(width, height));
        if region.is_valid() {
            prop_assert!(region.outer.strictly_contains(&region.inner));
        }
    }

    #[test]
    fn prop_gain_never_exceeds_one(speed in 0.0f64..10.0, drift in 0.0f64..1.0e6) {
        prop_assert!(compute_gain(speed, drift) <= 1.0);
    }

    #[test]
    fn prop_speed_multiplier_bounded(
        ax in 0.0f64..1920.0, ay in 0.0f64..1080.0,
        bx in 0.0f64..1920.0, by in 0.0f64..1080.0,
    ) {
        let speed = speed_multiplier(Some(Point::new(ax, ay)), Point::new(bx, by));
        prop_assert!((MIN_SPEED_FACTOR..=MAX_SPEED_FACTOR).contains(&speed));
    }

    #[test]
    fn prop_filter_converges_monotonically(
        start_x in 0i32..1920, start_y in 0i32..1080,
        target_x in 0i32..1920, target_y in 0i32..1080,
        window in 1usize..=30,
    ) {
        let mut filter = AdaptiveSmoothingFilter::new(&SmoothingConfig { window });
        let target = Point::from_pixels(target_x, target_y);
        let mut cursor = Point::from_pixels(start_x, start_y);
        let mut distance = cursor.distance_to(target);

        for _ in 0..60 {
            let step = filter.step(target, cursor, SCREEN);
            let (x, y) = step.position;
            cursor = Point::from_pixels(x, y);

            let next = cursor.distance_to(target);
            prop_assert!(next <= distance + 1e-9, "distance grew {} -> {}", distance, next);
            distance = next;
        }

        prop_assert!((cursor.x - target.x).abs() <= 1.0);
        prop_assert!((cursor.y - target.y).abs() <= 1.0);
    }
}
