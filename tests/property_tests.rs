//! Property-based tests for run-plotter
//!
//! - Calibration is pure and invertible
//! - Text sequence parsing preserves values
//! - Aggregates stay within the data range
//! - Time alignment never invents samples

use proptest::prelude::*;
use run_plotter::aggregate::Aggregator;
use run_plotter::map::Calibration;
use run_plotter::parse::string_to_float_list;
use run_plotter::plot::episode_array::resize_time;
use run_plotter::plot::stats::{dash_segments, BoxSummary};

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// `(resolution, origin, height)`
fn arb_calibration() -> impl Strategy<Value = (f64, [f64; 2], f64)> {
    (0.01f64..2.0, -50.0f64..50.0, -50.0f64..50.0, 1.0f64..4000.0)
        .prop_map(|(res, ox, oy, height)| (res, [ox, oy], height))
}

fn arb_sequence() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1e6f64..1e6, 0..100)
}

// ============================================================================
// Calibration Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: the transform is deterministic and undoable
    #[test]
    fn prop_calibration_invertible(
        (res, origin, height) in arb_calibration(),
        x in -100.0f64..100.0,
        y in -100.0f64..100.0,
    ) {
        let cal = Calibration::new(res, origin, height).unwrap();
        let (px, py) = cal.to_pixel(&[x, y, 1.0]).unwrap();
        prop_assert_eq!(cal.to_pixel(&[x, y]).unwrap(), (px, py));

        let back_x = px * res + origin[0];
        let back_y = (height - py) * res + origin[1];
        prop_assert!((back_x - x).abs() < 1e-6);
        prop_assert!((back_y - y).abs() < 1e-6);
    }

    /// Property: path conversion keeps one pixel per well-formed position
    #[test]
    fn prop_path_length_preserved(
        (res, origin, height) in arb_calibration(),
        path in prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 2..4), 0..50),
    ) {
        let cal = Calibration::new(res, origin, height).unwrap();
        prop_assert_eq!(cal.path_to_pixels(&path).len(), path.len());
    }
}

// ============================================================================
// Parsing Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: formatting then parsing returns the same values
    #[test]
    fn prop_float_list_preserves_values(values in arb_sequence()) {
        let text = format!(
            "[{}]",
            values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        );
        prop_assert_eq!(string_to_float_list(&text).unwrap(), values);
    }
}

// ============================================================================
// Aggregation Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: every aggregate of a non-empty sequence exists, and
    /// min/max bound the data
    #[test]
    fn prop_aggregates_bounded(values in prop::collection::vec(-1000.0f64..1000.0, 1..300)) {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = Aggregator::Min.apply(&values).unwrap();
        let max = Aggregator::Max.apply(&values).unwrap();

        // f32 lanes lose precision, compare with a tolerance
        prop_assert!((min - lo).abs() < 1e-3);
        prop_assert!((max - hi).abs() < 1e-3);
        prop_assert!(Aggregator::Sum.apply(&values).is_some());
    }

    /// Property: box whiskers lie within the data and around the quartiles
    #[test]
    fn prop_box_summary_ordered(values in prop::collection::vec(-100.0f64..100.0, 1..100)) {
        let mut sorted = values;
        sorted.sort_by(f64::total_cmp);
        let s = BoxSummary::from_sorted(&sorted).unwrap();
        prop_assert!(s.lower_whisker <= s.q1 + 1e-9);
        prop_assert!(s.q1 <= s.median && s.median <= s.q3);
        prop_assert!(s.q3 <= s.upper_whisker + 1e-9);
        prop_assert!(s.lower_whisker >= sorted[0] && s.upper_whisker <= sorted[sorted.len() - 1]);
    }
}

// ============================================================================
// Alignment and Geometry Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: aligned samples never outnumber either input, are strided,
    /// and start at second zero
    #[test]
    fn prop_resize_time_bounded(
        n_time in 0usize..200,
        n_values in 0usize..200,
        step in 1usize..10,
    ) {
        let time: Vec<f64> = (0..n_time).map(|i| 1e12 + i as f64 * 2.5e8).collect();
        let values: Vec<f64> = (0..n_values).map(|i| i as f64).collect();
        let samples = resize_time(&time, &values, step).unwrap();

        let paired = n_time.min(n_values);
        prop_assert_eq!(samples.len(), paired.div_ceil(step));
        if let Some(first) = samples.first() {
            prop_assert_eq!(first.0, 0.0);
        }
        for (k, (_, v)) in samples.iter().enumerate() {
            prop_assert_eq!(*v, (k * step) as f64);
        }
    }

    /// Property: dashes cover at most the polyline and stay on it
    #[test]
    fn prop_dashes_within_length(
        points in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 2..20),
        dash in 0.5f64..10.0,
        gap in 0.0f64..10.0,
    ) {
        let total: f64 = points
            .windows(2)
            .map(|w| (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1))
            .sum();
        let drawn: f64 = dash_segments(&points, dash, gap)
            .iter()
            .map(|[a, b]| (b.0 - a.0).hypot(b.1 - a.1))
            .sum();
        prop_assert!(drawn <= total + 1e-6);
    }
}
