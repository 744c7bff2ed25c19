mod common;

use common::synthetic::{random_pairs, square_lattice, OFFSET_ANGLE, OFFSET_DISTANCE};
use order_matcher::angle::wrap_pi;
use order_matcher::{OrientationEstimator, Permutation};
use std::f64::consts::{FRAC_PI_2, PI};

#[test]
fn estimate_brackets_true_offset() {
    let _ = env_logger::builder().is_test(true).try_init();
    let points = random_pairs(1000, 28000.0, 3);
    let estimator = OrientationEstimator::default();
    let estimate = estimator.estimate(&points, Permutation::new(false, false));

    assert!(estimate.success, "no spacing peak: {estimate:?}");
    let window = estimate.angle_window();
    assert!(
        window.contains(OFFSET_ANGLE) || window.contains(wrap_pi(OFFSET_ANGLE - PI)),
        "angle window {window:?} misses ±{OFFSET_ANGLE}"
    );
    assert!(
        estimate.dist_low <= OFFSET_DISTANCE && OFFSET_DISTANCE <= estimate.dist_high,
        "distance window [{}, {}] misses {}",
        estimate.dist_low,
        estimate.dist_high,
        OFFSET_DISTANCE
    );
    assert!(estimate.dist_low >= 0.0);
    assert!(estimate.sigma >= 0.04 && estimate.sigma <= 0.2);
}

#[test]
fn square_lattice_window_follows_a_lattice_axis() {
    let _ = env_logger::builder().is_test(true).try_init();
    let points = square_lattice(15, [8000.0, 1000.0]);
    let estimate = OrientationEstimator::default().estimate(&points, Permutation::new(false, false));

    assert!(estimate.success, "no spacing peak: {estimate:?}");
    let window = estimate.angle_window();
    let axes: Vec<f64> = (0..4)
        .map(|k| wrap_pi(OFFSET_ANGLE + k as f64 * FRAC_PI_2))
        .collect();
    assert!(
        axes.iter().any(|&a| window.contains(a)),
        "angle window {window:?} misses every lattice axis {axes:?}"
    );
    assert!(
        estimate.dist_low <= OFFSET_DISTANCE && OFFSET_DISTANCE <= estimate.dist_high,
        "distance window [{}, {}] misses {}",
        estimate.dist_low,
        estimate.dist_high,
        OFFSET_DISTANCE
    );
}

#[test]
fn permutations_move_the_window_consistently() {
    let points = random_pairs(1000, 28000.0, 5);
    let estimator = OrientationEstimator::default();
    let base = estimator.estimate(&points, Permutation::new(false, false));
    let mirrored = estimator.estimate(&points, Permutation::new(false, true));
    let flipped = estimator.estimate(&points, Permutation::new(true, false));

    assert!((mirrored.theta + base.theta).abs() < 1e-9);
    let flip_gap = wrap_pi(flipped.theta - base.theta).abs();
    assert!((flip_gap - PI).abs() < 1e-9);
    assert_eq!(base.dist_low, flipped.dist_low);
    assert_eq!(base.dist_high, mirrored.dist_high);
}

#[test]
fn empty_cloud_reports_failure() {
    let estimate = OrientationEstimator::default().estimate(&[], Permutation::new(false, false));
    assert!(!estimate.success);
    assert_eq!((estimate.dist_low, estimate.dist_high), (0.0, 0.0));
}
