//! Angle utilities shared by the estimator, the matcher and the controller.
//!
//! All signed angles in this crate live in (-π, π]. Orientations that are only
//! defined modulo π (spectral directions) live in [0, π).

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Polar angle of the displacement `(x, y)` in (-π, π].
///
/// Unlike `f64::atan2` this never returns -π: a vector on the negative x axis
/// (with either sign of zero in `y`) maps to exactly π. The zero vector has no
/// direction and yields NaN, so zero-length displacements never fall inside an
/// angle window.
#[inline]
pub fn polar_angle(x: f64, y: f64) -> f64 {
    if x == 0.0 && y == 0.0 {
        return f64::NAN;
    }
    if y == 0.0 && x < 0.0 {
        return PI;
    }
    let a = y.atan2(x);
    if a <= -PI {
        PI
    } else {
        a
    }
}

/// Wraps an angle into (-π, π].
#[inline]
pub fn wrap_pi(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let mut a = (angle + PI).rem_euclid(TAU) - PI;
    if a <= -PI {
        a += TAU;
    }
    a
}

/// Normalizes an angle into the range [0, π).
#[inline]
pub fn normalize_half_pi(angle: f64) -> f64 {
    let norm = angle.rem_euclid(PI);
    if norm >= PI - 1e-12 {
        0.0
    } else {
        norm
    }
}

/// Signed difference `a - b` of two orientations defined modulo π, in (-π/2, π/2].
#[inline]
pub fn orientation_delta(a: f64, b: f64) -> f64 {
    let mut d = (a - b).rem_euclid(PI);
    if d > FRAC_PI_2 {
        d -= PI;
    }
    d
}

/// Smallest unsigned difference between two signed angles, in [0, π].
#[inline]
pub fn circular_distance(a: f64, b: f64) -> f64 {
    wrap_pi(a - b).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn polar_angle_negative_x_axis_is_pi() {
        assert_eq!(polar_angle(-1.0, 0.0), PI);
        assert_eq!(polar_angle(-3.5, -0.0), PI);
        assert_eq!(polar_angle(-1e-300, 0.0), PI);
    }

    #[test]
    fn polar_angle_origin_is_nan() {
        assert!(polar_angle(0.0, 0.0).is_nan());
        assert!(polar_angle(-0.0, 0.0).is_nan());
        assert!(polar_angle(0.0, -0.0).is_nan());
    }

    #[test]
    fn polar_angle_stays_in_half_open_range() {
        let mut samples = Vec::new();
        for i in -8..=8 {
            for j in -8..=8 {
                if i == 0 && j == 0 {
                    continue;
                }
                samples.push((i as f64 * 0.37, j as f64 * 1.3));
            }
        }
        samples.push((-1.0, -1e-300));
        samples.push((-1.0, 1e-300));
        samples.push((0.0, -2.0));
        for (x, y) in samples {
            let a = polar_angle(x, y);
            assert!(a > -PI && a <= PI, "angle {a} out of range for ({x}, {y})");
        }
    }

    #[test]
    fn polar_angle_matches_quadrants() {
        assert!(approx_eq(polar_angle(1.0, 0.0), 0.0));
        assert!(approx_eq(polar_angle(0.0, 1.0), FRAC_PI_2));
        assert!(approx_eq(polar_angle(0.0, -1.0), -FRAC_PI_2));
        assert!(approx_eq(polar_angle(1.0, 1.0), PI / 4.0));
    }

    #[test]
    fn wrap_pi_maps_into_range() {
        assert!(approx_eq(wrap_pi(-PI), PI));
        assert!(approx_eq(wrap_pi(PI), PI));
        assert!(approx_eq(wrap_pi(3.0 * PI / 2.0), -FRAC_PI_2));
        assert!(approx_eq(wrap_pi(0.3 + 4.0 * PI), 0.3));
        assert!(approx_eq(wrap_pi(-0.3 - 2.0 * PI), -0.3));
    }

    #[test]
    fn normalize_half_pi_basic() {
        assert!(approx_eq(normalize_half_pi(0.5), 0.5));
        assert!(approx_eq(normalize_half_pi(-PI / 4.0), 3.0 * PI / 4.0));
        assert!(approx_eq(normalize_half_pi(PI), 0.0));
        assert!(approx_eq(normalize_half_pi(3.0 * PI), 0.0));
    }

    #[test]
    fn orientation_delta_handles_wrap() {
        assert!(approx_eq(orientation_delta(0.05, PI - 0.05), 0.1));
        assert!(approx_eq(orientation_delta(PI - 0.05, 0.05), -0.1));
        assert!(approx_eq(orientation_delta(1.0, 0.5), 0.5));
    }

    #[test]
    fn circular_distance_is_symmetric() {
        assert!(approx_eq(circular_distance(3.0, -3.0), TAU - 6.0));
        assert!(approx_eq(circular_distance(-3.0, 3.0), TAU - 6.0));
        assert!(approx_eq(circular_distance(0.2, 0.5), 0.3));
    }
}
