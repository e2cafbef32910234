//! Angle wrapping helpers
//!
//! Body angles reported by the physics world accumulate without bound, so
//! every controller that compares angles goes through these helpers.

use std::f32::consts::{PI, TAU};

/// Wrap an angle into `(-PI, PI]`
///
/// Unlike a plain `%`, this handles negative input correctly. A half turn
/// in either direction comes back as `+PI`.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = PI - (PI - angle).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Shortest signed rotation that takes `b` onto `a`, in `[-PI, PI]`
///
/// Antisymmetric: `shortest_signed_angle_difference(a, b) == -shortest_signed_angle_difference(b, a)`,
/// except at the exact `±PI` boundary, where both directions are equally short and the
/// result keeps the sign of the raw difference.
#[inline]
pub fn shortest_signed_angle_difference(a: f32, b: f32) -> f32 {
    let diff = a - b;
    if diff.abs() <= PI {
        return diff;
    }
    let wrapped = diff.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_normalize_angle_range() {
        for i in -200..=200 {
            let angle = i as f32 * 0.173;
            let n = normalize_angle(angle);
            assert!(n > -PI && n <= PI, "{} -> {}", angle, n);
            // Same direction
            assert!((n.sin() - angle.sin()).abs() < 0.001);
            assert!((n.cos() - angle.cos()).abs() < 0.001);
        }
    }

    #[test]
    fn test_normalize_negative_angle() {
        // A plain `%` would leave -3PI/2 at -3PI/2 - wrong for a tilt check
        let n = normalize_angle(-1.5 * PI);
        assert!((n - 0.5 * PI).abs() < EPSILON);
    }

    #[test]
    fn test_normalize_half_turn_is_positive_pi() {
        assert_eq!(normalize_angle(PI), PI);
        assert_eq!(normalize_angle(-PI), PI);
        assert!((normalize_angle(3.0 * PI) - PI).abs() < EPSILON);
        assert!((normalize_angle(-PI + 0.01) - (-PI + 0.01)).abs() < EPSILON);
    }

    #[test]
    fn test_shortest_difference_wraps_discontinuity() {
        let d = shortest_signed_angle_difference(PI - 0.1, -PI + 0.1);
        assert!((d - (-0.2)).abs() < EPSILON);
    }

    #[test]
    fn test_shortest_difference_range_and_antisymmetry() {
        for i in -60..=60 {
            for j in -60..=60 {
                let a = i as f32 * 0.31;
                let b = j as f32 * 0.27;
                let ab = shortest_signed_angle_difference(a, b);
                let ba = shortest_signed_angle_difference(b, a);
                assert!((-PI..=PI).contains(&ab));
                if ab.abs() < PI - EPSILON {
                    assert!((ab + ba).abs() < 0.001, "a={} b={} ab={} ba={}", a, b, ab, ba);
                }
            }
        }
    }

    #[test]
    fn test_shortest_difference_identity() {
        assert_eq!(shortest_signed_angle_difference(0.2, 0.2), 0.0);
        assert!((shortest_signed_angle_difference(0.2, 0.0) - 0.2).abs() < EPSILON);
    }
}
