//! Parametric bezier curves
//!
//! Quadratic and cubic curves share one evaluator (De Casteljau) and one
//! segment-count heuristic; the kind only decides how many control points
//! the curve carries.

use serde::{Deserialize, Serialize};

use crate::Vec2;

/// Which bezier a [`Curve`] represents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveKind {
    /// Start, one control point, end
    Quadratic,
    /// Start, two control points, end
    Cubic,
}

impl CurveKind {
    /// Number of points (including both endpoints) this kind needs
    pub const fn control_point_count(self) -> usize {
        match self {
            CurveKind::Quadratic => 3,
            CurveKind::Cubic => 4,
        }
    }
}

/// A bezier curve with its control points, endpoints first and last
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    kind: CurveKind,
    points: Vec<Vec2>,
}

impl Curve {
    /// Create a curve, returning `None` when the point count does not match the kind
    pub fn new(kind: CurveKind, points: Vec<Vec2>) -> Option<Self> {
        if points.len() != kind.control_point_count() {
            return None;
        }
        Some(Self { kind, points })
    }

    /// Quadratic curve from `start` to `end` bent toward `control`
    pub fn quadratic(start: Vec2, control: Vec2, end: Vec2) -> Self {
        Self {
            kind: CurveKind::Quadratic,
            points: vec![start, control, end],
        }
    }

    /// Cubic curve from `start` to `end` with two control points
    pub fn cubic(start: Vec2, control_a: Vec2, control_b: Vec2, end: Vec2) -> Self {
        Self {
            kind: CurveKind::Cubic,
            points: vec![start, control_a, control_b, end],
        }
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Evaluate the curve at `t` in `[0, 1]` by repeated interpolation
    pub fn point_at(&self, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        // Control point count is at most 4
        let mut scratch = [Vec2::ZERO; 4];
        let n = self.points.len();
        scratch[..n].copy_from_slice(&self.points);
        for level in (1..n).rev() {
            for i in 0..level {
                scratch[i] = scratch[i].lerp(scratch[i + 1], t);
            }
        }
        scratch[0]
    }

    /// Number of line segments needed to approximate the curve
    ///
    /// Long chords and bent control polygons both raise the count;
    /// `resolution` is the target segment length.
    pub fn segment_count(&self, resolution: f32) -> usize {
        let resolution = resolution.max(f32::EPSILON);
        let start = self.points[0];
        let end = self.points[self.points.len() - 1];
        let chord = start.distance(end);

        let polygon: f32 = self
            .points
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum();

        let by_length = (chord / resolution).ceil() as usize;
        let by_curvature = (polygon / resolution * 4.0).ceil() as usize;
        by_length.max(by_curvature).max(1)
    }

    /// Sample the curve into a polyline including both endpoints
    pub fn sample(&self, resolution: f32) -> Vec<Vec2> {
        let segments = self.segment_count(resolution);
        (0..=segments)
            .map(|i| self.point_at(i as f32 / segments as f32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_new_checks_point_count() {
        assert!(Curve::new(CurveKind::Quadratic, vec![Vec2::ZERO; 3]).is_some());
        assert!(Curve::new(CurveKind::Quadratic, vec![Vec2::ZERO; 4]).is_none());
        assert!(Curve::new(CurveKind::Cubic, vec![Vec2::ZERO; 4]).is_some());
    }

    #[test]
    fn test_endpoints_are_interpolated() {
        let curve = Curve::cubic(
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 100.0),
            Vec2::new(100.0, 10.0),
            Vec2::new(100.0, 100.0),
        );
        assert_eq!(curve.point_at(0.0), Vec2::new(10.0, 10.0));
        let end = curve.point_at(1.0);
        assert!((end.x - 100.0).abs() < EPSILON && (end.y - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_quadratic_matches_polynomial() {
        let (p0, p1, p2) = (Vec2::new(10.0, 10.0), Vec2::new(10.0, 100.0), Vec2::new(100.0, 100.0));
        let curve = Curve::quadratic(p0, p1, p2);
        let t = 0.3;
        let expected = p0 * ((1.0 - t) * (1.0 - t)) + p1 * (2.0 * (1.0 - t) * t) + p2 * (t * t);
        let actual = curve.point_at(t);
        assert!((actual - expected).length() < EPSILON);
    }

    #[test]
    fn test_segment_count_grows_with_curvature() {
        let straight = Curve::quadratic(Vec2::ZERO, Vec2::new(50.0, 0.0), Vec2::new(100.0, 0.0));
        let bent = Curve::quadratic(Vec2::ZERO, Vec2::new(50.0, 400.0), Vec2::new(100.0, 0.0));
        assert!(bent.segment_count(200.0) > straight.segment_count(200.0));
        assert!(straight.segment_count(200.0) >= 1);
    }

    #[test]
    fn test_sample_includes_endpoints() {
        let curve = Curve::quadratic(Vec2::ZERO, Vec2::new(1.0, 3.0), Vec2::new(2.0, 0.0));
        let points = curve.sample(0.5);
        assert_eq!(points.len(), curve.segment_count(0.5) + 1);
        assert_eq!(points[0], Vec2::ZERO);
        assert!((points[points.len() - 1] - Vec2::new(2.0, 0.0)).length() < EPSILON);
    }
}
