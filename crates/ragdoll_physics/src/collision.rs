//! Collision detection for 2D shapes
//!
//! Provides narrowphase tests between circles, convex polygons, and line
//! segments, plus collision filtering via layer masks and group indices.

use bitflags::bitflags;

use crate::shapes::WorldShape;
use ragdoll_math::Vec2;

/// Shapes closer than this count as touching, so bodies resting on the
/// ground keep reporting a contact between steps.
pub const CONTACT_MARGIN: f32 = 0.01;

bitflags! {
    /// Collision layers for filtering which fixtures can collide
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CollisionLayer: u32 {
        /// Default layer for most objects
        const DEFAULT = 1 << 0;
        /// Ragdoll limbs
        const CHARACTER = 1 << 1;
        /// Vehicle chassis and wheels
        const VEHICLE = 1 << 2;
        /// Static world geometry (ground, tracks)
        const STATIC = 1 << 3;
        /// All layers (collide with everything)
        const ALL = 0xFFFFFFFF;
    }
}

/// Collision filter determining what a fixture collides with
///
/// Two fixtures sharing a non-zero `group` skip the layer test: a positive
/// group always collides, a negative group never does. Otherwise they
/// collide if each one's layer is in the other's mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionFilter {
    /// Which layer(s) this fixture belongs to
    pub layer: CollisionLayer,
    /// Which layer(s) this fixture can collide with
    pub mask: CollisionLayer,
    /// Group override (0 = none)
    pub group: i32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: CollisionLayer::DEFAULT,
            mask: CollisionLayer::ALL,
            group: 0,
        }
    }
}

impl CollisionFilter {
    /// Create a new collision filter with specified layer and mask
    pub fn new(layer: CollisionLayer, mask: CollisionLayer) -> Self {
        Self { layer, mask, group: 0 }
    }

    /// Set the group index
    pub fn with_group(mut self, group: i32) -> Self {
        self.group = group;
        self
    }

    /// Check if this filter allows collision with another filter
    pub fn collides_with(&self, other: &Self) -> bool {
        if self.group != 0 && self.group == other.group {
            return self.group > 0;
        }
        self.layer.intersects(other.mask) && other.layer.intersects(self.mask)
    }

    /// Filter for ragdoll limbs; `group` should be negative and unique per ragdoll
    pub fn character(group: i32) -> Self {
        Self {
            layer: CollisionLayer::CHARACTER,
            mask: CollisionLayer::ALL,
            group,
        }
    }

    /// Filter for vehicle parts
    pub fn vehicle() -> Self {
        Self::new(CollisionLayer::VEHICLE, CollisionLayer::ALL)
    }

    /// Filter for static world geometry
    pub fn static_world() -> Self {
        Self::new(CollisionLayer::STATIC, CollisionLayer::ALL)
    }
}

/// Result of a narrowphase test between shape A and shape B
#[derive(Clone, Copy, Debug)]
pub struct Manifold {
    /// Contact point in world space
    pub point: Vec2,
    /// Unit normal pointing from shape A toward shape B
    pub normal: Vec2,
    /// Overlap depth (may be slightly negative within [`CONTACT_MARGIN`])
    pub penetration: f32,
}

impl Manifold {
    /// Same contact seen from the other shape
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// Test two placed shapes; the normal points from `a` toward `b`
pub fn collide(a: &WorldShape, b: &WorldShape) -> Option<Manifold> {
    match (a, b) {
        (WorldShape::Circle { center: ca, radius: ra }, WorldShape::Circle { center: cb, radius: rb }) => {
            circle_vs_circle(*ca, *ra, *cb, *rb)
        }
        (WorldShape::Polygon { vertices, .. }, WorldShape::Circle { center, radius }) => {
            polygon_vs_circle(vertices, *center, *radius)
        }
        (WorldShape::Circle { center, radius }, WorldShape::Polygon { vertices, .. }) => {
            polygon_vs_circle(vertices, *center, *radius).map(Manifold::flipped)
        }
        (WorldShape::Polygon { vertices: va, .. }, WorldShape::Polygon { vertices: vb, .. }) => {
            polygon_vs_polygon(va, vb)
        }
        (WorldShape::Segments(segments), WorldShape::Circle { center, radius }) => {
            deepest(segments.iter().filter_map(|(p, q)| segment_vs_circle(*p, *q, *center, *radius)))
        }
        (WorldShape::Circle { center, radius }, WorldShape::Segments(segments)) => deepest(
            segments
                .iter()
                .filter_map(|(p, q)| segment_vs_circle(*p, *q, *center, *radius)),
        )
        .map(Manifold::flipped),
        (WorldShape::Polygon { vertices, .. }, WorldShape::Segments(segments)) => deepest(
            segments
                .iter()
                .filter_map(|(p, q)| polygon_vs_polygon(vertices, &[*p, *q])),
        ),
        (WorldShape::Segments(segments), WorldShape::Polygon { vertices, .. }) => deepest(
            segments
                .iter()
                .filter_map(|(p, q)| polygon_vs_polygon(&[*p, *q], vertices)),
        ),
        // Edges and chains only live on static bodies
        (WorldShape::Segments(_), WorldShape::Segments(_)) => None,
    }
}

fn deepest(manifolds: impl Iterator<Item = Manifold>) -> Option<Manifold> {
    manifolds.fold(None, |best: Option<Manifold>, m| match best {
        Some(b) if b.penetration >= m.penetration => Some(b),
        _ => Some(m),
    })
}

/// Circle vs circle
pub fn circle_vs_circle(ca: Vec2, ra: f32, cb: Vec2, rb: f32) -> Option<Manifold> {
    let delta = cb - ca;
    let dist = delta.length();
    let penetration = ra + rb - dist;
    if penetration < -CONTACT_MARGIN {
        return None;
    }
    let normal = delta.normalized_or(Vec2::Y);
    Some(Manifold {
        point: ca + normal * ra,
        normal,
        penetration,
    })
}

/// Closest point to `p` on segment `a`-`b`
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Segment (as shape A) vs circle (as shape B)
pub fn segment_vs_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> Option<Manifold> {
    let closest = closest_point_on_segment(a, b, center);
    let delta = center - closest;
    let dist = delta.length();
    let penetration = radius - dist;
    if penetration < -CONTACT_MARGIN {
        return None;
    }
    // Center exactly on the line: push out along the segment's left normal
    let normal = delta.normalized_or((b - a).perp().normalized_or(Vec2::Y));
    Some(Manifold {
        point: closest,
        normal,
        penetration,
    })
}

/// Convex polygon (as shape A, counter-clockwise) vs circle (as shape B)
pub fn polygon_vs_circle(vertices: &[Vec2], center: Vec2, radius: f32) -> Option<Manifold> {
    let n = vertices.len();
    let mut max_separation = f32::MIN;
    let mut best_normal = Vec2::Y;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let normal = outward_normal(a, b);
        let separation = normal.dot(center - a);
        if separation > max_separation {
            max_separation = separation;
            best_normal = normal;
        }
    }

    if max_separation > radius + CONTACT_MARGIN {
        return None;
    }

    if max_separation < 0.0 {
        // Center is inside the polygon: escape through the nearest face
        return Some(Manifold {
            point: center - best_normal * radius,
            normal: best_normal,
            penetration: radius - max_separation,
        });
    }

    let closest = (0..n)
        .map(|i| closest_point_on_segment(vertices[i], vertices[(i + 1) % n], center))
        .min_by(|p, q| {
            (center - *p)
                .length_squared()
                .total_cmp(&(center - *q).length_squared())
        })?;
    let delta = center - closest;
    let dist = delta.length();
    let penetration = radius - dist;
    if penetration < -CONTACT_MARGIN {
        return None;
    }
    Some(Manifold {
        point: closest,
        normal: delta.normalized_or(best_normal),
        penetration,
    })
}

/// Separating-axis test between two convex vertex loops
///
/// A two-vertex loop is treated as a line segment (both of its normals are
/// tested). The normal points from `a` toward `b`.
pub fn polygon_vs_polygon(a: &[Vec2], b: &[Vec2]) -> Option<Manifold> {
    let mut best_overlap = f32::MAX;
    let mut best_axis = Vec2::Y;

    for poly in [a, b] {
        let n = poly.len();
        for i in 0..n {
            let axis = outward_normal(poly[i], poly[(i + 1) % n]);
            if axis == Vec2::ZERO {
                continue;
            }
            let (min_a, max_a) = project(a, axis);
            let (min_b, max_b) = project(b, axis);
            // Push-out distance with B ahead of A along the axis, or behind it
            let ahead = max_a - min_b;
            let behind = max_b - min_a;
            let overlap = ahead.min(behind);
            if overlap < -CONTACT_MARGIN {
                return None;
            }
            if overlap < best_overlap {
                best_overlap = overlap;
                best_axis = if ahead <= behind { axis } else { -axis };
            }
        }
    }

    let support_a = support_point(a, best_axis);
    let support_b = support_point(b, -best_axis);
    let point = if b.len() == 2 {
        support_a
    } else if a.len() == 2 {
        support_b
    } else {
        (support_a + support_b) * 0.5
    };

    Some(Manifold {
        point,
        normal: best_axis,
        penetration: best_overlap,
    })
}

fn outward_normal(a: Vec2, b: Vec2) -> Vec2 {
    let edge = b - a;
    Vec2::new(edge.y, -edge.x).normalized()
}

fn project(vertices: &[Vec2], axis: Vec2) -> (f32, f32) {
    vertices.iter().fold((f32::MAX, f32::MIN), |(min, max), v| {
        let d = v.dot(axis);
        (min.min(d), max.max(d))
    })
}

/// Average of the vertices furthest along `direction`
fn support_point(vertices: &[Vec2], direction: Vec2) -> Vec2 {
    const FLAT_TOLERANCE: f32 = 0.005;
    let max = vertices
        .iter()
        .map(|v| v.dot(direction))
        .fold(f32::MIN, f32::max);
    let (sum, count) = vertices
        .iter()
        .filter(|v| v.dot(direction) >= max - FLAT_TOLERANCE)
        .fold((Vec2::ZERO, 0), |(sum, count), v| (sum + *v, count + 1));
    sum / count.max(1) as f32
}
