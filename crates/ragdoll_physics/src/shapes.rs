//! Collision shapes for 2D physics
//!
//! Shapes are stored in body-local coordinates; [`Shape::to_world`] places
//! them for narrowphase tests. Edges and chains are meant for static bodies.

use ragdoll_math::Vec2;

/// A collision shape in body-local coordinates
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Circle centered on the body origin
    Circle { radius: f32 },
    /// Convex polygon, vertices in counter-clockwise order
    Polygon { vertices: Vec<Vec2> },
    /// Single line segment
    Edge { a: Vec2, b: Vec2 },
    /// Open polyline (e.g. a sampled track curve)
    Chain { vertices: Vec<Vec2> },
}

/// A shape placed in world space
#[derive(Clone, Debug)]
pub enum WorldShape {
    Circle { center: Vec2, radius: f32 },
    Polygon { vertices: Vec<Vec2>, centroid: Vec2 },
    Segments(Vec<(Vec2, Vec2)>),
}

impl Shape {
    /// Create a circle shape
    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    /// Create a box with the given half-extents, centered on the body origin
    pub fn rect(half_width: f32, half_height: f32) -> Self {
        Shape::Polygon {
            vertices: vec![
                Vec2::new(-half_width, -half_height),
                Vec2::new(half_width, -half_height),
                Vec2::new(half_width, half_height),
                Vec2::new(-half_width, half_height),
            ],
        }
    }

    /// Create a line segment
    pub fn edge(a: Vec2, b: Vec2) -> Self {
        Shape::Edge { a, b }
    }

    /// Create an open polyline
    pub fn chain(vertices: Vec<Vec2>) -> Self {
        Shape::Chain { vertices }
    }

    /// Area of the shape (zero for edges and chains)
    pub fn area(&self) -> f32 {
        match self {
            Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
            Shape::Polygon { vertices } => polygon_cross_sum(vertices) * 0.5,
            Shape::Edge { .. } | Shape::Chain { .. } => 0.0,
        }
    }

    /// Mass and rotational inertia about the body origin for a given density
    pub fn mass_data(&self, density: f32) -> (f32, f32) {
        match self {
            Shape::Circle { radius } => {
                let mass = density * self.area();
                (mass, 0.5 * mass * radius * radius)
            }
            Shape::Polygon { vertices } => {
                let mass = density * self.area();
                let n = vertices.len();
                let mut inertia = 0.0;
                for i in 0..n {
                    let a = vertices[i];
                    let b = vertices[(i + 1) % n];
                    let cross = a.cross(b);
                    inertia += cross * (a.dot(a) + a.dot(b) + b.dot(b));
                }
                (mass, density * inertia / 12.0)
            }
            Shape::Edge { .. } | Shape::Chain { .. } => (0.0, 0.0),
        }
    }

    /// Radius of a circle around the body origin containing the shape
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Shape::Circle { radius } => *radius,
            Shape::Polygon { vertices } | Shape::Chain { vertices } => vertices
                .iter()
                .map(|v| v.length())
                .fold(0.0, f32::max),
            Shape::Edge { a, b } => a.length().max(b.length()),
        }
    }

    /// Place the shape in the world at a body's position and angle
    pub fn to_world(&self, position: Vec2, angle: f32) -> WorldShape {
        let place = |v: &Vec2| position + v.rotated(angle);
        match self {
            Shape::Circle { radius } => WorldShape::Circle {
                center: position,
                radius: *radius,
            },
            Shape::Polygon { vertices } => WorldShape::Polygon {
                vertices: vertices.iter().map(place).collect(),
                centroid: position,
            },
            Shape::Edge { a, b } => WorldShape::Segments(vec![(place(a), place(b))]),
            Shape::Chain { vertices } => WorldShape::Segments(
                vertices
                    .windows(2)
                    .map(|pair| (place(&pair[0]), place(&pair[1])))
                    .collect(),
            ),
        }
    }
}

fn polygon_cross_sum(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    (0..n)
        .map(|i| vertices[i].cross(vertices[(i + 1) % n]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_rect_area_and_mass() {
        let shape = Shape::rect(2.0, 0.5);
        assert!((shape.area() - 4.0).abs() < EPSILON);

        let (mass, inertia) = shape.mass_data(1.0);
        assert!((mass - 4.0).abs() < EPSILON);
        // m * (w^2 + h^2) / 12 with full extents 4 x 1
        assert!((inertia - 4.0 * (16.0 + 1.0) / 12.0).abs() < 0.001);
    }

    #[test]
    fn test_circle_mass() {
        let (mass, inertia) = Shape::circle(0.5).mass_data(2.0);
        let expected_mass = 2.0 * std::f32::consts::PI * 0.25;
        assert!((mass - expected_mass).abs() < EPSILON);
        assert!((inertia - 0.5 * expected_mass * 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_static_shapes_have_no_mass() {
        assert_eq!(Shape::edge(Vec2::ZERO, Vec2::X).mass_data(1.0), (0.0, 0.0));
        assert_eq!(Shape::chain(vec![Vec2::ZERO, Vec2::X]).mass_data(1.0), (0.0, 0.0));
    }

    #[test]
    fn test_to_world_rotates_polygon() {
        let shape = Shape::rect(1.0, 0.5);
        let placed = shape.to_world(Vec2::new(10.0, 0.0), std::f32::consts::FRAC_PI_2);
        match placed {
            WorldShape::Polygon { vertices, centroid } => {
                assert_eq!(centroid, Vec2::new(10.0, 0.0));
                // (-1, -0.5) rotated a quarter turn is (0.5, -1)
                assert!((vertices[0] - Vec2::new(10.5, -1.0)).length() < EPSILON);
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_chain_to_segments() {
        let shape = Shape::chain(vec![Vec2::ZERO, Vec2::X, Vec2::new(2.0, 1.0)]);
        match shape.to_world(Vec2::ZERO, 0.0) {
            WorldShape::Segments(segments) => assert_eq!(segments.len(), 2),
            other => panic!("expected segments, got {:?}", other),
        }
    }
}
