//! Rigid body types for 2D physics simulation

use crate::collision::CollisionFilter;
use crate::shapes::Shape;
use ragdoll_math::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

// Define generational key type for rigid bodies
new_key_type! {
    /// Key to a rigid body in the physics world
    ///
    /// Uses generational indexing so a handle to a destroyed body can never
    /// alias a body created later: old keys return `None` instead of
    /// pointing at the wrong body.
    pub struct BodyKey;
}

/// Whether a body moves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BodyType {
    /// Never moves; infinite mass (ground, tracks)
    Static,
    /// Integrated every step
    #[default]
    Dynamic,
}

/// Everything needed to create a body
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub angle: f32,
}

impl BodyDesc {
    /// A dynamic body at the given position
    pub fn dynamic(position: Vec2) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position,
            angle: 0.0,
        }
    }

    /// A static body at the given position
    pub fn fixed(position: Vec2) -> Self {
        Self {
            body_type: BodyType::Static,
            position,
            angle: 0.0,
        }
    }

    /// Set the initial angle
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }
}

/// Surface response of a fixture
///
/// Both values live in [0, 1]. Where two fixtures touch, friction is the
/// geometric mean of theirs and the bouncier restitution wins.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self::new(0.5, 0.0)
    }
}

impl PhysicsMaterial {
    /// Clamps both values into [0, 1]
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction: friction.clamp(0.0, 1.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }

    /// Material of a contact between two fixtures
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            friction: (self.friction * other.friction).sqrt(),
            restitution: self.restitution.max(other.restitution),
        }
    }
}

/// A shape attached to a body with its surface properties
#[derive(Clone, Debug, PartialEq)]
pub struct FixtureDesc {
    pub shape: Shape,
    pub density: f32,
    pub material: PhysicsMaterial,
    pub filter: CollisionFilter,
}

impl FixtureDesc {
    /// Create a fixture with density 1 and the default material
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            density: 1.0,
            material: PhysicsMaterial::default(),
            filter: CollisionFilter::default(),
        }
    }

    /// Set the density
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Set the friction (clamped to [0, 1])
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.material = PhysicsMaterial::new(friction, self.material.restitution);
        self
    }

    /// Set the restitution (clamped to [0, 1])
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.material = PhysicsMaterial::new(self.material.friction, restitution);
        self
    }

    /// Set the collision filter
    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// A 2D rigid body owned by [`crate::SandboxWorld`]
#[derive(Clone, Debug)]
pub struct RigidBody2D {
    /// Position of the body origin (also its center of mass)
    pub position: Vec2,
    /// Rotation in radians, counter-clockwise, not wrapped
    pub angle: f32,
    /// Velocity (units per second)
    pub linear_velocity: Vec2,
    /// Angular velocity (radians per second)
    pub angular_velocity: f32,
    /// Force accumulated since the last step
    pub force: Vec2,
    /// Torque accumulated since the last step
    pub torque: f32,
    pub body_type: BodyType,
    pub fixtures: Vec<FixtureDesc>,
    mass: f32,
    inv_mass: f32,
    inertia: f32,
    inv_inertia: f32,
}

impl RigidBody2D {
    /// Create a body without fixtures
    pub fn new(desc: BodyDesc) -> Self {
        Self {
            position: desc.position,
            angle: desc.angle,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            body_type: desc.body_type,
            fixtures: Vec::new(),
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
        }
    }

    /// Attach a fixture and recompute mass properties
    pub fn add_fixture(&mut self, fixture: FixtureDesc) {
        self.fixtures.push(fixture);
        self.update_mass();
    }

    fn update_mass(&mut self) {
        if self.body_type == BodyType::Static {
            return;
        }
        let (mass, inertia) = self
            .fixtures
            .iter()
            .map(|f| f.shape.mass_data(f.density))
            .fold((0.0, 0.0), |(m, i), (fm, fi)| (m + fm, i + fi));

        // A dynamic body always has some mass so forces stay finite
        self.mass = if mass > 0.0 { mass } else { 1.0 };
        self.inertia = if inertia > 0.0 { inertia } else { self.mass * 0.1 };
        self.inv_mass = 1.0 / self.mass;
        self.inv_inertia = 1.0 / self.inertia;
    }

    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    /// Transform a body-local point into world space
    pub fn world_point(&self, local: Vec2) -> Vec2 {
        self.position + local.rotated(self.angle)
    }

    /// Transform a world point into body-local space
    pub fn local_point(&self, world: Vec2) -> Vec2 {
        (world - self.position).rotated(-self.angle)
    }

    /// Velocity of a world point attached to this body
    pub fn velocity_at(&self, world: Vec2) -> Vec2 {
        self.linear_velocity + Vec2::cross_scalar(self.angular_velocity, world - self.position)
    }

    /// Apply an instantaneous impulse at a world point
    pub fn apply_impulse_at(&mut self, impulse: Vec2, world: Vec2) {
        if self.is_static() {
            return;
        }
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * (world - self.position).cross(impulse);
    }

    /// Accumulate a force at a world point for the next step
    pub fn apply_force_at(&mut self, force: Vec2, world: Vec2) {
        if self.is_static() {
            return;
        }
        self.force += force;
        self.torque += (world - self.position).cross(force);
    }

    /// Shift the body by a positional correction
    pub fn apply_correction(&mut self, correction: Vec2) {
        if !self.is_static() {
            self.position += correction;
        }
    }
}

/// Copy of the kinematic state the solver works on
///
/// Joints and contacts touch two bodies at once; solving on copies and
/// writing back avoids borrowing two slots of the body map mutably.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Motion {
    pub position: Vec2,
    pub angle: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub inv_mass: f32,
    pub inv_inertia: f32,
}

impl Motion {
    pub fn of(body: &RigidBody2D) -> Self {
        Self {
            position: body.position,
            angle: body.angle,
            velocity: body.linear_velocity,
            angular_velocity: body.angular_velocity,
            inv_mass: body.inv_mass,
            inv_inertia: body.inv_inertia,
        }
    }

    /// Write velocities and pose back to the body
    pub fn store(&self, body: &mut RigidBody2D) {
        if body.is_static() {
            return;
        }
        body.position = self.position;
        body.angle = self.angle;
        body.linear_velocity = self.velocity;
        body.angular_velocity = self.angular_velocity;
    }

    /// Velocity of the point at offset `r` from the center
    pub fn velocity_at(&self, r: Vec2) -> Vec2 {
        self.velocity + Vec2::cross_scalar(self.angular_velocity, r)
    }

    pub fn apply_impulse(&mut self, impulse: Vec2, r: Vec2) {
        self.velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * r.cross(impulse);
    }

    pub fn apply_displacement(&mut self, impulse: Vec2, r: Vec2) {
        self.position += impulse * self.inv_mass;
        self.angle += self.inv_inertia * r.cross(impulse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_new_dynamic_body() {
        let body = RigidBody2D::new(BodyDesc::dynamic(Vec2::new(1.0, 2.0)).with_angle(0.5));
        assert_eq!(body.position, Vec2::new(1.0, 2.0));
        assert_eq!(body.angle, 0.5);
        assert_eq!(body.linear_velocity, Vec2::ZERO);
        assert!(!body.is_static());
    }

    #[test]
    fn test_mass_from_fixtures() {
        let mut body = RigidBody2D::new(BodyDesc::dynamic(Vec2::ZERO));
        body.add_fixture(FixtureDesc::new(Shape::rect(2.0, 0.5)).with_density(1.0));
        assert!((body.mass() - 4.0).abs() < EPSILON);
        assert!((body.inv_mass() - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_static_body_ignores_impulses() {
        let mut body = RigidBody2D::new(BodyDesc::fixed(Vec2::ZERO));
        body.add_fixture(FixtureDesc::new(Shape::edge(Vec2::ZERO, Vec2::X)));
        body.apply_impulse_at(Vec2::new(0.0, 100.0), Vec2::ZERO);
        body.apply_correction(Vec2::X);
        assert_eq!(body.linear_velocity, Vec2::ZERO);
        assert_eq!(body.position, Vec2::ZERO);
    }

    #[test]
    fn test_off_center_impulse_spins() {
        let mut body = RigidBody2D::new(BodyDesc::dynamic(Vec2::ZERO));
        body.add_fixture(FixtureDesc::new(Shape::rect(1.0, 1.0)));
        body.apply_impulse_at(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0));
        assert!(body.angular_velocity > 0.0);
    }

    #[test]
    fn test_local_world_round_trip() {
        let body = RigidBody2D::new(BodyDesc::dynamic(Vec2::new(3.0, -1.0)).with_angle(1.2));
        let p = Vec2::new(0.4, 0.7);
        let back = body.local_point(body.world_point(p));
        assert!((back - p).length() < EPSILON);
    }

    #[test]
    fn test_fixture_builder_clamps_material() {
        let fixture = FixtureDesc::new(Shape::circle(0.5))
            .with_density(2.0)
            .with_friction(0.9)
            .with_restitution(1.5);
        assert_eq!(fixture.density, 2.0);
        assert_eq!(fixture.material.friction, 0.9);
        assert_eq!(fixture.material.restitution, 1.0);
    }

    #[test]
    fn test_material_combine() {
        let tyre = PhysicsMaterial::new(0.9, 0.2);
        let ground = PhysicsMaterial::default();
        let combined = tyre.combine(&ground);
        assert!((combined.friction - (0.9_f32 * 0.5).sqrt()).abs() < EPSILON);
        assert_eq!(combined.restitution, 0.2);
        assert_eq!(ground.combine(&tyre), combined);
    }
}
