//! Physics world contract and the sandbox engine
//!
//! Controllers only ever talk to [`PhysicsWorld`]. [`SandboxWorld`] is the
//! engine the sandbox ships with: semi-implicit Euler integration, soft
//! joints, and an impulse contact solver with restitution and friction.

use crate::body::{BodyDesc, BodyKey, BodyType, FixtureDesc, Motion, PhysicsMaterial, RigidBody2D};
use crate::collision::{collide, CollisionFilter};
use crate::contact::{ContactObservation, ContactRecord};
use crate::joint::{Joint, JointDesc, JointKey};
use crate::shapes::{Shape, WorldShape};
use ragdoll_math::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Configuration for the physics simulation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity acceleration (applied to Y-axis, negative = down)
    pub gravity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        // Three times earth gravity
        Self { gravity: -29.4 }
    }
}

impl PhysicsConfig {
    /// Create a new physics config with the given gravity
    pub fn new(gravity: f32) -> Self {
        Self { gravity }
    }
}

/// Solver passes per step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverIterations {
    pub velocity: u32,
    pub position: u32,
}

impl Default for SolverIterations {
    fn default() -> Self {
        Self {
            velocity: 8,
            position: 3,
        }
    }
}

/// Read-only view of a body for drawing
#[derive(Clone, Debug)]
pub struct BodySnapshot {
    pub key: BodyKey,
    pub body_type: BodyType,
    pub position: Vec2,
    pub angle: f32,
    pub shapes: Vec<Shape>,
}

/// What the control layer needs from a rigid-body engine
///
/// Handles are generational: once a body or joint is destroyed every
/// query on its key returns `None` and every write is ignored.
pub trait PhysicsWorld {
    /// Create a body without fixtures
    fn create_body(&mut self, desc: BodyDesc) -> BodyKey;
    /// Attach a fixture; false if the body does not exist
    fn create_fixture(&mut self, body: BodyKey, fixture: FixtureDesc) -> bool;
    /// Destroy a body and every joint attached to it
    fn destroy_body(&mut self, body: BodyKey) -> bool;
    /// Create a joint; `None` if either body is missing or they are the same body
    fn create_joint(&mut self, desc: JointDesc) -> Option<JointKey>;
    fn destroy_joint(&mut self, joint: JointKey) -> bool;
    fn contains_body(&self, body: BodyKey) -> bool;
    fn contains_joint(&self, joint: JointKey) -> bool;

    fn position(&self, body: BodyKey) -> Option<Vec2>;
    fn angle(&self, body: BodyKey) -> Option<f32>;
    fn linear_velocity(&self, body: BodyKey) -> Option<Vec2>;
    fn angular_velocity(&self, body: BodyKey) -> Option<f32>;
    /// Relative angle of body B to body A, zero at creation
    fn joint_angle(&self, joint: JointKey) -> Option<f32>;
    /// Contacts touching `body` as of the last step
    fn touching_contacts(&self, body: BodyKey) -> Vec<ContactObservation>;

    fn apply_torque(&mut self, body: BodyKey, torque: f32);
    fn apply_force_to_center(&mut self, body: BodyKey, force: Vec2);
    /// Apply a force at a world point
    fn apply_force(&mut self, body: BodyKey, force: Vec2, point: Vec2);
    /// Apply an impulse at a world point
    fn apply_linear_impulse(&mut self, body: BodyKey, impulse: Vec2, point: Vec2);
    fn apply_angular_impulse(&mut self, body: BodyKey, impulse: f32);
    fn set_linear_velocity(&mut self, body: BodyKey, velocity: Vec2);
    fn set_angular_velocity(&mut self, body: BodyKey, velocity: f32);
    /// Switch a wheel joint's motor; false for missing or motorless joints
    fn set_motor(&mut self, joint: JointKey, enabled: bool, speed: f32) -> bool;

    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32, iterations: SolverIterations);
    fn snapshot(&self) -> Vec<BodySnapshot>;
}

/// Penetration left alone so resting contacts stay touching
const LINEAR_SLOP: f32 = 0.005;
/// Share of remaining penetration removed per step
const CORRECTION_PERCENT: f32 = 0.8;
/// Closing speeds below this do not bounce
const RESTITUTION_THRESHOLD: f32 = 1.0;

/// A contact being solved this step
struct SolverContact {
    record: ContactRecord,
    friction: f32,
    bounce_velocity: f32,
    normal_impulse: f32,
    tangent_impulse: f32,
}

/// A body's fixtures placed in the world for this step
struct PlacedBody {
    key: BodyKey,
    is_static: bool,
    position: Vec2,
    radius: f32,
    fixtures: Vec<(WorldShape, CollisionFilter, PhysicsMaterial)>,
}

/// The sandbox's own 2D rigid-body engine
pub struct SandboxWorld {
    bodies: SlotMap<BodyKey, RigidBody2D>,
    joints: SlotMap<JointKey, Joint>,
    contacts: Vec<ContactRecord>,
    /// Physics configuration
    pub config: PhysicsConfig,
}

impl SandboxWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            joints: SlotMap::with_key(),
            contacts: Vec::new(),
            config,
        }
    }

    /// Get an immutable reference to a body by key
    pub fn body(&self, key: BodyKey) -> Option<&RigidBody2D> {
        self.bodies.get(key)
    }

    /// Get the number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Number of contacts recorded by the last step
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    fn joined_without_collision(&self, a: BodyKey, b: BodyKey) -> bool {
        self.joints
            .values()
            .any(|j| !j.collide_connected && j.connects(a, b))
    }

    fn place_bodies(&self) -> Vec<PlacedBody> {
        self.bodies
            .iter()
            .map(|(key, body)| PlacedBody {
                key,
                is_static: body.is_static(),
                position: body.position,
                radius: body
                    .fixtures
                    .iter()
                    .map(|f| f.shape.bounding_radius())
                    .fold(0.0, f32::max),
                fixtures: body
                    .fixtures
                    .iter()
                    .map(|f| (f.shape.to_world(body.position, body.angle), f.filter, f.material))
                    .collect(),
            })
            .collect()
    }

    /// Broadphase by bounding circles, then narrowphase per fixture pair
    fn find_contacts(&self) -> Vec<SolverContact> {
        let placed = self.place_bodies();
        let mut found = Vec::new();
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                if a.is_static && b.is_static {
                    continue;
                }
                // Static geometry can be long, so only bound dynamic pairs
                if !a.is_static && !b.is_static && a.position.distance(b.position) > a.radius + b.radius + 0.1 {
                    continue;
                }
                if self.joined_without_collision(a.key, b.key) {
                    continue;
                }
                for (shape_a, filter_a, material_a) in &a.fixtures {
                    for (shape_b, filter_b, material_b) in &b.fixtures {
                        if !filter_a.collides_with(filter_b) {
                            continue;
                        }
                        if let Some(manifold) = collide(shape_a, shape_b) {
                            let combined = material_a.combine(material_b);
                            found.push(SolverContact {
                                record: ContactRecord {
                                    body_a: a.key,
                                    body_b: b.key,
                                    manifold,
                                },
                                friction: combined.friction,
                                bounce_velocity: 0.0,
                                normal_impulse: 0.0,
                                tangent_impulse: 0.0,
                            });
                        }
                    }
                }
            }
        }
        found
    }

    fn motions(&self, a: BodyKey, b: BodyKey) -> Option<(Motion, Motion)> {
        Some((Motion::of(self.bodies.get(a)?), Motion::of(self.bodies.get(b)?)))
    }

    fn store(&mut self, a: BodyKey, ma: &Motion, b: BodyKey, mb: &Motion) {
        if let Some(body) = self.bodies.get_mut(a) {
            ma.store(body);
        }
        if let Some(body) = self.bodies.get_mut(b) {
            mb.store(body);
        }
    }

    fn prepare_restitution(&self, contacts: &mut [SolverContact]) {
        for contact in contacts.iter_mut() {
            let record = &contact.record;
            let (Some(a), Some(b)) = (self.bodies.get(record.body_a), self.bodies.get(record.body_b)) else {
                continue;
            };
            let restitution = a
                .fixtures
                .iter()
                .chain(b.fixtures.iter())
                .map(|f| f.material.restitution)
                .fold(0.0, f32::max);
            let point = record.manifold.point;
            let closing = record.manifold.normal.dot(b.velocity_at(point) - a.velocity_at(point));
            if closing < -RESTITUTION_THRESHOLD {
                contact.bounce_velocity = -restitution * closing;
            }
        }
    }

    fn solve_contact(&mut self, contact: &mut SolverContact, dt: f32) {
        let record = contact.record;
        let Some((mut a, mut b)) = self.motions(record.body_a, record.body_b) else {
            return;
        };
        let normal = record.manifold.normal;
        let tangent = normal.perp();
        let ra = record.manifold.point - a.position;
        let rb = record.manifold.point - b.position;

        // Friction, bounded by the normal impulse so far
        let rta = ra.cross(tangent);
        let rtb = rb.cross(tangent);
        let kt = a.inv_mass + b.inv_mass + a.inv_inertia * rta * rta + b.inv_inertia * rtb * rtb;
        if kt > 0.0 {
            let vt = tangent.dot(b.velocity_at(rb) - a.velocity_at(ra));
            let max_friction = contact.friction * contact.normal_impulse;
            let previous = contact.tangent_impulse;
            contact.tangent_impulse = (previous - vt / kt).clamp(-max_friction, max_friction);
            let impulse = tangent * (contact.tangent_impulse - previous);
            a.apply_impulse(-impulse, ra);
            b.apply_impulse(impulse, rb);
        }

        // Normal: separated shapes may still approach up to the gap
        let rna = ra.cross(normal);
        let rnb = rb.cross(normal);
        let kn = a.inv_mass + b.inv_mass + a.inv_inertia * rna * rna + b.inv_inertia * rnb * rnb;
        if kn > 0.0 {
            let vn = normal.dot(b.velocity_at(rb) - a.velocity_at(ra));
            let gap = (-record.manifold.penetration).max(0.0) / dt;
            let previous = contact.normal_impulse;
            contact.normal_impulse = (previous - (vn + gap - contact.bounce_velocity) / kn).max(0.0);
            let impulse = normal * (contact.normal_impulse - previous);
            a.apply_impulse(-impulse, ra);
            b.apply_impulse(impulse, rb);
        }

        self.store(record.body_a, &a, record.body_b, &b);
    }

    fn correct_penetration(&mut self, contact: &SolverContact) {
        let record = contact.record;
        let depth = record.manifold.penetration - LINEAR_SLOP;
        if depth <= 0.0 {
            return;
        }
        let Some((a, b)) = self.motions(record.body_a, record.body_b) else {
            return;
        };
        let total = a.inv_mass + b.inv_mass;
        if total <= 0.0 {
            return;
        }
        // Split the correction by inverse mass
        let correction = record.manifold.normal * (depth * CORRECTION_PERCENT / total);
        if let Some(body) = self.bodies.get_mut(record.body_a) {
            body.apply_correction(-correction * a.inv_mass);
        }
        if let Some(body) = self.bodies.get_mut(record.body_b) {
            body.apply_correction(correction * b.inv_mass);
        }
    }
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld for SandboxWorld {
    fn create_body(&mut self, desc: BodyDesc) -> BodyKey {
        self.bodies.insert(RigidBody2D::new(desc))
    }

    fn create_fixture(&mut self, body: BodyKey, fixture: FixtureDesc) -> bool {
        match self.bodies.get_mut(body) {
            Some(b) => {
                b.add_fixture(fixture);
                true
            }
            None => false,
        }
    }

    fn destroy_body(&mut self, body: BodyKey) -> bool {
        if self.bodies.remove(body).is_none() {
            return false;
        }
        let attached: Vec<JointKey> = self
            .joints
            .iter()
            .filter(|(_, j)| j.involves(body))
            .map(|(k, _)| k)
            .collect();
        for key in &attached {
            self.joints.remove(*key);
        }
        self.contacts
            .retain(|c| c.body_a != body && c.body_b != body);
        log::trace!("Destroyed body {:?} and {} joint(s)", body, attached.len());
        true
    }

    fn create_joint(&mut self, desc: JointDesc) -> Option<JointKey> {
        if desc.body_a == desc.body_b {
            return None;
        }
        let a = self.bodies.get(desc.body_a)?;
        let b = self.bodies.get(desc.body_b)?;
        let joint = Joint::new(&desc, a, b);
        Some(self.joints.insert(joint))
    }

    fn destroy_joint(&mut self, joint: JointKey) -> bool {
        self.joints.remove(joint).is_some()
    }

    fn contains_body(&self, body: BodyKey) -> bool {
        self.bodies.contains_key(body)
    }

    fn contains_joint(&self, joint: JointKey) -> bool {
        self.joints.contains_key(joint)
    }

    fn position(&self, body: BodyKey) -> Option<Vec2> {
        self.bodies.get(body).map(|b| b.position)
    }

    fn angle(&self, body: BodyKey) -> Option<f32> {
        self.bodies.get(body).map(|b| b.angle)
    }

    fn linear_velocity(&self, body: BodyKey) -> Option<Vec2> {
        self.bodies.get(body).map(|b| b.linear_velocity)
    }

    fn angular_velocity(&self, body: BodyKey) -> Option<f32> {
        self.bodies.get(body).map(|b| b.angular_velocity)
    }

    fn joint_angle(&self, joint: JointKey) -> Option<f32> {
        let joint = self.joints.get(joint)?;
        let a = self.bodies.get(joint.body_a)?;
        let b = self.bodies.get(joint.body_b)?;
        Some(joint.angle(a, b))
    }

    fn touching_contacts(&self, body: BodyKey) -> Vec<ContactObservation> {
        self.contacts.iter().filter_map(|c| c.observe(body)).collect()
    }

    fn apply_torque(&mut self, body: BodyKey, torque: f32) {
        if let Some(b) = self.bodies.get_mut(body) {
            if !b.is_static() {
                b.torque += torque;
            }
        }
    }

    fn apply_force_to_center(&mut self, body: BodyKey, force: Vec2) {
        if let Some(b) = self.bodies.get_mut(body) {
            let center = b.position;
            b.apply_force_at(force, center);
        }
    }

    fn apply_force(&mut self, body: BodyKey, force: Vec2, point: Vec2) {
        if let Some(b) = self.bodies.get_mut(body) {
            b.apply_force_at(force, point);
        }
    }

    fn apply_linear_impulse(&mut self, body: BodyKey, impulse: Vec2, point: Vec2) {
        if let Some(b) = self.bodies.get_mut(body) {
            b.apply_impulse_at(impulse, point);
        }
    }

    fn apply_angular_impulse(&mut self, body: BodyKey, impulse: f32) {
        if let Some(b) = self.bodies.get_mut(body) {
            if !b.is_static() {
                b.angular_velocity += b.inv_inertia() * impulse;
            }
        }
    }

    fn set_linear_velocity(&mut self, body: BodyKey, velocity: Vec2) {
        if let Some(b) = self.bodies.get_mut(body) {
            if !b.is_static() {
                b.linear_velocity = velocity;
            }
        }
    }

    fn set_angular_velocity(&mut self, body: BodyKey, velocity: f32) {
        if let Some(b) = self.bodies.get_mut(body) {
            if !b.is_static() {
                b.angular_velocity = velocity;
            }
        }
    }

    fn set_motor(&mut self, joint: JointKey, enabled: bool, speed: f32) -> bool {
        self.joints
            .get_mut(joint)
            .map_or(false, |j| j.set_motor(enabled, speed))
    }

    /// Step the physics simulation forward by dt seconds
    ///
    /// This performs:
    /// 1. Gravity and accumulated forces integrated into velocity
    /// 2. Contact detection against the current poses
    /// 3. Velocity iterations over joints, then contacts
    /// 4. Velocity integrated into pose
    /// 5. Position iterations: penetration and joint drift correction
    fn step(&mut self, dt: f32, iterations: SolverIterations) {
        if dt <= 0.0 {
            return;
        }

        // Phase 1: forces
        let gravity = Vec2::new(0.0, self.config.gravity);
        for (_key, body) in &mut self.bodies {
            if !body.is_static() {
                let inv_mass = body.inv_mass();
                let inv_inertia = body.inv_inertia();
                body.linear_velocity += (gravity + body.force * inv_mass) * dt;
                body.angular_velocity += body.torque * inv_inertia * dt;
            }
            body.force = Vec2::ZERO;
            body.torque = 0.0;
        }

        // Phase 2: contacts
        let mut contacts = self.find_contacts();
        self.prepare_restitution(&mut contacts);

        // Phase 3: velocity solve
        let joint_keys: Vec<JointKey> = self.joints.keys().collect();
        for joint in self.joints.values_mut() {
            joint.begin_step();
        }
        for _ in 0..iterations.velocity {
            for &key in &joint_keys {
                let Some(joint) = self.joints.get(key) else { continue };
                let (ka, kb) = (joint.body_a, joint.body_b);
                let Some((mut a, mut b)) = self.motions(ka, kb) else { continue };
                if let Some(joint) = self.joints.get_mut(key) {
                    joint.solve_velocity(&mut a, &mut b, dt);
                }
                self.store(ka, &a, kb, &b);
            }
            for contact in contacts.iter_mut() {
                self.solve_contact(contact, dt);
            }
        }

        // Phase 4: integrate pose
        for (_key, body) in &mut self.bodies {
            if !body.is_static() {
                body.position += body.linear_velocity * dt;
                body.angle += body.angular_velocity * dt;
            }
        }

        // Phase 5: position solve
        for contact in &contacts {
            self.correct_penetration(contact);
        }
        for _ in 0..iterations.position {
            for &key in &joint_keys {
                let Some(joint) = self.joints.get(key) else { continue };
                let (ka, kb) = (joint.body_a, joint.body_b);
                let Some((mut a, mut b)) = self.motions(ka, kb) else { continue };
                joint.solve_position(&mut a, &mut b);
                self.store(ka, &a, kb, &b);
            }
        }

        self.contacts = contacts.into_iter().map(|c| c.record).collect();
        log::trace!(
            "Stepped {} bodies, {} joints, {} contacts",
            self.bodies.len(),
            self.joints.len(),
            self.contacts.len()
        );
    }

    fn snapshot(&self) -> Vec<BodySnapshot> {
        self.bodies
            .iter()
            .map(|(key, body)| BodySnapshot {
                key,
                body_type: body.body_type,
                position: body.position,
                angle: body.angle,
                shapes: body.fixtures.iter().map(|f| f.shape.clone()).collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionFilter;
    use crate::contact::ContactSide;
    use crate::joint::JointKind;

    const DT: f32 = 1.0 / 60.0;
    const EPSILON: f32 = 0.0001;

    fn world_with_ground(gravity: f32) -> (SandboxWorld, BodyKey) {
        let mut world = SandboxWorld::with_config(PhysicsConfig::new(gravity));
        let ground = world.create_body(BodyDesc::fixed(Vec2::ZERO));
        world.create_fixture(
            ground,
            FixtureDesc::new(Shape::edge(Vec2::new(-50.0, 0.0), Vec2::new(50.0, 0.0))),
        );
        (world, ground)
    }

    fn ball(world: &mut SandboxWorld, position: Vec2) -> BodyKey {
        let key = world.create_body(BodyDesc::dynamic(position));
        world.create_fixture(key, FixtureDesc::new(Shape::circle(0.5)));
        key
    }

    fn run(world: &mut SandboxWorld, ticks: usize) {
        for _ in 0..ticks {
            world.step(DT, SolverIterations::default());
        }
    }

    #[test]
    fn test_physics_config_default() {
        let config = PhysicsConfig::default();
        assert!((config.gravity + 29.4).abs() < EPSILON);
    }

    #[test]
    fn test_solver_iterations_default() {
        let iterations = SolverIterations::default();
        assert_eq!(iterations.velocity, 8);
        assert_eq!(iterations.position, 3);
    }

    #[test]
    fn test_gravity_accelerates_dynamic_body() {
        let mut world = SandboxWorld::with_config(PhysicsConfig::new(-10.0));
        let key = ball(&mut world, Vec2::new(0.0, 10.0));
        world.step(0.1, SolverIterations::default());
        let velocity = world.linear_velocity(key).unwrap();
        assert!((velocity.y + 1.0).abs() < EPSILON);
        assert!(world.position(key).unwrap().y < 10.0);
    }

    #[test]
    fn test_static_body_does_not_move() {
        let (mut world, ground) = world_with_ground(-10.0);
        world.apply_linear_impulse(ground, Vec2::new(0.0, 50.0), Vec2::ZERO);
        world.set_linear_velocity(ground, Vec2::X);
        run(&mut world, 10);
        assert_eq!(world.position(ground), Some(Vec2::ZERO));
    }

    #[test]
    fn test_stale_key_is_inert() {
        let mut world = SandboxWorld::new();
        let key = ball(&mut world, Vec2::ZERO);
        assert!(world.destroy_body(key));
        assert!(!world.destroy_body(key));
        assert!(!world.contains_body(key));
        assert_eq!(world.position(key), None);
        assert_eq!(world.angle(key), None);

        // Writes are ignored rather than panicking
        world.apply_torque(key, 1.0);
        world.set_linear_velocity(key, Vec2::X);
        assert!(!world.create_fixture(key, FixtureDesc::new(Shape::circle(1.0))));

        // A new body in the same slot is not reachable through the old key
        let fresh = ball(&mut world, Vec2::X);
        assert_ne!(fresh, key);
        assert_eq!(world.position(key), None);
    }

    #[test]
    fn test_ball_comes_to_rest_on_ground() {
        let (mut world, ground) = world_with_ground(-29.4);
        let key = ball(&mut world, Vec2::new(0.0, 2.0));
        run(&mut world, 180);

        let position = world.position(key).unwrap();
        assert!((position.y - 0.5).abs() < 0.05, "ball at {:?}", position);
        assert!(world.linear_velocity(key).unwrap().length() < 0.5);

        let contacts = world.touching_contacts(key);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].other, ground);
        // The ground was created first, so the ball is side B
        assert_eq!(contacts[0].side, ContactSide::B);
        assert!((contacts[0].normal - Vec2::Y).length() < 0.01);
        assert!((contacts[0].outward_normal() + Vec2::Y).length() < 0.01);

        let from_ground = world.touching_contacts(ground);
        assert_eq!(from_ground[0].side, ContactSide::A);
    }

    #[test]
    fn test_no_contacts_in_free_fall() {
        let (mut world, _) = world_with_ground(-10.0);
        let key = ball(&mut world, Vec2::new(0.0, 20.0));
        run(&mut world, 5);
        assert!(world.touching_contacts(key).is_empty());
    }

    #[test]
    fn test_same_negative_group_does_not_collide() {
        let mut world = SandboxWorld::with_config(PhysicsConfig::new(0.0));
        let filter = CollisionFilter::character(-1);
        let a = world.create_body(BodyDesc::dynamic(Vec2::ZERO));
        world.create_fixture(a, FixtureDesc::new(Shape::circle(0.5)).with_filter(filter));
        let b = world.create_body(BodyDesc::dynamic(Vec2::new(0.5, 0.0)));
        world.create_fixture(b, FixtureDesc::new(Shape::circle(0.5)).with_filter(filter));
        run(&mut world, 1);
        assert!(world.touching_contacts(a).is_empty());
        assert_eq!(world.position(a), Some(Vec2::ZERO));
    }

    #[test]
    fn test_overlapping_bodies_push_apart() {
        let mut world = SandboxWorld::with_config(PhysicsConfig::new(0.0));
        let a = ball(&mut world, Vec2::ZERO);
        let b = ball(&mut world, Vec2::new(0.8, 0.0));
        run(&mut world, 10);
        let gap = world.position(b).unwrap().x - world.position(a).unwrap().x;
        assert!(gap > 0.9);
    }

    #[test]
    fn test_create_joint_requires_both_bodies() {
        let mut world = SandboxWorld::new();
        let a = ball(&mut world, Vec2::ZERO);
        let b = ball(&mut world, Vec2::X);
        world.destroy_body(b);
        assert!(world.create_joint(JointDesc::revolute(a, b, Vec2::ZERO)).is_none());
        assert!(world.create_joint(JointDesc::revolute(a, a, Vec2::ZERO)).is_none());
    }

    #[test]
    fn test_destroy_body_destroys_attached_joints() {
        let mut world = SandboxWorld::new();
        let a = ball(&mut world, Vec2::ZERO);
        let b = ball(&mut world, Vec2::X);
        let c = ball(&mut world, Vec2::new(2.0, 0.0));
        let ab = world.create_joint(JointDesc::revolute(a, b, Vec2::new(0.5, 0.0))).unwrap();
        let bc = world.create_joint(JointDesc::revolute(b, c, Vec2::new(1.5, 0.0))).unwrap();
        assert_eq!(world.joint_count(), 2);

        world.destroy_body(b);
        assert!(!world.contains_joint(ab));
        assert!(!world.contains_joint(bc));
        assert_eq!(world.joint_angle(ab), None);
        assert!(world.contains_body(a) && world.contains_body(c));
    }

    #[test]
    fn test_joint_angle_tracks_relative_rotation() {
        let mut world = SandboxWorld::with_config(PhysicsConfig::new(0.0));
        let a = ball(&mut world, Vec2::ZERO);
        let b = ball(&mut world, Vec2::X);
        let joint = world.create_joint(JointDesc::revolute(a, b, Vec2::new(0.5, 0.0))).unwrap();
        assert!(world.joint_angle(joint).unwrap().abs() < EPSILON);

        world.set_angular_velocity(b, 1.0);
        run(&mut world, 10);
        assert!(world.joint_angle(joint).unwrap() > 0.0);
    }

    #[test]
    fn test_revolute_joint_holds_anchor() {
        let mut world = SandboxWorld::with_config(PhysicsConfig::new(-10.0));
        let pivot = world.create_body(BodyDesc::fixed(Vec2::ZERO));
        let bob = world.create_body(BodyDesc::dynamic(Vec2::new(1.0, 0.0)));
        world.create_fixture(bob, FixtureDesc::new(Shape::rect(0.5, 0.1)));
        world.create_joint(JointDesc::revolute(pivot, bob, Vec2::ZERO)).unwrap();
        run(&mut world, 60);
        // The bob swings but stays about a unit from the pivot
        let distance = world.position(bob).unwrap().length();
        assert!((distance - 1.0).abs() < 0.1, "distance {}", distance);
    }

    #[test]
    fn test_distance_joint_pulls_bodies_together() {
        let mut world = SandboxWorld::with_config(PhysicsConfig::new(0.0));
        let a = ball(&mut world, Vec2::ZERO);
        let b = ball(&mut world, Vec2::new(3.0, 0.0));
        let desc = JointDesc::distance(a, b, Vec2::ZERO, Vec2::new(3.0, 0.0), 0.5, 10.0, 0.9);
        assert!(matches!(desc.kind, JointKind::Distance { .. }));
        world.create_joint(desc).unwrap();
        run(&mut world, 60);
        let distance = world.position(a).unwrap().distance(world.position(b).unwrap());
        assert!(distance < 1.5, "distance {}", distance);
    }

    #[test]
    fn test_set_motor() {
        let mut world = SandboxWorld::new();
        let a = ball(&mut world, Vec2::ZERO);
        let b = ball(&mut world, Vec2::new(0.0, -1.0));
        let wheel = world
            .create_joint(JointDesc::wheel(a, b, Vec2::new(0.0, -1.0), Vec2::Y, Default::default(), 4.0, 1.0))
            .unwrap();
        let pin = world.create_joint(JointDesc::revolute(a, b, Vec2::ZERO)).unwrap();
        assert!(world.set_motor(wheel, true, 400.0));
        assert!(!world.set_motor(pin, true, 400.0));
        world.destroy_joint(wheel);
        assert!(!world.set_motor(wheel, false, 0.0));
    }

    #[test]
    fn test_forces_cleared_after_step() {
        let mut world = SandboxWorld::with_config(PhysicsConfig::new(0.0));
        let key = ball(&mut world, Vec2::ZERO);
        let mass = world.body(key).unwrap().mass();
        world.apply_force_to_center(key, Vec2::new(60.0, 0.0));
        world.step(DT, SolverIterations::default());
        let after_first = world.linear_velocity(key).unwrap().x;
        assert!((after_first - 60.0 / mass * DT).abs() < EPSILON);
        world.step(DT, SolverIterations::default());
        assert!((world.linear_velocity(key).unwrap().x - after_first).abs() < EPSILON);
    }

    #[test]
    fn test_angular_impulse_uses_inertia() {
        let mut world = SandboxWorld::new();
        let key = ball(&mut world, Vec2::ZERO);
        let inertia = world.body(key).unwrap().inertia();
        world.apply_angular_impulse(key, 2.0);
        assert!((world.angular_velocity(key).unwrap() - 2.0 / inertia).abs() < EPSILON);
    }

    #[test]
    fn test_snapshot_lists_every_body() {
        let (mut world, ground) = world_with_ground(-10.0);
        let key = ball(&mut world, Vec2::new(1.0, 1.0));
        let snapshot = world.snapshot();
        assert_eq!(snapshot.len(), 2);
        let ball_view = snapshot.iter().find(|s| s.key == key).unwrap();
        assert_eq!(ball_view.shapes, vec![Shape::circle(0.5)]);
        assert!(snapshot.iter().any(|s| s.key == ground && s.body_type == BodyType::Static));
    }
}
