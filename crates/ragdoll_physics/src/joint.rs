//! Joints between two rigid bodies
//!
//! All joints are solved on velocities with a Baumgarte bias. Spring-like
//! joints (the wheel suspension and distance joints) use the soft
//! constraint formulation: a frequency and damping ratio set how stiff the
//! spring is, and a frequency of zero makes the constraint rigid.

use crate::body::{BodyKey, Motion, RigidBody2D};
use ragdoll_math::Vec2;
use slotmap::new_key_type;
use std::f32::consts::TAU;

new_key_type! {
    /// Key to a joint in the physics world
    pub struct JointKey;
}

/// Position drift removed per step
const BAUMGARTE: f32 = 0.2;

/// Drive settings for a wheel joint
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotorSettings {
    pub enabled: bool,
    /// Target relative angular speed (radians per second)
    pub speed: f32,
    pub max_torque: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JointKind {
    /// Pins the anchors together; optional (lower, upper) angle limits
    Revolute { limits: Option<(f32, f32)> },
    /// Lets body B slide along `axis` (world space at creation) on a spring
    Wheel {
        axis: Vec2,
        motor: MotorSettings,
        frequency_hz: f32,
        damping_ratio: f32,
    },
    /// Keeps the anchors `length` apart
    Distance {
        length: f32,
        frequency_hz: f32,
        damping_ratio: f32,
    },
}

/// Everything needed to create a joint; anchors are in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointDesc {
    pub body_a: BodyKey,
    pub body_b: BodyKey,
    pub anchor_a: Vec2,
    pub anchor_b: Vec2,
    pub kind: JointKind,
    pub collide_connected: bool,
}

impl JointDesc {
    /// Revolute joint around a single world point
    pub fn revolute(body_a: BodyKey, body_b: BodyKey, anchor: Vec2) -> Self {
        Self {
            body_a,
            body_b,
            anchor_a: anchor,
            anchor_b: anchor,
            kind: JointKind::Revolute { limits: None },
            collide_connected: false,
        }
    }

    /// Add angle limits to a revolute joint (no effect on other kinds)
    pub fn with_limits(mut self, lower: f32, upper: f32) -> Self {
        if let JointKind::Revolute { limits } = &mut self.kind {
            *limits = Some((lower.min(upper), lower.max(upper)));
        }
        self
    }

    /// Wheel joint with the wheel (body B) centered at `anchor`
    pub fn wheel(
        chassis: BodyKey,
        wheel: BodyKey,
        anchor: Vec2,
        axis: Vec2,
        motor: MotorSettings,
        frequency_hz: f32,
        damping_ratio: f32,
    ) -> Self {
        Self {
            body_a: chassis,
            body_b: wheel,
            anchor_a: anchor,
            anchor_b: anchor,
            kind: JointKind::Wheel {
                axis: axis.normalized_or(Vec2::Y),
                motor,
                frequency_hz,
                damping_ratio,
            },
            collide_connected: false,
        }
    }

    /// Distance joint between two world anchors
    pub fn distance(
        body_a: BodyKey,
        body_b: BodyKey,
        anchor_a: Vec2,
        anchor_b: Vec2,
        length: f32,
        frequency_hz: f32,
        damping_ratio: f32,
    ) -> Self {
        Self {
            body_a,
            body_b,
            anchor_a,
            anchor_b,
            kind: JointKind::Distance {
                length: length.max(0.0),
                frequency_hz,
                damping_ratio,
            },
            collide_connected: true,
        }
    }
}

/// A joint owned by [`crate::SandboxWorld`]
#[derive(Clone, Debug)]
pub struct Joint {
    pub body_a: BodyKey,
    pub body_b: BodyKey,
    pub kind: JointKind,
    pub collide_connected: bool,
    local_anchor_a: Vec2,
    local_anchor_b: Vec2,
    /// Axis in body A's frame (wheel joints only)
    local_axis: Vec2,
    reference_angle: f32,
    // Impulses accumulated over the current step's iterations
    spring_impulse: f32,
    motor_impulse: f32,
}

impl Joint {
    pub(crate) fn new(desc: &JointDesc, a: &RigidBody2D, b: &RigidBody2D) -> Self {
        let local_axis = match desc.kind {
            JointKind::Wheel { axis, .. } => axis.rotated(-a.angle),
            _ => Vec2::Y,
        };
        Self {
            body_a: desc.body_a,
            body_b: desc.body_b,
            kind: desc.kind,
            collide_connected: desc.collide_connected,
            local_anchor_a: a.local_point(desc.anchor_a),
            local_anchor_b: b.local_point(desc.anchor_b),
            local_axis,
            reference_angle: b.angle - a.angle,
            spring_impulse: 0.0,
            motor_impulse: 0.0,
        }
    }

    /// Relative angle of B to A since the joint was created
    pub fn angle(&self, a: &RigidBody2D, b: &RigidBody2D) -> f32 {
        b.angle - a.angle - self.reference_angle
    }

    /// Does this joint connect the two bodies (in either order)
    pub fn connects(&self, x: BodyKey, y: BodyKey) -> bool {
        (self.body_a == x && self.body_b == y) || (self.body_a == y && self.body_b == x)
    }

    pub fn involves(&self, body: BodyKey) -> bool {
        self.body_a == body || self.body_b == body
    }

    /// Enable or retarget the motor; only wheel joints have one
    pub(crate) fn set_motor(&mut self, enabled: bool, speed: f32) -> bool {
        match &mut self.kind {
            JointKind::Wheel { motor, .. } => {
                motor.enabled = enabled;
                motor.speed = speed;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn begin_step(&mut self) {
        self.spring_impulse = 0.0;
        self.motor_impulse = 0.0;
    }

    /// One velocity iteration
    pub(crate) fn solve_velocity(&mut self, a: &mut Motion, b: &mut Motion, dt: f32) {
        let ra = self.local_anchor_a.rotated(a.angle);
        let rb = self.local_anchor_b.rotated(b.angle);
        match self.kind {
            JointKind::Revolute { limits } => {
                if let Some((lower, upper)) = limits {
                    self.solve_limits(a, b, lower, upper, dt);
                }
                solve_point(a, b, ra, rb, BAUMGARTE / dt);
            }
            JointKind::Wheel {
                motor,
                frequency_hz,
                damping_ratio,
                ..
            } => self.solve_wheel(a, b, ra, rb, motor, frequency_hz, damping_ratio, dt),
            JointKind::Distance {
                length,
                frequency_hz,
                damping_ratio,
            } => self.solve_distance(a, b, ra, rb, length, frequency_hz, damping_ratio, dt),
        }
    }

    /// Remove remaining anchor drift of pinned joints
    pub(crate) fn solve_position(&self, a: &mut Motion, b: &mut Motion) {
        if let JointKind::Revolute { .. } = self.kind {
            let ra = self.local_anchor_a.rotated(a.angle);
            let rb = self.local_anchor_b.rotated(b.angle);
            let error = (b.position + rb) - (a.position + ra);
            let Some(impulse) = point_mass(a, b, ra, rb).solve(-error) else {
                return;
            };
            a.apply_displacement(-impulse, ra);
            b.apply_displacement(impulse, rb);
        }
    }

    fn solve_limits(&self, a: &mut Motion, b: &mut Motion, lower: f32, upper: f32, dt: f32) {
        let inv_i = a.inv_inertia + b.inv_inertia;
        if inv_i <= 0.0 {
            return;
        }
        let angle = b.angle - a.angle - self.reference_angle;
        let cdot = b.angular_velocity - a.angular_velocity;
        let impulse = if angle < lower {
            (-(cdot + BAUMGARTE / dt * (angle - lower)) / inv_i).max(0.0)
        } else if angle > upper {
            (-(cdot + BAUMGARTE / dt * (angle - upper)) / inv_i).min(0.0)
        } else {
            return;
        };
        a.angular_velocity -= a.inv_inertia * impulse;
        b.angular_velocity += b.inv_inertia * impulse;
    }

    #[allow(clippy::too_many_arguments)]
    fn solve_wheel(
        &mut self,
        a: &mut Motion,
        b: &mut Motion,
        ra: Vec2,
        rb: Vec2,
        motor: MotorSettings,
        frequency_hz: f32,
        damping_ratio: f32,
        dt: f32,
    ) {
        let d = (b.position + rb) - (a.position + ra);
        let axis = self.local_axis.rotated(a.angle);
        let perp = axis.perp();

        // Motor drives the relative spin up to its torque budget
        if motor.enabled {
            let inv_i = a.inv_inertia + b.inv_inertia;
            if inv_i > 0.0 {
                let cdot = b.angular_velocity - a.angular_velocity - motor.speed;
                let max_impulse = motor.max_torque * dt;
                let previous = self.motor_impulse;
                self.motor_impulse = (previous - cdot / inv_i).clamp(-max_impulse, max_impulse);
                let impulse = self.motor_impulse - previous;
                a.angular_velocity -= a.inv_inertia * impulse;
                b.angular_velocity += b.inv_inertia * impulse;
            }
        }

        // Suspension spring along the axis
        let sa = (d + ra).cross(axis);
        let sb = rb.cross(axis);
        let inv_mass = a.inv_mass + b.inv_mass + a.inv_inertia * sa * sa + b.inv_inertia * sb * sb;
        if inv_mass > 0.0 && frequency_hz > 0.0 {
            let soft = Softness::new(1.0 / inv_mass, frequency_hz, damping_ratio, dt);
            let bias = d.dot(axis) * soft.bias_rate;
            let cdot = axis.dot(b.velocity - a.velocity) + sb * b.angular_velocity
                - sa * a.angular_velocity;
            let impulse = -(cdot + bias + soft.gamma * self.spring_impulse) / (inv_mass + soft.gamma);
            self.spring_impulse += impulse;
            apply_axial(a, b, axis, sa, sb, impulse);
        }

        // Rigid constraint across the axis
        let sa = (d + ra).cross(perp);
        let sb = rb.cross(perp);
        let inv_mass = a.inv_mass + b.inv_mass + a.inv_inertia * sa * sa + b.inv_inertia * sb * sb;
        if inv_mass > 0.0 {
            let cdot = perp.dot(b.velocity - a.velocity) + sb * b.angular_velocity
                - sa * a.angular_velocity;
            let impulse = -(cdot + BAUMGARTE / dt * d.dot(perp)) / inv_mass;
            apply_axial(a, b, perp, sa, sb, impulse);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn solve_distance(
        &mut self,
        a: &mut Motion,
        b: &mut Motion,
        ra: Vec2,
        rb: Vec2,
        length: f32,
        frequency_hz: f32,
        damping_ratio: f32,
        dt: f32,
    ) {
        let delta = (b.position + rb) - (a.position + ra);
        let current = delta.length();
        let u = delta.normalized_or(Vec2::Y);
        let cra = ra.cross(u);
        let crb = rb.cross(u);
        let inv_mass = a.inv_mass + b.inv_mass + a.inv_inertia * cra * cra + b.inv_inertia * crb * crb;
        if inv_mass <= 0.0 {
            return;
        }

        let error = current - length;
        let (bias, gamma) = if frequency_hz > 0.0 {
            let soft = Softness::new(1.0 / inv_mass, frequency_hz, damping_ratio, dt);
            (error * soft.bias_rate, soft.gamma)
        } else {
            (error * BAUMGARTE / dt, 0.0)
        };

        let cdot = u.dot(b.velocity_at(rb) - a.velocity_at(ra));
        let impulse = -(cdot + bias + gamma * self.spring_impulse) / (inv_mass + gamma);
        self.spring_impulse += impulse;
        a.apply_impulse(-u * impulse, ra);
        b.apply_impulse(u * impulse, rb);
    }
}

/// Soft constraint coefficients for a spring of the given frequency
struct Softness {
    gamma: f32,
    bias_rate: f32,
}

impl Softness {
    fn new(mass: f32, frequency_hz: f32, damping_ratio: f32, dt: f32) -> Self {
        let omega = TAU * frequency_hz;
        let damping = 2.0 * mass * damping_ratio * omega;
        let stiffness = mass * omega * omega;
        let denom = dt * (damping + dt * stiffness);
        let gamma = if denom > 0.0 { 1.0 / denom } else { 0.0 };
        Self {
            gamma,
            bias_rate: dt * stiffness * gamma,
        }
    }
}

fn apply_axial(a: &mut Motion, b: &mut Motion, axis: Vec2, sa: f32, sb: f32, impulse: f32) {
    let p = axis * impulse;
    a.velocity -= p * a.inv_mass;
    a.angular_velocity -= a.inv_inertia * sa * impulse;
    b.velocity += p * b.inv_mass;
    b.angular_velocity += b.inv_inertia * sb * impulse;
}

/// 2x2 effective mass of a point-to-point constraint
struct PointMass {
    k11: f32,
    k12: f32,
    k22: f32,
}

impl PointMass {
    /// Solve `K * x = rhs`
    fn solve(&self, rhs: Vec2) -> Option<Vec2> {
        let det = self.k11 * self.k22 - self.k12 * self.k12;
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        Some(Vec2::new(
            inv * (self.k22 * rhs.x - self.k12 * rhs.y),
            inv * (self.k11 * rhs.y - self.k12 * rhs.x),
        ))
    }
}

fn point_mass(a: &Motion, b: &Motion, ra: Vec2, rb: Vec2) -> PointMass {
    let (ma, mb, ia, ib) = (a.inv_mass, b.inv_mass, a.inv_inertia, b.inv_inertia);
    PointMass {
        k11: ma + mb + ia * ra.y * ra.y + ib * rb.y * rb.y,
        k12: -ia * ra.x * ra.y - ib * rb.x * rb.y,
        k22: ma + mb + ia * ra.x * ra.x + ib * rb.x * rb.x,
    }
}

/// Drive the relative velocity of two anchor points to zero
fn solve_point(a: &mut Motion, b: &mut Motion, ra: Vec2, rb: Vec2, bias_rate: f32) {
    let error = (b.position + rb) - (a.position + ra);
    let cdot = b.velocity_at(rb) - a.velocity_at(ra);
    let Some(impulse) = point_mass(a, b, ra, rb).solve(-(cdot + error * bias_rate)) else {
        return;
    };
    a.apply_impulse(-impulse, ra);
    b.apply_impulse(impulse, rb);
}
