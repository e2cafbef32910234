//! Upright balance
//!
//! Proportional-derivative torques: the torso is driven toward angle zero,
//! and each hip and knee toward a target joint angle set by the gait.
//! `standing_power` is the proportional gain for both; at zero the
//! ragdoll goes limp except for damping.

use ragdoll_math::shortest_signed_angle_difference;
use ragdoll_physics::{BodyKey, JointKey, PhysicsWorld};
use serde::{Deserialize, Serialize};

use crate::locomotion::PoseTargets;
use crate::rig::{RagdollRig, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Derivative gain on torso angular velocity
    pub torso_damping: f32,
    /// Limb angular velocity is divided by this for limb damping
    pub joint_damping_divisor: f32,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            torso_damping: 5.0,
            joint_damping_divisor: 10.0,
        }
    }
}

/// Torque pulling the torso upright
pub fn torso_torque(standing_power: f32, damping: f32, angle: f32, angular_velocity: f32) -> f32 {
    standing_power * (0.0 - angle) - damping * angular_velocity
}

/// Torque moving a limb so its joint approaches `target`
pub fn joint_torque(
    standing_power: f32,
    target: f32,
    joint_angle: f32,
    angular_velocity: f32,
    damping_divisor: f32,
) -> f32 {
    standing_power * shortest_signed_angle_difference(target, joint_angle)
        - angular_velocity / damping_divisor
}

/// Apply torso, hip, and knee torques for one tick
pub fn apply_balance<W: PhysicsWorld>(
    world: &mut W,
    rig: &RagdollRig,
    standing_power: f32,
    pose: &PoseTargets,
    config: &BalanceConfig,
) {
    if let (Some(angle), Some(omega)) = (world.angle(rig.torso), world.angular_velocity(rig.torso)) {
        let torque = torso_torque(standing_power, config.torso_damping, angle, omega);
        world.apply_torque(rig.torso, torque);
    }

    for side in Side::BOTH {
        drive_joint(world, rig.hips[side], rig.thighs[side], pose.hips[side], standing_power, config);
        drive_joint(world, rig.knees[side], rig.calves[side], pose.knees[side], standing_power, config);
    }
}

fn drive_joint<W: PhysicsWorld>(
    world: &mut W,
    joint: JointKey,
    limb: BodyKey,
    target: f32,
    standing_power: f32,
    config: &BalanceConfig,
) {
    let (Some(angle), Some(omega)) = (world.joint_angle(joint), world.angular_velocity(limb)) else {
        return;
    };
    let torque = joint_torque(standing_power, target, angle, omega, config.joint_damping_divisor);
    world.apply_torque(limb, torque);
}
