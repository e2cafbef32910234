//! Gait oscillator and walk drive

use ragdoll_math::Vec2;
use ragdoll_physics::PhysicsWorld;
use serde::{Deserialize, Serialize};

use crate::rig::{Pair, RagdollRig, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitConfig {
    /// Ticks per radian of gait phase
    pub phase_divisor: f32,
    /// Hip swing while walking (radians)
    pub amplitude: f32,
    /// Hip offset while standing (radians)
    pub rest_offset: f32,
    /// Knee bend while standing (radians, mirrored per side)
    pub rest_knee: f32,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            phase_divisor: 5.0,
            amplitude: 0.4,
            rest_offset: 0.2,
            rest_knee: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Force on each thigh; the torso gets half
    pub walk_force: f32,
    /// No drive once the torso moves this fast in the walk direction
    pub max_walk_speed: f32,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            walk_force: 7.0,
            max_walk_speed: 20.0,
        }
    }
}

/// Gait signal for the given tick
pub fn gait_signal(tick: u64, walking: bool, config: &GaitConfig) -> f32 {
    if walking {
        (tick as f32 / config.phase_divisor).cos() * config.amplitude
    } else {
        config.rest_offset
    }
}

/// Target joint angles for both legs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseTargets {
    pub hips: Pair<f32>,
    pub knees: Pair<f32>,
}

/// Hips swing in opposition by the gait signal; knees are straight while
/// walking and slightly bent (mirrored) at rest
pub fn pose_targets(gait: f32, walking: bool, config: &GaitConfig) -> PoseTargets {
    let knee = if walking { 0.0 } else { config.rest_knee };
    PoseTargets {
        hips: Pair::new(-gait, gait),
        knees: Pair::new(knee, -knee),
    }
}

/// Push the torso and thighs along the walk direction
///
/// Does nothing while limp. Each direction is driven only while the torso
/// is slower than `max_walk_speed` that way.
pub fn apply_walk_drive<W: PhysicsWorld>(
    world: &mut W,
    rig: &RagdollRig,
    left: bool,
    right: bool,
    standing_power: f32,
    config: &WalkConfig,
) {
    if standing_power == 0.0 {
        return;
    }
    let Some(velocity) = world.linear_velocity(rig.torso) else {
        return;
    };
    if left && velocity.x > -config.max_walk_speed {
        push(world, rig, -1.0, config.walk_force);
    }
    if right && velocity.x < config.max_walk_speed {
        push(world, rig, 1.0, config.walk_force);
    }
}

fn push<W: PhysicsWorld>(world: &mut W, rig: &RagdollRig, direction: f32, force: f32) {
    world.apply_force_to_center(rig.torso, Vec2::new(direction * force / 2.0, 0.0));
    for side in Side::BOTH {
        world.apply_force_to_center(rig.thighs[side], Vec2::new(direction * force, 0.0));
    }
}
