//! Grabbing nearby bodies
//!
//! While the grab input is held the character looks for the nearest
//! registered body within reach of its torso and ties its right hand to
//! it with a spring-damped distance joint. Holding anything that is not a
//! weapon takes all the character's balance: `standing_power` drops to
//! zero until the grab is released.

use ragdoll_math::Vec2;
use ragdoll_physics::{BodyKey, JointDesc, JointKey, PhysicsWorld};
use serde::{Deserialize, Serialize};

use crate::character::CharacterControlState;
use crate::rig::RagdollRig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabConfig {
    /// Targets must be strictly closer than this to the torso
    pub range: f32,
    /// How far from the hand body toward the target the grip sits
    pub reach: f32,
    pub length: f32,
    pub frequency_hz: f32,
    pub damping_ratio: f32,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            range: 4.0,
            reach: 0.5,
            length: 0.5,
            frequency_hz: 10.0,
            damping_ratio: 0.9,
        }
    }
}

/// A body that may be grabbed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grabbable {
    pub body: BodyKey,
    /// Weapons are light enough to hold while balancing
    pub is_weapon: bool,
}

/// The constraint of an active grab
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrabHold {
    pub joint: JointKey,
    pub target: BodyKey,
    pub is_weapon: bool,
}

/// Every body characters may grab
#[derive(Debug, Clone, Default)]
pub struct GrabRegistry {
    entries: Vec<Grabbable>,
}

impl GrabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, body: BodyKey, is_weapon: bool) {
        if !self.entries.iter().any(|e| e.body == body) {
            self.entries.push(Grabbable { body, is_weapon });
        }
    }

    /// Point an entry at a rebuilt body; false if `old` was not registered
    pub fn replace(&mut self, old: BodyKey, new: BodyKey) -> bool {
        match self.entries.iter_mut().find(|e| e.body == old) {
            Some(entry) => {
                entry.body = new;
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[Grabbable] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nearest live entry strictly within `range` of `origin`
    ///
    /// Bodies in `exclude` and bodies no longer in the world are skipped.
    pub fn nearest<W: PhysicsWorld>(
        &self,
        world: &W,
        origin: Vec2,
        exclude: &[BodyKey],
        range: f32,
    ) -> Option<Grabbable> {
        let mut best: Option<(Grabbable, f32)> = None;
        for entry in &self.entries {
            if exclude.contains(&entry.body) {
                continue;
            }
            let Some(position) = world.position(entry.body) else {
                continue;
            };
            let distance = position.distance(origin);
            let limit = best.map_or(range, |(_, d)| d);
            if distance < limit {
                best = Some((*entry, distance));
            }
        }
        best.map(|(entry, _)| entry)
    }
}

/// Where the grip sits: `reach` from the hand toward the target
///
/// A target exactly on the hand is treated as one unit away.
pub fn grab_anchor(hand: Vec2, target: Vec2, reach: f32) -> Vec2 {
    let direction = target - hand;
    let length = direction.length();
    let length = if length > 0.0 { length } else { 1.0 };
    hand + direction / length * reach
}

/// Run the grab state machine for one tick
pub fn update_grab<W: PhysicsWorld>(
    world: &mut W,
    registry: &GrabRegistry,
    rig: &RagdollRig,
    state: &mut CharacterControlState,
    held: bool,
    default_power: f32,
    config: &GrabConfig,
) {
    // The target (or the hand) may have been destroyed, taking the joint with it
    if let Some(hold) = state.grab_constraint {
        if !world.contains_joint(hold.joint) {
            log::debug!("Grab on {:?} lost", hold.target);
            state.grab_constraint = None;
            state.standing_power = default_power;
        }
    }

    if !held {
        if let Some(hold) = state.grab_constraint.take() {
            world.destroy_joint(hold.joint);
            state.standing_power = default_power;
            log::debug!("Released {:?}", hold.target);
        }
        return;
    }

    if state.grab_constraint.is_some() {
        return;
    }

    let Some(origin) = world.position(rig.torso) else {
        return;
    };
    let Some(target) = registry.nearest(world, origin, &rig.bodies(), config.range) else {
        return;
    };
    let (Some(hand), Some(target_position)) = (world.position(rig.hand()), world.position(target.body)) else {
        return;
    };

    let anchor = grab_anchor(hand, target_position, config.reach);
    let mut desc = JointDesc::distance(
        rig.hand(),
        target.body,
        anchor,
        target_position,
        config.length,
        config.frequency_hz,
        config.damping_ratio,
    );
    desc.collide_connected = false;

    if let Some(joint) = world.create_joint(desc) {
        state.grab_constraint = Some(GrabHold {
            joint,
            target: target.body,
            is_weapon: target.is_weapon,
        });
        if !target.is_weapon {
            state.standing_power = 0.0;
        }
        log::debug!("Grabbed {:?} (weapon: {})", target.body, target.is_weapon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragdoll_physics::{BodyDesc, FixtureDesc, SandboxWorld, Shape};

    const EPSILON: f32 = 0.0001;

    fn body_at(world: &mut SandboxWorld, position: Vec2) -> BodyKey {
        let key = world.create_body(BodyDesc::dynamic(position));
        world.create_fixture(key, FixtureDesc::new(Shape::circle(0.2)));
        key
    }

    #[test]
    fn test_anchor_toward_target() {
        let anchor = grab_anchor(Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0), 0.5);
        assert!((anchor - Vec2::new(1.3, 1.4)).length() < EPSILON);
    }

    #[test]
    fn test_anchor_on_top_of_hand() {
        let hand = Vec2::new(2.0, 2.0);
        assert_eq!(grab_anchor(hand, hand, 0.5), hand);
    }

    #[test]
    fn test_nearest_within_range() {
        let mut world = SandboxWorld::new();
        let far = body_at(&mut world, Vec2::new(3.5, 0.0));
        let near = body_at(&mut world, Vec2::new(0.0, 2.0));
        let mut registry = GrabRegistry::new();
        registry.register(far, false);
        registry.register(near, true);

        let found = registry.nearest(&world, Vec2::ZERO, &[], 4.0).unwrap();
        assert_eq!(found.body, near);
        assert!(found.is_weapon);
    }

    #[test]
    fn test_range_is_strict() {
        let mut world = SandboxWorld::new();
        let body = body_at(&mut world, Vec2::new(4.0, 0.0));
        let mut registry = GrabRegistry::new();
        registry.register(body, false);
        assert!(registry.nearest(&world, Vec2::ZERO, &[], 4.0).is_none());
        assert!(registry.nearest(&world, Vec2::new(0.1, 0.0), &[], 4.0).is_some());
    }

    #[test]
    fn test_nearest_skips_excluded_and_destroyed() {
        let mut world = SandboxWorld::new();
        let own = body_at(&mut world, Vec2::ZERO);
        let gone = body_at(&mut world, Vec2::X);
        let mut registry = GrabRegistry::new();
        registry.register(own, false);
        registry.register(gone, false);
        world.destroy_body(gone);
        assert!(registry.nearest(&world, Vec2::ZERO, &[own], 4.0).is_none());
    }

    #[test]
    fn test_registry_register_once_and_replace() {
        let mut world = SandboxWorld::new();
        let old = body_at(&mut world, Vec2::ZERO);
        let new = body_at(&mut world, Vec2::X);
        let mut registry = GrabRegistry::new();
        registry.register(old, false);
        registry.register(old, false);
        assert_eq!(registry.len(), 1);

        assert!(registry.replace(old, new));
        assert_eq!(registry.entries()[0].body, new);
        assert!(!registry.replace(old, new));
        assert_eq!(registry.len(), 1);
    }
}
