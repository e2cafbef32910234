//! The ragdoll character
//!
//! Owns a [`RagdollRig`] and its [`CharacterControlState`], and runs the
//! controllers over them once per tick in a fixed order: contact sensor,
//! walking flag, balance, walk drive, jump, grab, slump.

use ragdoll_input::{Action, ActionSet, BindingTable, KeySnapshot};
use ragdoll_math::Vec2;
use ragdoll_physics::PhysicsWorld;
use serde::{Deserialize, Serialize};

use crate::balance::{self, BalanceConfig};
use crate::contact_sensor;
use crate::context::SimulationContext;
use crate::grab::{self, GrabConfig, GrabHold};
use crate::jump::{self, JumpConfig};
use crate::locomotion::{self, GaitConfig, WalkConfig};
use crate::rig::RagdollRig;

/// Tuning for one ragdoll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Offset of the whole rig from its default spot
    pub spawn: Vec2,
    /// Balance gain when not slumped or carrying something heavy
    pub standing_power: f32,
    pub balance: BalanceConfig,
    pub gait: GaitConfig,
    pub walk: WalkConfig,
    pub jump: JumpConfig,
    pub grab: GrabConfig,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            spawn: Vec2::ZERO,
            standing_power: 20.0,
            balance: BalanceConfig::default(),
            gait: GaitConfig::default(),
            walk: WalkConfig::default(),
            jump: JumpConfig::default(),
            grab: GrabConfig::default(),
        }
    }
}

/// Controller state that persists across ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterControlState {
    /// Unit vector from the character into what it last stood on
    pub ground_normal: Vec2,
    pub can_jump: bool,
    /// Ticks until another jump is allowed
    pub jump_cooldown: u32,
    pub walking: bool,
    pub standing_power: f32,
    pub grab_constraint: Option<GrabHold>,
    pub slumped: bool,
}

impl CharacterControlState {
    pub fn new(standing_power: f32) -> Self {
        Self {
            ground_normal: Vec2::Y,
            can_jump: false,
            jump_cooldown: 0,
            walking: false,
            standing_power,
            grab_constraint: None,
            slumped: false,
        }
    }

    /// Holding something that is not a weapon
    pub fn carrying(&self) -> bool {
        self.grab_constraint.is_some_and(|hold| !hold.is_weapon)
    }
}

impl Default for CharacterControlState {
    fn default() -> Self {
        Self::new(CharacterConfig::default().standing_power)
    }
}

/// A player-controlled ragdoll
pub struct Character {
    rig: RagdollRig,
    state: CharacterControlState,
    bindings: BindingTable,
    config: CharacterConfig,
    group: i32,
    previous: ActionSet,
}

impl Character {
    /// Build the ragdoll in the context's world
    pub fn spawn<W: PhysicsWorld>(
        ctx: &mut SimulationContext<W>,
        config: CharacterConfig,
        bindings: BindingTable,
    ) -> Option<Self> {
        let group = ctx.allocate_group();
        let rig = RagdollRig::build(&mut ctx.world, config.spawn, group)?;
        log::info!("Spawned character at ({:.1}, {:.1})", config.spawn.x, config.spawn.y);
        Some(Self {
            rig,
            state: CharacterControlState::new(config.standing_power),
            bindings,
            config,
            group,
            previous: ActionSet::empty(),
        })
    }

    pub fn rig(&self) -> &RagdollRig {
        &self.rig
    }

    pub fn state(&self) -> &CharacterControlState {
        &self.state
    }

    pub fn config(&self) -> &CharacterConfig {
        &self.config
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Resolve this frame's keys through the character's bindings and tick
    pub fn tick<W: PhysicsWorld>(&mut self, ctx: &mut SimulationContext<W>, keys: &KeySnapshot) {
        let actions = self.bindings.resolve(keys);
        self.tick_actions(ctx, actions);
    }

    /// Run every controller for one tick
    pub fn tick_actions<W: PhysicsWorld>(&mut self, ctx: &mut SimulationContext<W>, actions: ActionSet) {
        let pressed = actions - self.previous;
        self.previous = actions;
        if pressed.held(Action::Reset) {
            self.reset(ctx);
            return;
        }

        let world = &mut ctx.world;
        let config = &self.config;
        let state = &mut self.state;

        contact_sensor::sense_ground(world, &self.rig.bodies(), state);

        let left = actions.held(Action::Left);
        let right = actions.held(Action::Right);
        state.walking = (left || right) && state.can_jump;

        let gait = locomotion::gait_signal(ctx.tick, state.walking, &config.gait);
        let pose = locomotion::pose_targets(gait, state.walking, &config.gait);
        balance::apply_balance(world, &self.rig, state.standing_power, &pose, &config.balance);

        locomotion::apply_walk_drive(world, &self.rig, left, right, state.standing_power, &config.walk);

        if let Some(velocity) = jump::update_jump(state, actions.held(Action::Jump), &config.jump) {
            world.set_linear_velocity(self.rig.torso, velocity);
        }

        grab::update_grab(
            world,
            &ctx.grabbables,
            &self.rig,
            state,
            actions.held(Action::Pick),
            config.standing_power,
            &config.grab,
        );

        if actions.held(Action::Slump) {
            state.standing_power = 0.0;
            state.slumped = true;
        } else if state.slumped {
            state.slumped = false;
            if !state.carrying() {
                state.standing_power = config.standing_power;
            }
        }
    }

    /// Tear the ragdoll down and build a fresh one with default state
    ///
    /// Destroying the bodies also destroys every joint on them, including
    /// an active grab.
    pub fn reset<W: PhysicsWorld>(&mut self, ctx: &mut SimulationContext<W>) -> bool {
        self.rig.destroy(&mut ctx.world);
        self.state = CharacterControlState::new(self.config.standing_power);
        match RagdollRig::build(&mut ctx.world, self.config.spawn, self.group) {
            Some(rig) => {
                self.rig = rig;
                log::info!("Character reset");
                true
            }
            None => {
                log::warn!("Character rebuild failed");
                false
            }
        }
    }
}
