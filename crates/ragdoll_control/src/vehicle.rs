//! The two-wheeled car
//!
//! A box chassis riding two wheels on spring-damped wheel joints. Drive
//! input turns both wheel motors on and nudges the chassis spin; the
//! upside-down recovery in [`crate::recovery`] runs every tick.

use ragdoll_input::{Action, ActionSet, BindingTable, KeySnapshot};
use ragdoll_math::Vec2;
use ragdoll_physics::{BodyDesc, BodyKey, CollisionFilter, FixtureDesc, JointDesc, JointKey, MotorSettings, PhysicsWorld, Shape};
use serde::{Deserialize, Serialize};

use crate::context::SimulationContext;
use crate::recovery::{self, RecoveryConfig, VehicleControlState};
use crate::rig::{Pair, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Chassis center at spawn
    pub spawn: Vec2,
    pub chassis_half_extents: Vec2,
    pub chassis_density: f32,
    pub chassis_friction: f32,
    pub chassis_restitution: f32,
    pub wheel_radius: f32,
    /// Wheel centers relative to the chassis: x is mirrored per side
    pub wheel_offset: Vec2,
    pub wheel_density: f32,
    pub wheel_friction: f32,
    pub wheel_restitution: f32,
    /// Motor speed while driving (radians per second)
    pub speed: f32,
    pub max_torque: f32,
    pub frequency_hz: f32,
    pub damping_ratio: f32,
    /// Chassis spin added per drive press
    pub angular_nudge: f32,
    /// Chassis spin never exceeds this after a nudge
    pub max_spin: f32,
    pub hop_impulse: f32,
    pub recovery: RecoveryConfig,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            spawn: Vec2::new(0.0, 7.0),
            chassis_half_extents: Vec2::new(2.0, 0.5),
            chassis_density: 1.0,
            chassis_friction: 0.2,
            chassis_restitution: 0.5,
            wheel_radius: 0.5,
            wheel_offset: Vec2::new(2.2, -1.5),
            wheel_density: 2.0,
            wheel_friction: 0.9,
            wheel_restitution: 0.2,
            speed: 400.0,
            max_torque: 50.0,
            frequency_hz: 4.0,
            damping_ratio: 1.0,
            angular_nudge: 1.0,
            max_spin: 4.0,
            hop_impulse: 100.0,
            recovery: RecoveryConfig::default(),
        }
    }
}

/// Bodies and joints of one car
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleRig {
    pub chassis: BodyKey,
    /// Left is the rear wheel
    pub wheels: Pair<BodyKey>,
    pub springs: Pair<JointKey>,
}

impl VehicleRig {
    pub fn build<W: PhysicsWorld>(world: &mut W, config: &VehicleConfig) -> Option<Self> {
        let filter = CollisionFilter::vehicle();
        let half = config.chassis_half_extents;

        let chassis = world.create_body(BodyDesc::dynamic(config.spawn));
        world.create_fixture(
            chassis,
            FixtureDesc::new(Shape::rect(half.x, half.y))
                .with_density(config.chassis_density)
                .with_friction(config.chassis_friction)
                .with_restitution(config.chassis_restitution)
                .with_filter(filter),
        );

        let wheel_position = |side: Side| {
            config.spawn + Vec2::new(side.sign() * config.wheel_offset.x, config.wheel_offset.y)
        };
        let wheels = Pair::from_fn(|side| {
            let wheel = world.create_body(BodyDesc::dynamic(wheel_position(side)));
            world.create_fixture(
                wheel,
                FixtureDesc::new(Shape::circle(config.wheel_radius))
                    .with_density(config.wheel_density)
                    .with_friction(config.wheel_friction)
                    .with_restitution(config.wheel_restitution)
                    .with_filter(filter),
            );
            wheel
        });

        let motor = MotorSettings {
            enabled: false,
            speed: 0.0,
            max_torque: config.max_torque,
        };
        let mut spring = |side: Side| {
            world.create_joint(JointDesc::wheel(
                chassis,
                wheels[side],
                wheel_position(side),
                Vec2::Y,
                motor,
                config.frequency_hz,
                config.damping_ratio,
            ))
        };
        let springs = Pair::new(spring(Side::Left)?, spring(Side::Right)?);

        Some(Self {
            chassis,
            wheels,
            springs,
        })
    }

    pub fn bodies(&self) -> [BodyKey; 3] {
        [self.chassis, self.wheels.left, self.wheels.right]
    }

    pub fn destroy<W: PhysicsWorld>(&self, world: &mut W) {
        for body in self.bodies() {
            world.destroy_body(body);
        }
    }
}

/// A player-controlled car
pub struct Vehicle {
    rig: VehicleRig,
    state: VehicleControlState,
    bindings: BindingTable,
    config: VehicleConfig,
    previous: ActionSet,
}

impl Vehicle {
    /// Build the car and register its chassis as a heavy grabbable
    pub fn spawn<W: PhysicsWorld>(
        ctx: &mut SimulationContext<W>,
        config: VehicleConfig,
        bindings: BindingTable,
    ) -> Option<Self> {
        let rig = VehicleRig::build(&mut ctx.world, &config)?;
        ctx.grabbables.register(rig.chassis, false);
        log::info!("Spawned vehicle at ({:.1}, {:.1})", config.spawn.x, config.spawn.y);
        Some(Self {
            rig,
            state: VehicleControlState::default(),
            bindings,
            config,
            previous: ActionSet::empty(),
        })
    }

    pub fn rig(&self) -> &VehicleRig {
        &self.rig
    }

    pub fn state(&self) -> &VehicleControlState {
        &self.state
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    pub fn tick<W: PhysicsWorld>(&mut self, ctx: &mut SimulationContext<W>, keys: &KeySnapshot, dt: f32) {
        let actions = self.bindings.resolve(keys);
        self.tick_actions(ctx, actions, dt);
    }

    /// Apply input edges, then run recovery
    pub fn tick_actions<W: PhysicsWorld>(&mut self, ctx: &mut SimulationContext<W>, actions: ActionSet, dt: f32) {
        let pressed = actions - self.previous;
        let released = self.previous - actions;
        self.previous = actions;

        if pressed.held(Action::Reset) {
            self.reset(ctx);
            return;
        }

        let world = &mut ctx.world;
        if pressed.held(Action::DriveLeft) {
            self.drive(world, self.config.speed, -self.config.angular_nudge);
        }
        if pressed.held(Action::DriveRight) {
            self.drive(world, -self.config.speed, self.config.angular_nudge);
        }
        let driving = actions.intersects(ActionSet::DRIVE_LEFT | ActionSet::DRIVE_RIGHT);
        let let_go = released.intersects(ActionSet::DRIVE_LEFT | ActionSet::DRIVE_RIGHT);
        if let_go && !driving {
            self.stop(world);
        }

        if pressed.held(Action::Hop) {
            if let Some(center) = world.position(self.rig.chassis) {
                world.apply_linear_impulse(self.rig.chassis, Vec2::new(0.0, self.config.hop_impulse), center);
            }
        }

        let Some(angle) = world.angle(self.rig.chassis) else {
            return;
        };
        if let Some(command) = recovery::update_recovery(&mut self.state, angle, dt, &self.config.recovery) {
            world.apply_angular_impulse(self.rig.chassis, command.angular_impulse);
            world.apply_force_to_center(self.rig.chassis, command.force);
        }
    }

    /// Enable both motors at `speed` and nudge the chassis spin
    fn drive<W: PhysicsWorld>(&self, world: &mut W, speed: f32, nudge: f32) {
        for side in Side::BOTH {
            world.set_motor(self.rig.springs[side], true, speed);
        }
        let spin = world.angular_velocity(self.rig.chassis).unwrap_or(0.0) + nudge;
        let limit = self.config.max_spin;
        world.set_angular_velocity(self.rig.chassis, spin.clamp(-limit, limit));
    }

    fn stop<W: PhysicsWorld>(&self, world: &mut W) {
        for side in Side::BOTH {
            world.set_motor(self.rig.springs[side], false, 0.0);
        }
        world.set_angular_velocity(self.rig.chassis, 0.0);
    }

    /// Rebuild the car at its spawn point with fresh recovery state
    pub fn reset<W: PhysicsWorld>(&mut self, ctx: &mut SimulationContext<W>) -> bool {
        self.rig.destroy(&mut ctx.world);
        self.state = VehicleControlState::default();
        let Some(rig) = VehicleRig::build(&mut ctx.world, &self.config) else {
            log::warn!("Vehicle rebuild failed");
            return false;
        };
        if !ctx.grabbables.replace(self.rig.chassis, rig.chassis) {
            ctx.grabbables.register(rig.chassis, false);
        }
        self.rig = rig;
        log::info!("Vehicle reset");
        true
    }
}
