//! Fixed-timestep orchestration
//!
//! [`ControlLoop::advance`] turns real frame time into whole ticks. Each
//! tick steps the world, then runs every character and every vehicle
//! against the same key snapshot, then eases the camera toward the first
//! character.

use ragdoll_input::KeySnapshot;
use ragdoll_physics::{BodySnapshot, PhysicsWorld, SolverIterations};
use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::context::SimulationContext;
use crate::vehicle::Vehicle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopSettings {
    /// Ticks per simulated second
    pub tick_rate: f32,
    pub iterations: SolverIterations,
    /// Leftover time beyond this many ticks is dropped
    pub max_ticks_per_frame: u32,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            iterations: SolverIterations::default(),
            max_ticks_per_frame: 8,
        }
    }
}

impl LoopSettings {
    /// Length of one tick in seconds
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate
    }
}

pub struct ControlLoop<W: PhysicsWorld> {
    pub ctx: SimulationContext<W>,
    pub characters: Vec<Character>,
    pub vehicles: Vec<Vehicle>,
    settings: LoopSettings,
    accumulator: f32,
}

impl<W: PhysicsWorld> ControlLoop<W> {
    pub fn new(ctx: SimulationContext<W>, settings: LoopSettings) -> Self {
        Self {
            ctx,
            characters: Vec::new(),
            vehicles: Vec::new(),
            settings,
            accumulator: 0.0,
        }
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    /// Run as many whole ticks as `frame_time` covers; returns how many ran
    ///
    /// The zoom delta in `keys` is applied once, before the first tick.
    pub fn advance(&mut self, frame_time: f32, keys: &KeySnapshot) -> u32 {
        if self.ctx.view.zoom(keys.zoom_delta()) {
            log::debug!("Zoom scale {:.2}", self.ctx.view.scale());
        }

        let dt = self.settings.dt();
        self.accumulator += frame_time.max(0.0);
        let mut ticks = 0;
        while self.accumulator >= dt && ticks < self.settings.max_ticks_per_frame {
            self.tick(keys);
            self.accumulator -= dt;
            ticks += 1;
        }
        if ticks == self.settings.max_ticks_per_frame && self.accumulator >= dt {
            log::trace!("Dropping {:.3}s of simulation time", self.accumulator);
            self.accumulator = 0.0;
        }
        ticks
    }

    /// One fixed tick
    pub fn tick(&mut self, keys: &KeySnapshot) {
        let dt = self.settings.dt();
        self.ctx.world.step(dt, self.settings.iterations);
        self.ctx.tick += 1;

        for character in &mut self.characters {
            character.tick(&mut self.ctx, keys);
        }
        for vehicle in &mut self.vehicles {
            vehicle.tick(&mut self.ctx, keys, dt);
        }

        let focus = self
            .characters
            .first()
            .and_then(|c| self.ctx.world.position(c.rig().torso));
        if let Some(target) = focus {
            self.ctx.view.follow(target);
        }
    }

    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        self.ctx.world.snapshot()
    }
}
