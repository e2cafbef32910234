//! Game simulation system
//!
//! Manages the per-frame simulation including:
//! - Delta time calculation and capping
//! - Key snapshot hand-off to the control loop
//! - Periodic body snapshot logging

use std::time::Instant;

use ragdoll_control::ControlLoop;
use ragdoll_input::KeyboardState;
use ragdoll_physics::PhysicsWorld;

use crate::config::{DebugConfig, SimulationConfig};

/// Result of a simulation update
pub struct SimulationResult {
    /// Fixed ticks run this frame
    pub ticks: u32,
}

/// Turns wall-clock frames into control loop ticks
pub struct SimulationSystem {
    last_frame: Instant,
    max_frame_time: f32,
    snapshot_interval: u64,
    last_snapshot: u64,
    paused: bool,
}

impl SimulationSystem {
    pub fn new(simulation: &SimulationConfig, debug: &DebugConfig) -> Self {
        Self {
            last_frame: Instant::now(),
            max_frame_time: simulation.max_frame_time,
            snapshot_interval: debug.snapshot_interval,
            last_snapshot: 0,
            paused: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freeze or resume; returns the new paused state
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        log::info!("Simulation {}", if self.paused { "paused" } else { "resumed" });
        self.paused
    }

    /// Run one frame using the real time since the previous frame
    pub fn update<W: PhysicsWorld>(
        &mut self,
        control: &mut ControlLoop<W>,
        keyboard: &mut KeyboardState,
    ) -> SimulationResult {
        let now = Instant::now();
        let raw_dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.step_frame(control, keyboard, raw_dt)
    }

    /// Run one frame of the given length
    pub fn step_frame<W: PhysicsWorld>(
        &mut self,
        control: &mut ControlLoop<W>,
        keyboard: &mut KeyboardState,
        frame_time: f32,
    ) -> SimulationResult {
        // Taken even while paused so wheel motion does not pile up
        let keys = keyboard.snapshot();
        if self.paused {
            return SimulationResult { ticks: 0 };
        }

        // Cap dt to prevent spiral of death on first frame or after window focus
        let dt = frame_time.min(self.max_frame_time);
        let ticks = control.advance(dt, &keys);

        let tick = control.ctx.tick;
        if self.snapshot_interval > 0 && tick - self.last_snapshot >= self.snapshot_interval {
            self.last_snapshot = tick;
            log_snapshot(control);
        }

        SimulationResult { ticks }
    }
}

/// Log every body's pose at debug level
pub fn log_snapshot<W: PhysicsWorld>(control: &ControlLoop<W>) {
    let bodies = control.snapshot();
    log::debug!("Tick {}: {} bodies", control.ctx.tick, bodies.len());
    for body in &bodies {
        log::debug!(
            "  {:?} {:?} at ({:.2}, {:.2}) angle {:.2}",
            body.key,
            body.body_type,
            body.position.x,
            body.position.y,
            body.angle
        );
    }
}
