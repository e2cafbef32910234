//! Shared simulation state passed into every controller

use ragdoll_math::Vec2;
use ragdoll_physics::PhysicsWorld;
use serde::{Deserialize, Serialize};

use crate::grab::GrabRegistry;

/// Camera and zoom settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Pixels per world unit
    pub scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Drawing surface size in pixels
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// The camera closes 1/follow_divisor of the gap to its target per tick
    pub follow_divisor: f32,
    /// Wheel units per unit of scale
    pub wheel_divisor: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            scale: 20.0,
            min_scale: 4.0,
            max_scale: 50.0,
            canvas_width: 1600.0,
            canvas_height: 800.0,
            follow_divisor: 5.0,
            wheel_divisor: 100.0,
        }
    }
}

/// Camera position, zoom, and the visible half-extents derived from them
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    config: ViewConfig,
    scale: f32,
    /// Camera center in pixels (world position times scale)
    camera: Vec2,
    /// Half the visible area in world units
    half_extents: Vec2,
}

impl ViewState {
    pub fn new(config: ViewConfig) -> Self {
        let scale = config.scale.clamp(config.min_scale, config.max_scale);
        let mut view = Self {
            config,
            scale,
            camera: Vec2::ZERO,
            half_extents: Vec2::ZERO,
        };
        view.recompute_extents();
        view
    }

    fn recompute_extents(&mut self) {
        self.half_extents = Vec2::new(
            self.config.canvas_width / self.scale / 2.0,
            self.config.canvas_height / self.scale / 2.0,
        );
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn camera(&self) -> Vec2 {
        self.camera
    }

    pub fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    /// Apply wheel motion; returns true if the scale changed
    pub fn zoom(&mut self, wheel_delta: f32) -> bool {
        if wheel_delta == 0.0 {
            return false;
        }
        let divisor = self.config.wheel_divisor.max(f32::EPSILON);
        let scale = (self.scale + wheel_delta / divisor)
            .clamp(self.config.min_scale, self.config.max_scale);
        if scale == self.scale {
            return false;
        }
        self.scale = scale;
        self.recompute_extents();
        log::trace!("Zoom scale {:.2}", scale);
        true
    }

    /// Ease the camera toward a world position
    pub fn follow(&mut self, target: Vec2) {
        let divisor = self.config.follow_divisor.max(1.0);
        self.camera -= (self.camera - target * self.scale) / divisor;
    }

    /// Canvas pixel coordinates (y down) to world coordinates (y up)
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            (screen.x + self.camera.x) / self.scale - self.half_extents.x,
            self.half_extents.y - (screen.y - self.camera.y) / self.scale,
        )
    }

    /// World coordinates to canvas pixel coordinates
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            (world.x + self.half_extents.x) * self.scale - self.camera.x,
            (self.half_extents.y - world.y) * self.scale + self.camera.y,
        )
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}

/// Everything a controller may touch during a tick
pub struct SimulationContext<W: PhysicsWorld> {
    pub world: W,
    /// Ticks completed since start
    pub tick: u64,
    pub view: ViewState,
    pub grabbables: GrabRegistry,
    next_group: i32,
}

impl<W: PhysicsWorld> SimulationContext<W> {
    pub fn new(world: W, view: ViewConfig) -> Self {
        Self {
            world,
            tick: 0,
            view: ViewState::new(view),
            grabbables: GrabRegistry::new(),
            next_group: 0,
        }
    }

    /// A fresh negative collision group, so one ragdoll's limbs never collide
    pub fn allocate_group(&mut self) -> i32 {
        self.next_group -= 1;
        self.next_group
    }
}
