//! SceneBuilder - Declarative scene construction
//!
//! Provides a fluent API for laying out static scenery and spawning the
//! controlled entities, ending in a ready-to-run [`ControlLoop`].

use ragdoll_control::{
    Character, CharacterConfig, ControlLoop, LoopSettings, SimulationContext, Vehicle, VehicleConfig, ViewConfig,
};
use ragdoll_input::BindingTable;
use ragdoll_math::{Curve, CurveKind, Vec2};
use ragdoll_physics::{BodyDesc, CollisionFilter, FixtureDesc, PhysicsConfig, PhysicsWorld, SandboxWorld, Shape};

use crate::config::AppConfig;

/// Builder for the sandbox scene
///
/// # Example
/// ```ignore
/// let control = SceneBuilder::new(PhysicsConfig::default(), ViewConfig::default())
///     .add_ground(Vec2::new(-50.0, -10.0), Vec2::new(50.0, -10.0), 0.5)
///     .add_character(CharacterConfig::default(), BindingTable::stickman())
///     .add_vehicle(VehicleConfig::default(), BindingTable::vehicle())
///     .build(LoopSettings::default());
/// ```
pub struct SceneBuilder {
    ctx: SimulationContext<SandboxWorld>,
    characters: Vec<Character>,
    vehicles: Vec<Vehicle>,
}

impl SceneBuilder {
    /// Create a scene with an empty world
    pub fn new(physics: PhysicsConfig, view: ViewConfig) -> Self {
        Self {
            ctx: SimulationContext::new(SandboxWorld::with_config(physics), view),
            characters: Vec::new(),
            vehicles: Vec::new(),
        }
    }

    /// Build the default scene described by the configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let scene = &config.scene;
        let mut builder = Self::new(config.physics.clone(), config.view.clone()).add_ground(
            Vec2::from(scene.ground_start),
            Vec2::from(scene.ground_end),
            scene.ground_friction,
        );

        if !scene.track.is_empty() {
            let points = scene.track.iter().copied().map(Vec2::from).collect::<Vec<_>>();
            let kind = if points.len() == 3 {
                CurveKind::Quadratic
            } else {
                CurveKind::Cubic
            };
            match Curve::new(kind, points) {
                Some(curve) => {
                    builder = builder.add_track(&curve, scene.track_resolution, scene.track_friction);
                }
                None => log::warn!("Track needs 3 or 4 points, got {}", scene.track.len()),
            }
        }

        for prop in &scene.props {
            builder = builder.add_grabbable(
                Vec2::from(prop.position),
                Vec2::from(prop.half_extents),
                prop.weapon,
            );
        }

        builder
            .add_character(config.character.clone(), BindingTable::stickman())
            .add_vehicle(config.vehicle.clone(), BindingTable::vehicle())
    }

    /// Add a static ground segment
    pub fn add_ground(mut self, start: Vec2, end: Vec2, friction: f32) -> Self {
        self.add_static(Shape::edge(start, end), friction);
        self
    }

    /// Add a static polyline sampled from a curve
    pub fn add_track(mut self, curve: &Curve, resolution: f32, friction: f32) -> Self {
        let vertices = curve.sample(resolution);
        log::debug!("Track with {} segments", vertices.len() - 1);
        self.add_static(Shape::chain(vertices), friction);
        self
    }

    fn add_static(&mut self, shape: Shape, friction: f32) {
        let world = &mut self.ctx.world;
        let body = world.create_body(BodyDesc::fixed(Vec2::ZERO));
        world.create_fixture(
            body,
            FixtureDesc::new(shape)
                .with_friction(friction)
                .with_filter(CollisionFilter::static_world()),
        );
    }

    /// Spawn a ragdoll character
    pub fn add_character(mut self, config: CharacterConfig, bindings: BindingTable) -> Self {
        match Character::spawn(&mut self.ctx, config, bindings) {
            Some(character) => self.characters.push(character),
            None => log::warn!("Character could not be built"),
        }
        self
    }

    /// Spawn a vehicle
    pub fn add_vehicle(mut self, config: VehicleConfig, bindings: BindingTable) -> Self {
        match Vehicle::spawn(&mut self.ctx, config, bindings) {
            Some(vehicle) => self.vehicles.push(vehicle),
            None => log::warn!("Vehicle could not be built"),
        }
        self
    }

    /// Add a loose box characters can grab
    pub fn add_grabbable(mut self, position: Vec2, half_extents: Vec2, is_weapon: bool) -> Self {
        let world = &mut self.ctx.world;
        let body = world.create_body(BodyDesc::dynamic(position));
        world.create_fixture(body, FixtureDesc::new(Shape::rect(half_extents.x, half_extents.y)));
        self.ctx.grabbables.register(body, is_weapon);
        self
    }

    /// Finish building
    pub fn build(self, settings: LoopSettings) -> ControlLoop<SandboxWorld> {
        log::info!(
            "Scene built: {} bodies, {} character(s), {} vehicle(s)",
            self.ctx.world.body_count(),
            self.characters.len(),
            self.vehicles.len()
        );
        let mut control = ControlLoop::new(self.ctx, settings);
        control.characters = self.characters;
        control.vehicles = self.vehicles;
        control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PropConfig;

    #[test]
    fn test_default_scene() {
        let control = SceneBuilder::from_config(&AppConfig::default()).build(LoopSettings::default());
        assert_eq!(control.characters.len(), 1);
        assert_eq!(control.vehicles.len(), 1);
        // Ground, ten limbs, chassis and two wheels
        assert_eq!(control.ctx.world.body_count(), 14);
        assert_eq!(control.ctx.grabbables.len(), 1);
    }

    #[test]
    fn test_track_from_config() {
        let mut config = AppConfig::default();
        config.scene.track = vec![[-20.0, -10.0], [0.0, 0.0], [20.0, -10.0]];
        let control = SceneBuilder::from_config(&config).build(LoopSettings::default());
        assert_eq!(control.ctx.world.body_count(), 15);
    }

    #[test]
    fn test_bad_track_is_skipped() {
        let mut config = AppConfig::default();
        config.scene.track = vec![[0.0, 0.0], [1.0, 1.0]];
        let control = SceneBuilder::from_config(&config).build(LoopSettings::default());
        assert_eq!(control.ctx.world.body_count(), 14);
    }

    #[test]
    fn test_props_from_config() {
        let mut config = AppConfig::default();
        config.scene.props = vec![
            PropConfig {
                position: [4.0, -9.0],
                ..PropConfig::default()
            },
            PropConfig {
                position: [-4.0, -9.0],
                half_extents: [0.1, 0.6],
                weapon: true,
            },
        ];
        let control = SceneBuilder::from_config(&config).build(LoopSettings::default());
        assert_eq!(control.ctx.world.body_count(), 16);
        // Two props plus the vehicle chassis
        let entries = control.ctx.grabbables.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries.iter().filter(|e| e.is_weapon).count(), 1);
    }

    #[test]
    fn test_grabbable_registered() {
        let control = SceneBuilder::new(PhysicsConfig::default(), ViewConfig::default())
            .add_grabbable(Vec2::new(3.0, 0.0), Vec2::new(0.1, 0.5), true)
            .build(LoopSettings::default());
        assert_eq!(control.ctx.grabbables.entries()[0].is_weapon, true);
        assert!(control.characters.is_empty());
    }
}
