//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`RAGDOLL_SECTION__KEY`)

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use ragdoll_control::{CharacterConfig, LoopSettings, VehicleConfig, ViewConfig};
use ragdoll_physics::{PhysicsConfig, SolverIterations};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    /// Fixed-timestep settings
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Camera scale and zoom limits
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub character: CharacterConfig,
    #[serde(default)]
    pub vehicle: VehicleConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`RAGDOLL_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // RAGDOLL_SIMULATION__TICK_RATE=120 -> simulation.tick_rate = 120
        figment = figment.merge(Env::prefixed("RAGDOLL_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Ragdoll Sandbox".to_string(),
            width: 1600,
            height: 800,
        }
    }
}

/// Fixed-timestep configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ticks per second
    pub tick_rate: f32,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    /// Real frame time is capped to this many seconds
    pub max_frame_time: f32,
    pub max_ticks_per_frame: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            velocity_iterations: 8,
            position_iterations: 3,
            max_frame_time: 0.25,
            max_ticks_per_frame: 8,
        }
    }
}

impl SimulationConfig {
    /// Convert to the control loop's settings
    pub fn to_loop_settings(&self) -> LoopSettings {
        LoopSettings {
            tick_rate: self.tick_rate,
            iterations: SolverIterations {
                velocity: self.velocity_iterations,
                position: self.position_iterations,
            },
            max_ticks_per_frame: self.max_ticks_per_frame,
        }
    }
}

/// Static scenery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Ground segment endpoints
    pub ground_start: [f32; 2],
    pub ground_end: [f32; 2],
    pub ground_friction: f32,
    /// Control points of an optional curved track (3 or 4 points)
    pub track: Vec<[f32; 2]>,
    /// Target track segment length in world units (200 px at scale 20)
    pub track_resolution: f32,
    pub track_friction: f32,
    /// Loose boxes characters can pick up
    pub props: Vec<PropConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            ground_start: [-50.0, -10.0],
            ground_end: [50.0, -10.0],
            ground_friction: 0.5,
            track: Vec::new(),
            track_resolution: 10.0,
            track_friction: 0.7,
            props: Vec::new(),
        }
    }
}

/// A grabbable box placed in the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropConfig {
    pub position: [f32; 2],
    pub half_extents: [f32; 2],
    /// Weapons are carried without giving up balance
    pub weapon: bool,
}

impl Default for PropConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0],
            half_extents: [0.5, 0.5],
            weapon: false,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Log a body snapshot every this many ticks (0 = never)
    pub snapshot_interval: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            snapshot_interval: 0,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.window.width, 1600);
        assert_eq!(config.simulation.tick_rate, 60.0);
        assert!((config.physics.gravity + 29.4).abs() < 0.0001);
        assert_eq!(config.view.scale, 20.0);
        assert_eq!(config.character.standing_power, 20.0);
        assert_eq!(config.vehicle.speed, 400.0);
    }

    #[test]
    fn test_loop_settings_conversion() {
        let settings = SimulationConfig::default().to_loop_settings();
        assert_eq!(settings.tick_rate, 60.0);
        assert_eq!(settings.iterations, SolverIterations::default());
        assert_eq!(settings.max_ticks_per_frame, 8);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("tick_rate"));
        assert!(toml.contains("gravity"));
        assert!(toml.contains("standing_power"));
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: AppConfig = toml::from_str("[simulation]\ntick_rate = 120.0\n").unwrap();
        assert_eq!(config.simulation.tick_rate, 120.0);
        assert_eq!(config.simulation.max_ticks_per_frame, 8);
        assert_eq!(config.view.max_scale, 50.0);
    }
}
