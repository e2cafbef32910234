//! Ragdoll Sandbox
//!
//! Opens a window, feeds keyboard and wheel input to the control loop, and
//! runs the simulation at a fixed timestep. Drawing is left to whatever
//! consumes the body snapshots.

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use ragdoll_control::ControlLoop;
use ragdoll_input::KeyboardState;
use ragdoll_physics::SandboxWorld;
use ragdoll_sandbox::config::AppConfig;
use ragdoll_sandbox::input::{InputAction, InputMapper};
use ragdoll_sandbox::scene::SceneBuilder;
use ragdoll_sandbox::systems::{log_snapshot, SimulationSystem};

/// Wheel units per line, matching one browser wheel notch
const LINE_DELTA: f32 = 120.0;

/// Main application state
struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    control: ControlLoop<SandboxWorld>,
    simulation: SimulationSystem,
    keyboard: KeyboardState,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let control = SceneBuilder::from_config(&config).build(config.simulation.to_loop_settings());
        let simulation = SimulationSystem::new(&config.simulation, &config.debug);

        Self {
            config,
            window: None,
            control,
            simulation,
            keyboard: KeyboardState::new(),
        }
    }

    fn update_title(&self) {
        if let Some(window) = &self.window {
            let paused = if self.simulation.is_paused() { " [paused]" } else { "" };
            window.set_title(&format!(
                "{} - tick {} - scale {:.0}{}",
                self.config.window.title,
                self.control.ctx.tick,
                self.control.ctx.view.scale(),
                paused
            ));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = Window::default_attributes()
                .with_title(&self.config.window.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.window.width,
                    self.config.window.height,
                ));

            match event_loop.create_window(window_attributes) {
                Ok(window) => self.window = Some(Arc::new(window)),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Focused(false) => {
                // Keys released while unfocused never reach us
                self.keyboard.release_all();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match InputMapper::map_keyboard(key, event.state) {
                        Some(InputAction::Exit) => {
                            event_loop.exit();
                            return;
                        }
                        Some(InputAction::TogglePause) => {
                            self.simulation.toggle_pause();
                        }
                        Some(InputAction::DumpSnapshot) => {
                            log_snapshot(&self.control);
                        }
                        None => {}
                    }
                    self.keyboard.process_keyboard(key, event.state);
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y * LINE_DELTA,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                self.keyboard.process_wheel(amount);
            }

            WindowEvent::RedrawRequested => {
                let result = self.simulation.update(&mut self.control, &mut self.keyboard);
                if result.ticks > 0 {
                    self.update_title();
                }

                // Request next frame
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

fn main() {
    // Load configuration before logging so its level can be the default
    let config = AppConfig::load();
    let level = config
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = config.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });
    log::info!("Starting Ragdoll Sandbox");

    // Create event loop
    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    // Create and run application
    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("Event loop error");
}
