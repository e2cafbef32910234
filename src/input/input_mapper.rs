//! Application key mapping
//!
//! Maps keys that act on the application as a whole. Keys bound to a
//! character or vehicle are NOT mapped here; they reach the controllers
//! through the key snapshot.

use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Actions on the application itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Exit application (Escape)
    Exit,
    /// Freeze or resume the simulation (P)
    TogglePause,
    /// Log every body's pose (Backquote)
    DumpSnapshot,
}

/// Maps raw key events to application actions
pub struct InputMapper;

impl InputMapper {
    /// Map keyboard input to an action
    ///
    /// Returns `None` for releases and for every controller key
    pub fn map_keyboard(key: KeyCode, state: ElementState) -> Option<InputAction> {
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::Escape => Some(InputAction::Exit),
            KeyCode::KeyP => Some(InputAction::TogglePause),
            KeyCode::Backquote => Some(InputAction::DumpSnapshot),
            _ => None,
        }
    }
}
