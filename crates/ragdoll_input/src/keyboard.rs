//! Raw key and wheel state
//!
//! Events arrive between ticks and only ever touch [`KeyboardState`].
//! Controllers read a [`KeySnapshot`] taken at a fixed point in the frame,
//! so every tick of that frame sees the same keys.

use std::collections::HashSet;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Accumulates key presses and wheel motion between frames
///
/// A key pressed since the last snapshot shows up in the next one even if
/// it was already released, so a quick tap still produces an edge.
#[derive(Debug, Default)]
pub struct KeyboardState {
    pressed: HashSet<KeyCode>,
    tapped: HashSet<KeyCode>,
    pending_zoom: f32,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process keyboard input
    ///
    /// Returns true if the key's held state changed (OS key repeat does not).
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        match state {
            ElementState::Pressed => {
                self.tapped.insert(key);
                self.pressed.insert(key)
            }
            ElementState::Released => self.pressed.remove(&key),
        }
    }

    /// Accumulate wheel motion (positive zooms in)
    pub fn process_wheel(&mut self, delta: f32) {
        self.pending_zoom += delta;
    }

    /// Forget every held key, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.pressed.clear();
        self.tapped.clear();
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Freeze the current state; latched taps and the wheel delta are consumed
    pub fn snapshot(&mut self) -> KeySnapshot {
        let mut pressed = std::mem::take(&mut self.tapped);
        pressed.extend(self.pressed.iter().copied());
        KeySnapshot {
            pressed,
            zoom_delta: std::mem::take(&mut self.pending_zoom),
        }
    }
}

/// Key state as of one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeySnapshot {
    pressed: HashSet<KeyCode>,
    zoom_delta: f32,
}

impl KeySnapshot {
    /// A snapshot with the given keys held and no wheel motion
    pub fn with_keys(keys: impl IntoIterator<Item = KeyCode>) -> Self {
        Self {
            pressed: keys.into_iter().collect(),
            zoom_delta: 0.0,
        }
    }

    /// Add wheel motion to the snapshot
    pub fn with_zoom(mut self, delta: f32) -> Self {
        self.zoom_delta = delta;
        self
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Wheel motion since the previous snapshot
    pub fn zoom_delta(&self) -> f32 {
        self.zoom_delta
    }
}
