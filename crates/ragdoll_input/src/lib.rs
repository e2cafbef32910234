//! Input handling for the ragdoll sandbox
//!
//! Raw winit key and wheel events accumulate in a [`KeyboardState`]. Once
//! per frame the state is frozen into a [`KeySnapshot`], and each
//! controller resolves that snapshot through its own [`BindingTable`]
//! into an [`ActionSet`] of logical actions.

mod action;
mod bindings;
mod keyboard;

pub use action::{Action, ActionSet};
pub use bindings::{BindingError, BindingTable, STICKMAN_BINDINGS, VEHICLE_BINDINGS};
pub use keyboard::{KeySnapshot, KeyboardState};
