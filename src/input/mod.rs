//! Input handling module
//!
//! Maps application keys (exit, pause, snapshot dump) to actions.
//! Controller keys go through `ragdoll_input` bindings instead.

mod input_mapper;

pub use input_mapper::{InputAction, InputMapper};
