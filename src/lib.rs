//! Ragdoll sandbox application library
//!
//! Configuration, scene assembly, and the frame-timing system that drives
//! the control loop. The `ragdoll_sandbox` binary wires these to a window.

pub mod config;
pub mod input;
pub mod scene;
pub mod systems;
