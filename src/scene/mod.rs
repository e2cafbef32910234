//! Scene construction utilities
//!
//! This module provides a declarative API for building the sandbox scene.

mod scene_builder;

pub use scene_builder::SceneBuilder;
