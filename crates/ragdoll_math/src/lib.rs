//! 2D Mathematics Library
//!
//! This crate provides the small amount of math the ragdoll sandbox needs.
//!
//! ## Core Types
//!
//! - [`Vec2`] - 2D vector with x, y components
//! - [`normalize_angle`] / [`shortest_signed_angle_difference`] - angle wrapping
//!
//! ## Curves
//!
//! - [`CurveKind`] - Quadratic or cubic bezier
//! - [`Curve`] - Control points plus a shared sampling algorithm

mod vec2;
pub mod angle;
pub mod curve;

pub use vec2::Vec2;
pub use angle::{normalize_angle, shortest_signed_angle_difference};
pub use curve::{Curve, CurveKind};
