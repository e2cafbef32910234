//! 2D Physics for the ragdoll sandbox
//!
//! This crate provides the physics side of the sandbox:
//! - The [`PhysicsWorld`] contract controllers are written against
//! - Generational handles for bodies and joints
//! - Body, fixture, and joint descriptors
//! - Collision shapes, materials, and filtering
//! - [`SandboxWorld`], a small reference engine implementing the contract

pub mod body;
pub mod collision;
pub mod contact;
pub mod joint;
pub mod shapes;
pub mod world;

// Re-export commonly used types
pub use body::{BodyDesc, BodyKey, BodyType, FixtureDesc, PhysicsMaterial, RigidBody2D};
pub use collision::{CollisionFilter, CollisionLayer, Manifold};
pub use contact::{ContactObservation, ContactSide};
pub use joint::{JointDesc, JointKey, JointKind, MotorSettings};
pub use shapes::Shape;
pub use world::{BodySnapshot, PhysicsConfig, PhysicsWorld, SandboxWorld, SolverIterations};
