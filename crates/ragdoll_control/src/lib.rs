//! Physics-driven control layer for the ragdoll sandbox
//!
//! Everything here reads rigid-body state through the
//! [`PhysicsWorld`](ragdoll_physics::PhysicsWorld) contract and writes
//! forces back through it:
//! - [`contact_sensor`] - ground normal from touching contacts
//! - [`balance`] - PD torques keeping the ragdoll upright
//! - [`locomotion`] - gait signal and walk drive
//! - [`jump`] - cooldown-gated jump
//! - [`grab`] - nearest-body grab with a spring constraint
//! - [`recovery`] - scripted flip for an upside-down vehicle
//! - [`ControlLoop`] - fixed-timestep orchestration

pub mod balance;
pub mod character;
pub mod contact_sensor;
mod context;
mod control_loop;
pub mod grab;
pub mod jump;
pub mod locomotion;
pub mod recovery;
pub mod rig;
pub mod vehicle;

pub use character::{Character, CharacterConfig, CharacterControlState};
pub use context::{SimulationContext, ViewConfig, ViewState};
pub use control_loop::{ControlLoop, LoopSettings};
pub use grab::{GrabHold, GrabRegistry, Grabbable};
pub use recovery::{RecoveryConfig, VehicleControlState};
pub use rig::{RagdollRig, Side};
pub use vehicle::{Vehicle, VehicleConfig, VehicleRig};
