//! # HyperLife - 2D Molecule Physics Sandbox
//!
//! Thousands of circular molecules bounce inside a walled world while
//! expanding waves push the ones they sweep over. Physics runs on its own
//! thread; a render loop reads the published state.

pub mod config;
pub mod error;
pub mod particles;
pub mod physics;
pub mod render;
pub mod runtime;
pub mod ui;
pub mod world;

pub use config::SandboxConfig;
pub use error::{Result, SandboxError};
pub use runtime::{PhysicsWorker, Simulation};
pub use world::World;

/// Common imports for internal use
pub mod prelude {
    pub use crate::particles::{Molecule, MoleculeId, MoleculeView, Wave, WaveId, WaveSpawn};
    pub use crate::world::{Camera, CameraInput, World, WorldBounds};
    pub use glam::Vec2;
}
