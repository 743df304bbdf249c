//! World management - bounds, walls, camera and the simulation driver

mod camera;
mod query;
mod walls;
#[allow(clippy::module_inception)]
mod world;

pub use camera::{Camera, CameraInput};
pub use query::Region;
pub use walls::{build_walls, Wall, WallView, WorldBounds};
pub use world::{throttled_game_speed, StepReport, World};
