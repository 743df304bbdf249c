//! Physics backend - rapier2d space, collision layers, sensor events

mod events;
pub mod layers;
mod space;

pub use events::SensorContact;
pub use space::{BodyHandles, BodyKind, Space};
