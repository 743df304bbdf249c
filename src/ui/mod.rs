//! UI-facing state - statistics shown in the overlay

pub mod stats;

pub use stats::{SimulationStats, StatsCollector};
