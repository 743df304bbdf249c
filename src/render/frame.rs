//! Everything a renderer draws in one frame

use glam::Vec2;
use std::sync::Arc;

use crate::particles::MoleculeView;
use crate::runtime::Simulation;
use crate::ui::SimulationStats;
use crate::world::{Camera, WallView};

/// Snapshot of the simulation as seen through the camera
#[derive(Debug, Clone)]
pub struct FrameData {
    /// Molecules touching the exact viewport
    pub molecules: Vec<MoleculeView>,
    pub walls: Arc<[WallView]>,
    pub camera: Camera,
    pub stats: SimulationStats,
}

impl FrameData {
    /// Read the published state without touching the world lock
    pub fn extract(simulation: &Simulation) -> Self {
        let camera = simulation.camera();
        let visible = simulation.visible();
        let molecules = camera.viewport_region().filter(&visible).copied().collect();

        Self {
            molecules,
            walls: simulation.walls(),
            camera,
            stats: simulation.stats(),
        }
    }

    /// World position to viewport-relative screen position
    pub fn to_screen(&self, position: Vec2) -> Vec2 {
        position - self.camera.position
    }
}
