//! Camera - pans the viewport over the world

use glam::Vec2;

use super::query::Region;
use super::walls::WorldBounds;

/// Directional flags, sampled once per frame from the input layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl CameraInput {
    /// Unit-less direction; screen coordinates, so "up" is negative y
    fn direction(&self) -> Vec2 {
        let mut direction = Vec2::ZERO;
        if self.left {
            direction.x -= 1.0;
        }
        if self.right {
            direction.x += 1.0;
        }
        if self.up {
            direction.y -= 1.0;
        }
        if self.down {
            direction.y += 1.0;
        }
        direction
    }
}

/// Top-left corner of the viewport plus its size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec2,
    pub viewport: Vec2,
    /// Extra travel allowed past the far edge
    pub margin: f32,
    /// World units per second per held direction
    pub speed: f32,
}

impl Camera {
    pub fn new(viewport: Vec2, margin: f32, speed: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport,
            margin,
            speed,
        }
    }

    /// Largest camera position on each axis
    pub fn max_position(&self, bounds: WorldBounds) -> Vec2 {
        (bounds.size() - self.viewport + Vec2::splat(self.margin)).max(Vec2::ZERO)
    }

    /// Move by `speed * dt` along each held direction, then clamp each axis
    pub fn step(&mut self, input: &CameraInput, dt: f32, bounds: WorldBounds) {
        let moved = self.position + input.direction() * self.speed * dt;
        self.position = moved.clamp(Vec2::ZERO, self.max_position(bounds));
    }

    /// The exact region on screen
    pub fn viewport_region(&self) -> Region {
        Region::new(self.position, self.position + self.viewport)
    }
}
