//! World bounds and the four static walls around them

use glam::Vec2;
use rapier2d::prelude::*;

use crate::error::Result;
use crate::particles::{Molecule, Rgb};
use crate::physics::{layers, BodyKind, Space};

/// The world rectangle `[0, width] x [0, height]`, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Edges inclusive
    pub fn contains(&self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    /// True when a circle fits entirely inside, touching the edge allowed
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        center.x - radius >= 0.0
            && center.y - radius >= 0.0
            && center.x + radius <= self.width
            && center.y + radius <= self.height
    }
}

/// One side of the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub start: Vec2,
    pub end: Vec2,
    pub color: Rgb,
    pub collider: ColliderHandle,
}

/// What the renderer draws for a wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallView {
    pub start: Vec2,
    pub end: Vec2,
    pub color: Rgb,
}

impl Wall {
    pub const COLOR: Rgb = Rgb::new(255, 255, 255);

    pub fn view(&self) -> WallView {
        WallView {
            start: self.start,
            end: self.end,
            color: self.color,
        }
    }
}

/// Insert top, right, bottom and left walls.
///
/// Each wall is drawn as the segment on the boundary, while its collider is a
/// slab whose inner face sits on that segment and which extends `thickness`
/// outward, so a fast molecule cannot pass through it in one step.
pub fn build_walls(space: &mut Space, bounds: WorldBounds, thickness: f32) -> Result<Vec<Wall>> {
    let (w, h, t) = (bounds.width, bounds.height, thickness);
    let half_t = t / 2.0;

    // (segment start, segment end, slab center, slab half extents)
    let sides = [
        (Vec2::ZERO, Vec2::new(w, 0.0), Vec2::new(w / 2.0, -half_t), Vec2::new(w / 2.0 + t, half_t)),
        (Vec2::new(w, 0.0), Vec2::new(w, h), Vec2::new(w + half_t, h / 2.0), Vec2::new(half_t, h / 2.0 + t)),
        (Vec2::new(w, h), Vec2::new(0.0, h), Vec2::new(w / 2.0, h + half_t), Vec2::new(w / 2.0 + t, half_t)),
        (Vec2::new(0.0, h), Vec2::ZERO, Vec2::new(-half_t, h / 2.0), Vec2::new(half_t, h / 2.0 + t)),
    ];

    let mut walls = Vec::with_capacity(sides.len());
    for (index, (start, end, center, half_extents)) in sides.into_iter().enumerate() {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .translation(vector![center.x, center.y])
            .friction(Molecule::FRICTION)
            .restitution(Molecule::ELASTICITY)
            .collision_groups(layers::walls())
            .build();
        let collider = space.insert_static(collider, BodyKind::Wall(index))?;
        walls.push(Wall {
            start,
            end,
            color: Wall::COLOR,
            collider,
        });
    }

    log::debug!("Walls: built {} walls around {}x{}", walls.len(), w, h);
    Ok(walls)
}
