//! Molecule - a circular particle owning one rigid body

use glam::Vec2;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

use super::MoleculeId;
use crate::error::{Result, SandboxError};
use crate::physics::{layers, BodyHandles, BodyKind, Space};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise linear blend, `t` clamped to [0, 1]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Color of the least dense molecules
const DIM: Rgb = Rgb::new(50, 50, 50);
/// Color at or above [`MAX_DENSITY`]
const BRIGHT: Rgb = Rgb::new(255, 255, 255);
/// Density mapped to full brightness
const MAX_DENSITY: f32 = 5.0;

/// Default molecule color for a given density
pub fn density_color(density: f32) -> Rgb {
    DIM.lerp(BRIGHT, (density / MAX_DENSITY).min(1.0))
}

/// What the renderer needs to draw one molecule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoleculeView {
    pub id: MoleculeId,
    pub position: Vec2,
    pub radius: f32,
    pub color: Rgb,
}

/// A physical particle
#[derive(Debug)]
pub struct Molecule {
    id: MoleculeId,
    radius: f32,
    mass: f32,
    color: Rgb,
    handles: BodyHandles,
}

impl Molecule {
    pub const FRICTION: f32 = 0.001;
    pub const ELASTICITY: f32 = 0.9;

    /// Register a new dynamic body + ball collider in `space`.
    ///
    /// Without a color, one is derived from the density.
    pub fn create(
        space: &mut Space,
        radius: f32,
        mass: f32,
        color: Option<Rgb>,
        position: Vec2,
    ) -> Result<Self> {
        let radius = SandboxError::require_positive("molecule radius", radius)?;
        let mass = SandboxError::require_positive("molecule mass", mass)?;
        if !position.is_finite() {
            return Err(SandboxError::OutOfBounds { position });
        }

        let id = MoleculeId::new();
        let color = color.unwrap_or_else(|| density_color(mass / radius));

        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y])
            .ccd_enabled(true)
            .build();
        let collider = ColliderBuilder::ball(radius)
            .mass(mass)
            .friction(Self::FRICTION)
            .restitution(Self::ELASTICITY)
            .collision_groups(layers::molecules())
            .build();
        let handles = space.insert(body, collider, BodyKind::Molecule(id))?;

        Ok(Self {
            id,
            radius,
            mass,
            color,
            handles,
        })
    }

    /// Instantaneous impulse at the body's origin; the velocity change is
    /// integrated by the next step.
    pub fn apply_impulse(&self, space: &mut Space, impulse: Vec2) -> Result<()> {
        space.apply_impulse(&self.handles, impulse)
    }

    /// Per-step extension point, reserved for merging similar molecules
    pub fn on_step(&mut self, _space: &Space) {}

    pub fn id(&self) -> MoleculeId {
        self.id
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn density(&self) -> f32 {
        self.mass / self.radius
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn handles(&self) -> &BodyHandles {
        &self.handles
    }

    pub fn position(&self, space: &Space) -> Result<Vec2> {
        space.position(&self.handles)
    }

    pub fn velocity(&self, space: &Space) -> Result<Vec2> {
        space.velocity(&self.handles)
    }

    pub fn view(&self, space: &Space) -> Result<MoleculeView> {
        Ok(MoleculeView {
            id: self.id,
            position: self.position(space)?,
            radius: self.radius,
            color: self.color,
        })
    }
}
