//! Sandbox configuration - serializable parameters for a session
//!
//! Every field has a default matching the stock sandbox, so a RON file only
//! needs to list what it changes.

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete sandbox configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub world: WorldParams,
    pub molecules: MoleculeParams,
    pub viewport: ViewportParams,
    pub waves: WaveParams,
    pub physics: PhysicsParams,
    pub runtime: RuntimeParams,
}

/// Closed interval `[min, max]` for random draws
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// World rectangle and walls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldParams {
    pub width: f32,
    pub height: f32,
    /// How far each wall collider extends outside the world
    pub wall_thickness: f32,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            width: 2406.0,
            height: 2411.0,
            wall_thickness: 50.0,
        }
    }
}

/// How molecules get their colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// Grey ramp derived from density
    #[default]
    Density,
    /// Uniformly random RGB
    Random,
}

/// Initial molecule population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoleculeParams {
    pub count: usize,
    /// Integer radii drawn from this range, inclusive
    pub radius: (u32, u32),
    /// Integer masses drawn from this range, inclusive
    pub mass: (u32, u32),
    /// Each axis of the initial kick is drawn from `[-initial_impulse, initial_impulse]`
    pub initial_impulse: f32,
    pub color_mode: ColorMode,
}

impl Default for MoleculeParams {
    fn default() -> Self {
        Self {
            count: 25_000,
            radius: (1, 2),
            mass: (1, 10),
            initial_impulse: 100.0,
            color_mode: ColorMode::Density,
        }
    }
}

/// Camera and viewport geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportParams {
    pub width: f32,
    pub height: f32,
    /// Extra room the camera may travel past the far world edge
    pub margin: f32,
    /// Padding around the viewport for the simulation-side visible set
    pub query_padding: f32,
    /// Camera speed in world units per second
    pub camera_speed: f32,
}

impl Default for ViewportParams {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            margin: 0.0,
            query_padding: 200.0,
            camera_speed: 500.0,
        }
    }
}

/// Wave spawning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    pub enabled: bool,
    pub spawn_interval_secs: f32,
    pub radius: Span,
    pub impulse_strength: Span,
    /// Speed along the x axis, sign picked at random
    pub speed: Span,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_interval_secs: 5.0,
            radius: Span::new(500.0, 1000.0),
            impulse_strength: Span::new(50.0, 150.0),
            speed: Span::new(20.0, 60.0),
        }
    }
}

/// Physics backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Backend step threads, 0 steps on the physics worker itself
    pub threads: usize,
    /// Longest real-time gap the worker catches up on in one iteration
    pub max_dt: f32,
    /// Longest single step; a longer gap is split into equal sub-steps
    pub max_substep_dt: f32,
    /// Seed for every random draw, entropy when absent
    pub seed: Option<u64>,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            threads: 0,
            max_dt: 0.05,
            max_substep_dt: 1.0 / 60.0,
            seed: None,
        }
    }
}

/// Render/stats timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeParams {
    pub target_fps: f32,
    pub stats_interval_secs: f32,
    /// Below this frame rate the game speed is lowered
    pub low_fps_threshold: f32,
    pub initial_game_speed: u32,
}

impl Default for RuntimeParams {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            stats_interval_secs: 1.0,
            low_fps_threshold: 10.0,
            initial_game_speed: 1,
        }
    }
}

impl SandboxConfig {
    /// Load configuration from a RON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: SandboxConfig = ron::from_str(&content)
            .with_context(|| format!("Failed to parse RON config: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a RON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_ron()?).with_context(|| {
            format!("Failed to write config file: {}", path.as_ref().display())
        })?;
        Ok(())
    }

    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize config to RON")
    }

    /// Check the values the simulation relies on
    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        ensure!(world.width > 0.0 && world.height > 0.0, "world size must be positive");
        ensure!(world.wall_thickness > 0.0, "wall thickness must be positive");

        let molecules = &self.molecules;
        ensure!(
            molecules.radius.0 >= 1 && molecules.radius.0 <= molecules.radius.1,
            "molecule radius range {:?} is empty or non-positive",
            molecules.radius
        );
        ensure!(
            molecules.mass.0 >= 1 && molecules.mass.0 <= molecules.mass.1,
            "molecule mass range {:?} is empty or non-positive",
            molecules.mass
        );
        ensure!(
            (molecules.radius.1 as f32) * 2.0 < world.width.min(world.height),
            "molecules do not fit in the world"
        );
        ensure!(molecules.initial_impulse >= 0.0, "initial impulse must not be negative");

        let viewport = &self.viewport;
        ensure!(viewport.width > 0.0 && viewport.height > 0.0, "viewport size must be positive");
        ensure!(viewport.query_padding >= 0.0, "query padding must not be negative");
        ensure!(viewport.camera_speed >= 0.0, "camera speed must not be negative");

        let waves = &self.waves;
        ensure!(waves.spawn_interval_secs > 0.0, "wave spawn interval must be positive");
        ensure!(waves.radius.is_valid() && waves.radius.min >= 0.0, "invalid wave radius range");
        ensure!(
            waves.impulse_strength.is_valid() && waves.impulse_strength.min > 0.0,
            "invalid wave impulse range"
        );
        ensure!(waves.speed.is_valid() && waves.speed.min >= 0.0, "invalid wave speed range");

        ensure!(self.physics.max_dt > 0.0, "max_dt must be positive");
        ensure!(self.physics.max_substep_dt > 0.0, "max_substep_dt must be positive");

        let runtime = &self.runtime;
        ensure!(runtime.target_fps > 0.0, "target fps must be positive");
        ensure!(runtime.stats_interval_secs > 0.0, "stats interval must be positive");
        ensure!(runtime.initial_game_speed >= 1, "game speed starts at 1 or more");

        Ok(())
    }
}
