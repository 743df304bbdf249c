//! World - owns the space, molecules, waves and walls, and drives the step

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use std::collections::HashMap;
use std::sync::Arc;

use super::camera::{Camera, CameraInput};
use super::walls::{build_walls, Wall, WallView, WorldBounds};
use crate::config::{ColorMode, MoleculeParams, SandboxConfig, WaveParams};
use crate::error::{Result, SandboxError};
use crate::particles::{
    collision, AppliedImpulse, Molecule, MoleculeId, MoleculeView, Rgb, Wave, WaveId, WaveSpawn,
    WaveState,
};
use crate::physics::{BodyKind, Space};

/// What happened during one `step_physics` call
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    /// Backend steps taken (the game speed at the time of the call)
    pub ticks: u32,
    pub impulses: Vec<AppliedImpulse>,
    pub waves_spawned: Vec<WaveId>,
    pub waves_expired: Vec<WaveId>,
}

/// Game speed after one frame at `fps`: one lower when below `threshold`,
/// never under 1, unchanged otherwise.
pub fn throttled_game_speed(current: u32, fps: f32, threshold: f32) -> u32 {
    if fps >= threshold {
        return current;
    }
    let lowered = current.saturating_sub(1).max(1);
    if lowered != current {
        log::warn!(
            "FPS {:.1} below {:.0}, game speed {} -> {}",
            fps,
            threshold,
            current,
            lowered
        );
    }
    lowered
}

/// The simulated world
pub struct World {
    space: Space,
    bounds: WorldBounds,

    molecules: HashMap<MoleculeId, Molecule>,

    /// Active waves, oldest first
    waves: Vec<Wave>,

    walls: Vec<Wall>,

    camera: Camera,

    /// Backend steps per `step_physics` call, at least 1
    game_speed: u32,
    low_fps_threshold: f32,

    /// Set by the spawn timer, consumed by the next step
    spawn_requested: bool,
    wave_params: WaveParams,

    query_padding: f32,

    /// Molecules around the camera as of the last step
    visible: Arc<[MoleculeView]>,

    rng: Xoshiro256StarStar,
}

impl World {
    /// Build the space, walls and the initial molecule population
    pub fn new(config: &SandboxConfig) -> Result<Self> {
        let bounds = WorldBounds::new(config.world.width, config.world.height);
        SandboxError::require_positive("world width", bounds.width)?;
        SandboxError::require_positive("world height", bounds.height)?;

        let waves = &config.waves;
        for (what, span) in [
            ("wave radius range", waves.radius),
            ("wave impulse range", waves.impulse_strength),
            ("wave speed range", waves.speed),
        ] {
            if !span.is_valid() {
                return Err(SandboxError::InvalidParameter {
                    what,
                    value: span.min,
                });
            }
        }

        let mut space = Space::new(config.physics.threads)?;
        let walls = build_walls(&mut space, bounds, config.world.wall_thickness)?;

        let rng = match config.physics.seed {
            Some(seed) => Xoshiro256StarStar::seed_from_u64(seed),
            None => Xoshiro256StarStar::from_entropy(),
        };

        let viewport = &config.viewport;
        let mut world = Self {
            space,
            bounds,
            molecules: HashMap::with_capacity(config.molecules.count),
            waves: Vec::new(),
            walls,
            camera: Camera::new(
                Vec2::new(viewport.width, viewport.height),
                viewport.margin,
                viewport.camera_speed,
            ),
            game_speed: config.runtime.initial_game_speed.max(1),
            low_fps_threshold: config.runtime.low_fps_threshold,
            spawn_requested: false,
            wave_params: config.waves.clone(),
            query_padding: viewport.query_padding,
            visible: Arc::from(Vec::new()),
            rng,
        };

        world.populate(&config.molecules)?;

        log::info!(
            "Created world {}x{}: {} molecules, {} walls",
            bounds.width,
            bounds.height,
            world.molecules.len(),
            world.walls.len()
        );

        Ok(world)
    }

    /// Scatter molecules uniformly and give each a random kick
    fn populate(&mut self, params: &MoleculeParams) -> Result<()> {
        if params.count == 0 {
            return Ok(());
        }
        let largest = params.radius.1 as f32;
        if params.radius.0 > params.radius.1
            || largest * 2.0 > self.bounds.width.min(self.bounds.height)
        {
            return Err(SandboxError::InvalidParameter {
                what: "molecule radius",
                value: largest,
            });
        }
        if params.mass.0 > params.mass.1 {
            return Err(SandboxError::InvalidParameter {
                what: "molecule mass",
                value: params.mass.1 as f32,
            });
        }

        for _ in 0..params.count {
            let radius = self.rng.gen_range(params.radius.0..=params.radius.1) as f32;
            let mass = self.rng.gen_range(params.mass.0..=params.mass.1) as f32;
            let color = match params.color_mode {
                ColorMode::Density => None,
                ColorMode::Random => Some(Rgb::new(self.rng.gen(), self.rng.gen(), self.rng.gen())),
            };
            let position = Vec2::new(
                self.rng.gen_range(radius..=self.bounds.width - radius),
                self.rng.gen_range(radius..=self.bounds.height - radius),
            );

            let id = self.add_molecule(radius, mass, color, position)?;

            if params.initial_impulse > 0.0 {
                let range = -params.initial_impulse..=params.initial_impulse;
                let impulse = Vec2::new(
                    self.rng.gen_range(range.clone()),
                    self.rng.gen_range(range),
                );
                if let Some(molecule) = self.molecules.get(&id) {
                    molecule.apply_impulse(&mut self.space, impulse)?;
                }
            }
        }
        Ok(())
    }

    /// Add one molecule; its shape must lie within the world
    pub fn add_molecule(
        &mut self,
        radius: f32,
        mass: f32,
        color: Option<Rgb>,
        position: Vec2,
    ) -> Result<MoleculeId> {
        if !self.bounds.contains_circle(position, radius.max(0.0)) {
            return Err(SandboxError::OutOfBounds { position });
        }
        let molecule = Molecule::create(&mut self.space, radius, mass, color, position)?;
        let id = molecule.id();
        self.molecules.insert(id, molecule);
        Ok(id)
    }

    /// Create a wave right away, regardless of the spawn policy
    pub fn spawn_wave(&mut self, spawn: WaveSpawn) -> Result<WaveId> {
        if !self.bounds.contains(spawn.position) {
            return Err(SandboxError::OutOfBounds {
                position: spawn.position,
            });
        }
        let wave = Wave::create(&mut self.space, spawn)?;
        let id = wave.id();
        self.waves.push(wave);
        Ok(id)
    }

    /// Timer hook: spawn a wave on the next step if none is active then
    pub fn request_wave_spawn(&mut self) {
        self.spawn_requested = true;
    }

    fn random_wave(&mut self) -> WaveSpawn {
        let params = &self.wave_params;
        let rng = &mut self.rng;

        let speed = rng.gen_range(params.speed.min..=params.speed.max);
        let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };

        WaveSpawn {
            position: Vec2::new(
                rng.gen_range(0.0..=self.bounds.width),
                rng.gen_range(0.0..=self.bounds.height),
            ),
            radius: rng.gen_range(params.radius.min..=params.radius.max),
            impulse_strength: rng.gen_range(params.impulse_strength.min..=params.impulse_strength.max),
            velocity: Vec2::new(speed * sign, 0.0),
        }
    }

    /// Advance the simulation by `game_speed` backend steps of `dt`, then
    /// refresh the visible set around the camera.
    pub fn step_physics(&mut self, dt: f32) -> Result<StepReport> {
        let mut report = StepReport::default();

        for _ in 0..self.game_speed {
            self.tick(dt, &mut report)?;
            report.ticks += 1;
        }

        let region = self.camera.viewport_region().padded(self.query_padding);
        self.visible = self.query_region(region.min, region.max)?.into();

        Ok(report)
    }

    fn tick(&mut self, dt: f32, report: &mut StepReport) -> Result<()> {
        let contacts = self.space.step(dt)?;

        for contact in contacts {
            let Some(wave) = self.waves.iter_mut().find(|w| w.id() == contact.wave) else {
                continue;
            };
            let Some(molecule) = self.molecules.get(&contact.molecule) else {
                continue;
            };
            if let Some(applied) = collision::resolve_contact(wave, molecule, &mut self.space)? {
                report.impulses.push(applied);
            }
        }

        for molecule in self.molecules.values_mut() {
            molecule.on_step(&self.space);
        }

        if std::mem::take(&mut self.spawn_requested) && self.waves.is_empty() {
            let spawn = self.random_wave();
            let id = self.spawn_wave(spawn)?;
            log::info!(
                "{} spawned at ({:.0}, {:.0}), radius {:.0}, impulse {:.1}",
                id,
                spawn.position.x,
                spawn.position.y,
                spawn.radius,
                spawn.impulse_strength
            );
            report.waves_spawned.push(id);
        }

        let mut index = 0;
        while index < self.waves.len() {
            match self.waves[index].update_physics(&mut self.space, dt)? {
                WaveState::Growing => index += 1,
                WaveState::Expired => {
                    let wave = self.waves.remove(index);
                    let id = wave.id();
                    log::info!(
                        "{} expired after influencing {} molecules",
                        id,
                        wave.influenced().len()
                    );
                    wave.remove(&mut self.space)?;
                    report.waves_expired.push(id);
                }
            }
        }

        Ok(())
    }

    /// Every molecule whose bounding box touches `[min, max]`, edges inclusive
    pub fn query_region(&self, min: Vec2, max: Vec2) -> Result<Vec<MoleculeView>> {
        let mut views = Vec::new();
        for kind in self.space.kinds_in_aabb(min, max)? {
            if let BodyKind::Molecule(id) = kind {
                if let Some(molecule) = self.molecules.get(&id) {
                    views.push(molecule.view(&self.space)?);
                }
            }
        }
        Ok(views)
    }

    /// Move the camera from directional input
    pub fn step_camera(&mut self, input: &CameraInput, dt: f32) {
        self.camera.step(input, dt, self.bounds);
    }

    /// Lower the game speed by one when the frame rate is too low. There is
    /// no automatic way back up.
    pub fn adapt_game_speed(&mut self, fps: f32) -> u32 {
        self.game_speed = throttled_game_speed(self.game_speed, fps, self.low_fps_threshold);
        self.game_speed
    }

    pub fn set_game_speed(&mut self, speed: u32) {
        self.game_speed = speed.max(1);
    }

    pub fn game_speed(&self) -> u32 {
        self.game_speed
    }

    /// Release the backend; every later step or query fails
    pub fn shutdown(&mut self) {
        self.space.teardown();
    }

    pub fn visible(&self) -> Arc<[MoleculeView]> {
        Arc::clone(&self.visible)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera_position(&mut self, position: Vec2) {
        self.camera.position = position.clamp(Vec2::ZERO, self.camera.max_position(self.bounds));
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn molecule(&self, id: MoleculeId) -> Option<&Molecule> {
        self.molecules.get(&id)
    }

    pub fn molecules(&self) -> impl Iterator<Item = &Molecule> {
        self.molecules.values()
    }

    pub fn molecule_count(&self) -> usize {
        self.molecules.len()
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn wall_views(&self) -> Vec<WallView> {
        self.walls.iter().map(Wall::view).collect()
    }
}
