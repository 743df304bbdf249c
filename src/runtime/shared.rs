//! Shared state between the physics worker and the render loop
//!
//! The physics worker is the only regular user of the world lock. The render
//! side reads the camera, the visible set and the stats, each swapped as a
//! whole value, and writes the camera and game speed back.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use crate::config::SandboxConfig;
use crate::error::Result;
use crate::particles::MoleculeView;
use crate::ui::{SimulationStats, StatsCollector};
use crate::world::{
    throttled_game_speed, Camera, CameraInput, StepReport, WallView, World, WorldBounds,
};

pub struct Simulation {
    world: Mutex<World>,
    camera: RwLock<Camera>,
    visible: RwLock<Arc<[MoleculeView]>>,
    stats: RwLock<SimulationStats>,

    walls: Arc<[WallView]>,
    bounds: WorldBounds,
    config: SandboxConfig,

    game_speed: AtomicU32,
    spawn_requested: AtomicBool,
    /// Backend steps since the last stats refresh
    pending_updates: AtomicU64,
    shutdown: AtomicBool,
}

impl Simulation {
    /// Build the world described by `config`
    pub fn new(config: SandboxConfig) -> Result<Self> {
        let world = World::new(&config)?;
        Ok(Self::from_world(world, config))
    }

    /// Wrap an existing world
    pub fn from_world(world: World, config: SandboxConfig) -> Self {
        let stats = SimulationStats {
            molecule_count: world.molecule_count(),
            wave_count: world.wave_count(),
            game_speed: world.game_speed(),
            ..Default::default()
        };

        Self {
            camera: RwLock::new(*world.camera()),
            visible: RwLock::new(world.visible()),
            stats: RwLock::new(stats),
            walls: world.wall_views().into(),
            bounds: world.bounds(),
            game_speed: AtomicU32::new(world.game_speed()),
            spawn_requested: AtomicBool::new(false),
            pending_updates: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
            world: Mutex::new(world),
            config,
        }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Exclusive access to the world. A panicked holder does not poison it.
    pub fn lock_world(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// One `step_physics` call with the latest camera, game speed and spawn
    /// request, publishing the new visible set.
    pub fn step(&self, dt: f32) -> Result<StepReport> {
        let camera = self.camera();
        let mut world = self.lock_world();

        world.set_camera_position(camera.position);
        world.set_game_speed(self.game_speed());
        if self.spawn_requested.swap(false, Ordering::AcqRel) {
            world.request_wave_spawn();
        }

        let report = world.step_physics(dt)?;
        let visible = world.visible();
        drop(world);

        self.publish_visible(visible);
        self.pending_updates
            .fetch_add(u64::from(report.ticks), Ordering::Relaxed);
        Ok(report)
    }

    /// Recompute the world counters over the last `window`
    pub fn refresh_stats(&self, window: Duration) {
        let updates = self.pending_updates.swap(0, Ordering::Relaxed);
        let mut collector = StatsCollector::new();
        {
            let world = self.lock_world();
            collector.collect_world_stats(&world, updates, window);
        }
        let counters = collector.stats();

        self.update_stats(|stats| {
            stats.molecule_count = counters.molecule_count;
            stats.wave_count = counters.wave_count;
            stats.game_speed = counters.game_speed;
            stats.physics_updates_per_sec = counters.physics_updates_per_sec;
        });
    }

    /// Release the backend. Later steps fail.
    pub fn teardown(&self) {
        self.lock_world().shutdown();
        self.publish_visible(Arc::from(Vec::new()));
    }

    pub fn camera(&self) -> Camera {
        *self.camera.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move the shared camera; the worker picks it up on its next step
    pub fn step_camera(&self, input: &CameraInput, dt: f32) -> Camera {
        let mut camera = self.camera.write().unwrap_or_else(PoisonError::into_inner);
        camera.step(input, dt, self.bounds);
        *camera
    }

    pub fn visible(&self) -> Arc<[MoleculeView]> {
        Arc::clone(&self.visible.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn publish_visible(&self, visible: Arc<[MoleculeView]>) {
        *self.visible.write().unwrap_or_else(PoisonError::into_inner) = visible;
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update_stats(&self, f: impl FnOnce(&mut SimulationStats)) {
        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut stats);
    }

    pub fn walls(&self) -> Arc<[WallView]> {
        Arc::clone(&self.walls)
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn game_speed(&self) -> u32 {
        self.game_speed.load(Ordering::Relaxed)
    }

    pub fn set_game_speed(&self, speed: u32) {
        self.game_speed.store(speed.max(1), Ordering::Relaxed);
        self.update_stats(|stats| stats.game_speed = speed.max(1));
    }

    /// Render-side throttle, see [`throttled_game_speed`]
    pub fn adapt_game_speed(&self, fps: f32) -> u32 {
        let threshold = self.config.runtime.low_fps_threshold;
        let mut current = self.game_speed();
        let speed = loop {
            let next = throttled_game_speed(current, fps, threshold);
            match self.game_speed.compare_exchange(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break next,
                Err(actual) => current = actual,
            }
        };
        self.update_stats(|stats| stats.game_speed = speed);
        speed
    }

    pub fn request_wave_spawn(&self) {
        self.spawn_requested.store(true, Ordering::Release);
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}
