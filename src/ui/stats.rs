//! Performance and simulation statistics tracking

use crate::world::World;
use std::collections::VecDeque;
use std::time::Duration;
use web_time::Instant;

/// Frames kept for the rolling fps average
const FRAME_WINDOW: usize = 60;

/// Simulation statistics
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationStats {
    // Performance
    pub fps: f32,
    pub frame_time_ms: f32,
    pub sim_time_ms: f32,
    pub physics_updates_per_sec: f32,

    // World state
    pub molecule_count: usize,
    pub wave_count: usize,
    pub game_speed: u32,
}

/// Stats collector with timing and aggregation
pub struct StatsCollector {
    stats: SimulationStats,
    frame_times: VecDeque<f32>,
    last_frame_instant: Instant,
    sim_start: Option<Instant>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            stats: SimulationStats::default(),
            frame_times: VecDeque::with_capacity(FRAME_WINDOW),
            last_frame_instant: Instant::now(),
            sim_start: None,
        }
    }

    /// Begin a new frame
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_instant).as_secs_f32() * 1000.0;
        self.last_frame_instant = now;
        self.record_frame_time(frame_time);
    }

    /// Push one frame duration and recompute fps from the rolling average
    pub fn record_frame_time(&mut self, frame_time_ms: f32) {
        self.frame_times.push_back(frame_time_ms);
        if self.frame_times.len() > FRAME_WINDOW {
            self.frame_times.pop_front();
        }

        let avg_frame_time: f32 =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        self.stats.fps = if avg_frame_time > 0.0 {
            1000.0 / avg_frame_time
        } else {
            0.0
        };
        self.stats.frame_time_ms = avg_frame_time;
    }

    /// Mark start of simulation update
    pub fn begin_sim(&mut self) {
        self.sim_start = Some(Instant::now());
    }

    /// Mark end of simulation update
    pub fn end_sim(&mut self) {
        if let Some(start) = self.sim_start.take() {
            self.stats.sim_time_ms = start.elapsed().as_secs_f32() * 1000.0;
        }
    }

    /// Collect world counters; `updates` backend steps ran during `window`
    pub fn collect_world_stats(&mut self, world: &World, updates: u64, window: Duration) {
        self.stats.molecule_count = world.molecule_count();
        self.stats.wave_count = world.wave_count();
        self.stats.game_speed = world.game_speed();

        let secs = window.as_secs_f32();
        self.stats.physics_updates_per_sec = if secs > 0.0 {
            updates as f32 / secs
        } else {
            0.0
        };
    }

    /// Get current stats
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}
