//! Physics worker - the free-running simulation thread

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use web_time::Instant;

use super::shared::Simulation;
use super::ticker::Ticker;
use crate::error::{Result, SandboxError};
use crate::ui::StatsCollector;

/// Shortest real-time gap worth a backend step
const MIN_STEP: Duration = Duration::from_millis(1);

/// Handle to the running physics thread
pub struct PhysicsWorker {
    simulation: Arc<Simulation>,
    handle: Option<JoinHandle<Result<()>>>,
}

impl PhysicsWorker {
    /// Start stepping `simulation` on a new thread
    pub fn spawn(simulation: Arc<Simulation>) -> Result<Self> {
        let shared = Arc::clone(&simulation);
        let handle = thread::Builder::new()
            .name("physics".into())
            .spawn(move || run(&shared))
            .map_err(SandboxError::WorkerSpawn)?;

        log::info!("Physics worker started");
        Ok(Self {
            simulation,
            handle: Some(handle),
        })
    }

    pub fn simulation(&self) -> &Arc<Simulation> {
        &self.simulation
    }

    /// True once the loop has exited, by request or by error
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Request shutdown and wait for the loop to exit
    pub fn stop(mut self) -> Result<()> {
        self.simulation.request_shutdown();
        self.join()
    }

    fn join(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let result = handle.join().map_err(|_| SandboxError::WorkerPanicked)?;
        log::info!("Physics worker stopped");
        result
    }
}

impl Drop for PhysicsWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.simulation.request_shutdown();
            if let Err(e) = self.join() {
                log::error!("Physics worker ended with error: {}", e);
            }
        }
    }
}

/// Split `dt` into the fewest equal steps no longer than `max_step`
fn substeps(dt: f32, max_step: f32) -> (u32, f32) {
    let count = (dt / max_step).ceil().max(1.0) as u32;
    (count, dt / count as f32)
}

/// Worker loop; a failed step tears the space down and ends the loop
fn run(simulation: &Simulation) -> Result<()> {
    let config = simulation.config();
    let max_dt = config.physics.max_dt;
    let max_substep_dt = config.physics.max_substep_dt;
    let spawn_waves = config.waves.enabled;

    let mut spawn_ticker = Ticker::from_secs(config.waves.spawn_interval_secs);
    let mut stats_ticker = Ticker::from_secs(config.runtime.stats_interval_secs);
    let mut timing = StatsCollector::new();
    let mut last = Instant::now();

    while !simulation.is_shutdown() {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(last);
        if elapsed < MIN_STEP {
            thread::sleep(MIN_STEP - elapsed);
            continue;
        }
        last = now;
        let dt = elapsed.as_secs_f32().min(max_dt);

        if spawn_waves && spawn_ticker.poll_at(now).is_some() {
            simulation.request_wave_spawn();
        }

        let (count, step_dt) = substeps(dt, max_substep_dt);
        timing.begin_sim();
        for _ in 0..count {
            if let Err(e) = simulation.step(step_dt) {
                log::error!("Physics step failed, stopping worker: {}", e);
                simulation.teardown();
                simulation.request_shutdown();
                return Err(e);
            }
        }
        timing.end_sim();

        if let Some(window) = stats_ticker.poll_at(now) {
            let sim_time_ms = timing.stats().sim_time_ms;
            simulation.refresh_stats(window);
            simulation.update_stats(|stats| stats.sim_time_ms = sim_time_ms);
            let stats = simulation.stats();
            log::debug!(
                "Physics: {:.0} updates/s, {:.2} ms/iteration, {} molecules, {} waves, speed {}",
                stats.physics_updates_per_sec,
                stats.sim_time_ms,
                stats.molecule_count,
                stats.wave_count,
                stats.game_speed
            );
        }
    }

    simulation.teardown();
    Ok(())
}
