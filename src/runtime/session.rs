//! Headless session - the render/input timeline without a window

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use web_time::Instant;

use super::shared::Simulation;
use super::ticker::Ticker;
use crate::render::FrameData;
use crate::ui::{SimulationStats, StatsCollector};
use crate::world::CameraInput;

/// Seconds spent on each leg of the scripted camera pan
const PAN_LEG_SECS: f32 = 4.0;

/// Camera input for a slow clockwise tour: right, down, left, up
pub fn scripted_pan(elapsed: Duration) -> CameraInput {
    let leg = (elapsed.as_secs_f32() / PAN_LEG_SECS) as u64 % 4;
    CameraInput {
        right: leg == 0,
        down: leg == 1,
        left: leg == 2,
        up: leg == 3,
    }
}

/// What a finished session saw
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub frames: u64,
    pub elapsed: Duration,
    pub stats: SimulationStats,
}

pub struct HeadlessSession {
    simulation: Arc<Simulation>,
    collector: StatsCollector,
    log_ticker: Ticker,
    frame_interval: Duration,
}

impl HeadlessSession {
    pub fn new(simulation: Arc<Simulation>) -> Self {
        let runtime = &simulation.config().runtime;
        let frame_interval =
            Duration::try_from_secs_f32(1.0 / runtime.target_fps).unwrap_or(Duration::ZERO);
        let log_ticker = Ticker::from_secs(runtime.stats_interval_secs);

        Self {
            simulation,
            collector: StatsCollector::new(),
            log_ticker,
            frame_interval,
        }
    }

    /// One render frame: move the camera, measure fps, throttle game speed,
    /// then extract what a renderer would draw.
    pub fn frame(&mut self, input: &CameraInput, dt: f32) -> FrameData {
        self.collector.begin_frame();
        let fps = self.collector.stats().fps;
        let frame_time_ms = self.collector.stats().frame_time_ms;

        self.simulation.step_camera(input, dt);
        self.simulation.adapt_game_speed(fps);
        self.simulation.update_stats(|stats| {
            stats.fps = fps;
            stats.frame_time_ms = frame_time_ms;
        });

        FrameData::extract(&self.simulation)
    }

    /// Run frames at the target rate for `duration`, or until the
    /// simulation shuts down
    pub fn run(&mut self, duration: Duration) -> SessionSummary {
        let start = Instant::now();
        let mut last = start;
        let mut frames = 0;

        while !self.simulation.is_shutdown() {
            let now = Instant::now();
            let elapsed = now.duration_since(start);
            if elapsed >= duration {
                break;
            }
            let dt = now.duration_since(last).as_secs_f32();
            last = now;

            let frame = self.frame(&scripted_pan(elapsed), dt);
            frames += 1;

            if self.log_ticker.poll_at(now).is_some() {
                log::info!(
                    "FPS {:.1} | physics {:.0}/s, {:.2} ms | molecules {} ({} on screen) | waves {} | speed {}x | camera ({:.0}, {:.0})",
                    frame.stats.fps,
                    frame.stats.physics_updates_per_sec,
                    frame.stats.sim_time_ms,
                    frame.stats.molecule_count,
                    frame.molecules.len(),
                    frame.stats.wave_count,
                    frame.stats.game_speed,
                    frame.camera.position.x,
                    frame.camera.position.y
                );
            }

            let spent = now.elapsed();
            if spent < self.frame_interval {
                thread::sleep(self.frame_interval - spent);
            }
        }

        SessionSummary {
            frames,
            elapsed: start.elapsed(),
            stats: self.simulation.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxConfig;

    #[test]
    fn test_scripted_pan_legs() {
        assert!(scripted_pan(Duration::from_secs(1)).right);
        assert!(scripted_pan(Duration::from_secs(5)).down);
        assert!(scripted_pan(Duration::from_secs(9)).left);
        assert!(scripted_pan(Duration::from_secs(13)).up);
        assert!(scripted_pan(Duration::from_secs(17)).right);

        let input = scripted_pan(Duration::from_secs(2));
        assert!(!input.left && !input.up && !input.down);
    }

    fn simulation() -> Arc<Simulation> {
        let mut config = SandboxConfig::default();
        config.world.width = 800.0;
        config.world.height = 800.0;
        config.viewport.width = 200.0;
        config.viewport.height = 200.0;
        config.molecules.count = 50;
        config.physics.seed = Some(9);
        Arc::new(Simulation::new(config).unwrap())
    }

    #[test]
    fn test_frame_moves_camera_and_reports_fps() {
        let sim = simulation();
        let mut session = HeadlessSession::new(Arc::clone(&sim));
        let input = CameraInput {
            down: true,
            ..Default::default()
        };

        thread::sleep(Duration::from_millis(10));
        let frame = session.frame(&input, 0.1);
        assert_eq!(frame.camera.position, glam::Vec2::new(0.0, 50.0));
        assert!(frame.stats.fps > 0.0);
        assert_eq!(sim.camera().position, frame.camera.position);
    }

    #[test]
    fn test_low_fps_lowers_game_speed() {
        let sim = simulation();
        sim.set_game_speed(3);
        let mut session = HeadlessSession::new(Arc::clone(&sim));

        // A 200 ms frame is 5 fps
        thread::sleep(Duration::from_millis(200));
        let frame = session.frame(&CameraInput::default(), 0.2);
        assert_eq!(frame.stats.game_speed, 2);
        assert_eq!(sim.game_speed(), 2);
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let sim = simulation();
        sim.request_shutdown();
        let summary = HeadlessSession::new(sim).run(Duration::from_secs(10));
        assert_eq!(summary.frames, 0);
    }

    #[test]
    fn test_run_for_duration() {
        let summary = HeadlessSession::new(simulation()).run(Duration::from_millis(150));
        assert!(summary.frames > 0);
        assert!(summary.elapsed >= Duration::from_millis(150));
    }
}
