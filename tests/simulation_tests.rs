//! Integration tests for the world driver and the two runtime timelines

use glam::Vec2;
use std::sync::Arc;
use std::time::Duration;

use hyperlife::config::{ColorMode, SandboxConfig};
use hyperlife::particles::{WaveSpawn, MAX_IMPULSE};
use hyperlife::render::FrameData;
use hyperlife::runtime::HeadlessSession;
use hyperlife::world::{CameraInput, World};
use hyperlife::{PhysicsWorker, SandboxError, Simulation};

fn small_config(count: usize, seed: u64) -> SandboxConfig {
    let mut config = SandboxConfig::default();
    config.world.width = 1000.0;
    config.world.height = 1000.0;
    config.molecules.count = count;
    config.physics.seed = Some(seed);
    config
}

// ============================================================================
// Wave Scenarios
// ============================================================================

#[test]
fn test_wave_edge_reaches_molecule() {
    let mut world = World::new(&small_config(0, 1)).unwrap();
    let molecule = world
        .add_molecule(1.0, 10.0, None, Vec2::new(500.0, 900.0))
        .unwrap();
    let wave = world
        .spawn_wave(WaveSpawn {
            position: Vec2::new(500.0, 500.0),
            radius: 0.0,
            impulse_strength: 100.0,
            velocity: Vec2::new(0.5, 0.0),
        })
        .unwrap();

    // Radius grows by 50 per half-second step and reaches 400 after 8
    let mut hits = Vec::new();
    for step in 1..=12 {
        let report = world.step_physics(0.5).unwrap();
        for applied in report.impulses {
            hits.push((step, applied));
        }
    }

    assert_eq!(hits.len(), 1);
    let (step, applied) = hits[0];
    assert!(step >= 8);
    assert_eq!(applied.wave, wave);
    assert_eq!(applied.molecule, molecule);
    assert!(applied.impulse.y > 0.0);
    assert!(applied.impulse.length() <= 100.0);

    let velocity = world.molecule(molecule).unwrap().velocity(world.space()).unwrap();
    assert!(velocity.y > 0.0);
}

#[test]
fn test_strong_wave_is_clamped() {
    let mut world = World::new(&small_config(0, 2)).unwrap();
    for i in 0..36 {
        let angle = i as f32 * std::f32::consts::TAU / 36.0;
        let position = Vec2::new(500.0, 500.0) + Vec2::from_angle(angle) * 100.0;
        world.add_molecule(1.0, 5.0, None, position).unwrap();
    }
    world
        .spawn_wave(WaveSpawn {
            position: Vec2::new(500.0, 500.0),
            radius: 50.0,
            impulse_strength: 10_000.0,
            velocity: Vec2::new(1.0, 0.0),
        })
        .unwrap();

    let mut count = 0;
    for _ in 0..120 {
        for applied in world.step_physics(1.0 / 60.0).unwrap().impulses {
            assert!(applied.impulse.length() <= MAX_IMPULSE + 1e-2);
            count += 1;
        }
    }
    assert_eq!(count, 36);
}

#[test]
fn test_wave_lifecycle_releases_body() {
    let mut config = small_config(20, 3);
    config.waves.impulse_strength = hyperlife::config::Span::new(5.0, 5.0);
    let mut world = World::new(&config).unwrap();

    world.request_wave_spawn();
    let report = world.step_physics(1.0 / 60.0).unwrap();
    assert_eq!(report.waves_spawned.len(), 1);
    assert_eq!(world.space().body_count(), 21);

    let mut expired = Vec::new();
    for _ in 0..600 {
        expired.extend(world.step_physics(1.0 / 60.0).unwrap().waves_expired);
    }
    assert_eq!(expired, report.waves_spawned);
    assert_eq!(world.wave_count(), 0);
    assert_eq!(world.space().body_count(), 20);
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_same_seed_same_population() {
    let positions = |seed| {
        let world = World::new(&small_config(100, seed)).unwrap();
        let mut positions: Vec<(f32, f32, f32)> = world
            .molecules()
            .map(|m| {
                let p = m.position(world.space()).unwrap();
                (p.x, p.y, m.mass())
            })
            .collect();
        positions.sort_by(|a, b| a.partial_cmp(b).unwrap());
        positions
    };

    assert_eq!(positions(17), positions(17));
    assert_ne!(positions(17), positions(18));
}

#[test]
fn test_world_from_ron_config() {
    let config: SandboxConfig = ron::from_str(
        "(world: (width: 400.0, height: 300.0), molecules: (count: 50, color_mode: Random), physics: (seed: Some(4)))",
    )
    .unwrap();
    config.validate().unwrap();
    assert_eq!(config.molecules.color_mode, ColorMode::Random);

    let world = World::new(&config).unwrap();
    assert_eq!(world.molecule_count(), 50);
    assert_eq!(world.bounds().size(), Vec2::new(400.0, 300.0));
    assert_eq!(world.wall_views().len(), 4);
}

#[test]
fn test_invalid_wave_is_rejected() {
    let mut world = World::new(&small_config(0, 5)).unwrap();
    let outside = world.spawn_wave(WaveSpawn {
        position: Vec2::new(-10.0, 10.0),
        radius: 10.0,
        impulse_strength: 10.0,
        velocity: Vec2::X,
    });
    assert!(matches!(outside, Err(SandboxError::OutOfBounds { .. })));

    let weak = world.spawn_wave(WaveSpawn {
        position: Vec2::new(10.0, 10.0),
        radius: 10.0,
        impulse_strength: -1.0,
        velocity: Vec2::X,
    });
    assert!(matches!(weak, Err(SandboxError::InvalidParameter { .. })));
    assert_eq!(world.wave_count(), 0);
}

// ============================================================================
// Runtime
// ============================================================================

#[test]
fn test_worker_and_render_loop_together() {
    let mut config = small_config(500, 6);
    config.viewport.width = 300.0;
    config.viewport.height = 300.0;
    config.runtime.stats_interval_secs = 0.05;
    let simulation = Arc::new(Simulation::new(config).unwrap());

    let worker = PhysicsWorker::spawn(Arc::clone(&simulation)).unwrap();
    let summary = HeadlessSession::new(Arc::clone(&simulation)).run(Duration::from_millis(400));
    let frame = FrameData::extract(&simulation);
    worker.stop().unwrap();

    assert!(summary.frames > 0);
    assert!(summary.stats.physics_updates_per_sec > 0.0);
    assert!(summary.stats.sim_time_ms > 0.0);
    assert_eq!(summary.stats.molecule_count, 500);

    // The camera only panned right during the first leg
    assert!(frame.camera.position.x > 0.0);
    assert_eq!(frame.camera.position.y, 0.0);
    let region = frame.camera.viewport_region();
    for molecule in &frame.molecules {
        assert!(region.touches_circle(molecule.position, molecule.radius));
    }
}

#[test]
fn test_camera_input_while_worker_runs() {
    let simulation = Arc::new(Simulation::new(small_config(100, 7)).unwrap());
    let worker = PhysicsWorker::spawn(Arc::clone(&simulation)).unwrap();

    let input = CameraInput {
        left: true,
        up: true,
        ..Default::default()
    };
    for _ in 0..10 {
        let camera = simulation.step_camera(&input, 1.0 / 60.0);
        assert_eq!(camera.position, Vec2::ZERO);
        std::thread::sleep(Duration::from_millis(5));
    }

    worker.stop().unwrap();
    assert!(simulation.lock_world().space().is_torn_down());
}
