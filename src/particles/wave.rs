//! Wave - an expanding, decaying sensor ring
//!
//! A wave grows at a fixed rate while its velocity, impulse strength and
//! influence range decay. It never collides physically; its sensor only
//! reports molecules, and each molecule receives at most one impulse from it.

use glam::Vec2;
use rapier2d::prelude::*;
use std::collections::HashSet;

use super::{MoleculeId, WaveId};
use crate::error::{Result, SandboxError};
use crate::physics::{layers, BodyHandles, BodyKind, Space};

/// Parameters of a wave at creation time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSpawn {
    pub position: Vec2,
    pub radius: f32,
    pub impulse_strength: f32,
    pub velocity: Vec2,
}

/// Lifecycle of a wave after a physics update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveState {
    /// Expanding and decaying
    Growing,
    /// Below the velocity or impulse threshold, must be removed
    Expired,
}

pub struct Wave {
    id: WaveId,
    radius: f32,
    impulse_strength: f32,
    rate: f32,
    influence_range: f32,
    handles: BodyHandles,
    influenced: HashSet<MoleculeId>,
}

impl Wave {
    /// Radius growth in world units per second
    pub const GROWTH_RATE: f32 = 100.0;
    /// Fraction of speed kept per second
    pub const SLOWDOWN_RATE: f32 = 0.98;
    pub const VELOCITY_THRESHOLD: f32 = 0.1;
    pub const IMPULSE_THRESHOLD: f32 = 1.0;
    pub const INITIAL_INFLUENCE_RANGE: f32 = 10.0;

    /// Register a kinematic body with a sensor ball
    pub fn create(space: &mut Space, spawn: WaveSpawn) -> Result<Self> {
        if !(spawn.radius.is_finite() && spawn.radius >= 0.0) {
            return Err(SandboxError::InvalidParameter {
                what: "wave radius",
                value: spawn.radius,
            });
        }
        let impulse_strength = SandboxError::require_positive("wave impulse", spawn.impulse_strength)?;
        if !spawn.position.is_finite() {
            return Err(SandboxError::OutOfBounds {
                position: spawn.position,
            });
        }

        let id = WaveId::new();
        let body = RigidBodyBuilder::kinematic_velocity_based()
            .translation(vector![spawn.position.x, spawn.position.y])
            .linvel(vector![spawn.velocity.x, spawn.velocity.y])
            .build();
        let collider = ColliderBuilder::ball(spawn.radius)
            .sensor(true)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .collision_groups(layers::waves())
            .build();
        let handles = space.insert(body, collider, BodyKind::Wave(id))?;

        log::debug!(
            "{}: spawned at {} radius={:.0} impulse={:.1} velocity={}",
            id,
            spawn.position,
            spawn.radius,
            impulse_strength,
            spawn.velocity
        );

        Ok(Self {
            id,
            radius: spawn.radius,
            impulse_strength,
            rate: 1.0,
            influence_range: Self::INITIAL_INFLUENCE_RANGE,
            handles,
            influenced: HashSet::new(),
        })
    }

    /// Grow and decay by one step of `dt` seconds
    pub fn update_physics(&mut self, space: &mut Space, dt: f32) -> Result<WaveState> {
        self.rate *= 1.0 - (1.0 - Self::SLOWDOWN_RATE) * dt;

        let velocity = space.velocity(&self.handles)? * self.rate;
        space.set_velocity(&self.handles, velocity)?;
        self.impulse_strength *= self.rate;
        self.influence_range *= self.rate;

        self.radius += Self::GROWTH_RATE * dt;
        space.set_ball_radius(&self.handles, self.radius)?;

        let stalled = velocity.x.abs() < Self::VELOCITY_THRESHOLD
            && velocity.y.abs() < Self::VELOCITY_THRESHOLD;
        if stalled || self.impulse_strength < Self::IMPULSE_THRESHOLD {
            Ok(WaveState::Expired)
        } else {
            Ok(WaveState::Growing)
        }
    }

    /// Unregister from the backend. Consumes the wave.
    pub fn remove(mut self, space: &mut Space) -> Result<()> {
        self.influenced.clear();
        log::debug!("{}: removed at radius {:.0}", self.id, self.radius);
        space.remove(self.handles)
    }

    /// Record `molecule` as influenced. Returns false if it already was.
    pub(crate) fn mark_influenced(&mut self, molecule: MoleculeId) -> bool {
        self.influenced.insert(molecule)
    }

    pub fn has_influenced(&self, molecule: MoleculeId) -> bool {
        self.influenced.contains(&molecule)
    }

    pub fn influenced(&self) -> &HashSet<MoleculeId> {
        &self.influenced
    }

    pub fn id(&self) -> WaveId {
        self.id
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn impulse_strength(&self) -> f32 {
        self.impulse_strength
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn influence_range(&self) -> f32 {
        self.influence_range
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
}

impl std::fmt::Debug for Wave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wave")
            .field("id", &self.id)
            .field("radius", &self.radius)
            .field("impulse_strength", &self.impulse_strength)
            .field("rate", &self.rate)
            .field("influenced", &self.influenced.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(velocity: Vec2, impulse_strength: f32) -> WaveSpawn {
        WaveSpawn {
            position: Vec2::new(500.0, 500.0),
            radius: 100.0,
            impulse_strength,
            velocity,
        }
    }

    #[test]
    fn test_create_registers_sensor() {
        let mut space = Space::new(0).unwrap();
        let wave = Wave::create(&mut space, spawn(Vec2::new(10.0, 0.0), 100.0)).unwrap();

        assert_eq!(space.body_count(), 1);
        assert_eq!(wave.rate(), 1.0);
        assert_eq!(wave.influence_range(), Wave::INITIAL_INFLUENCE_RANGE);
        assert_eq!(space.ball_radius(wave.handles()).unwrap(), Some(100.0));
    }

    #[test]
    fn test_update_grows_and_decays() {
        let mut space = Space::new(0).unwrap();
        let mut wave = Wave::create(&mut space, spawn(Vec2::new(50.0, 0.0), 100.0)).unwrap();
        let dt = 1.0 / 60.0;

        let mut radius = wave.radius();
        let mut impulse = wave.impulse_strength();
        let mut speed = wave.velocity(&space).unwrap().length();

        for _ in 0..60 {
            space.step(dt).unwrap();
            assert_eq!(wave.update_physics(&mut space, dt).unwrap(), WaveState::Growing);

            assert!(wave.radius() > radius);
            assert!(wave.impulse_strength() <= impulse);
            let new_speed = wave.velocity(&space).unwrap().length();
            assert!(new_speed <= speed);
            // Sensor shape follows the logical radius
            assert_eq!(space.ball_radius(wave.handles()).unwrap(), Some(wave.radius()));

            radius = wave.radius();
            impulse = wave.impulse_strength();
            speed = new_speed;
        }

        assert!((wave.radius() - 200.0).abs() < 0.01);
        assert!(wave.rate() < 1.0);
    }

    #[test]
    fn test_expires_when_stalled() {
        let mut space = Space::new(0).unwrap();
        // Both axes below the threshold
        let mut wave = Wave::create(&mut space, spawn(Vec2::new(0.05, 0.05), 100.0)).unwrap();
        assert_eq!(wave.update_physics(&mut space, 0.01).unwrap(), WaveState::Expired);
    }

    #[test]
    fn test_single_slow_axis_does_not_expire() {
        let mut space = Space::new(0).unwrap();
        let mut wave = Wave::create(&mut space, spawn(Vec2::new(0.05, 20.0), 100.0)).unwrap();
        assert_eq!(wave.update_physics(&mut space, 0.01).unwrap(), WaveState::Growing);
    }

    #[test]
    fn test_expires_when_impulse_is_spent() {
        let mut space = Space::new(0).unwrap();
        // Fast wave, weak impulse: the impulse check alone forces expiry
        let mut wave = Wave::create(&mut space, spawn(Vec2::new(500.0, 0.0), 0.99)).unwrap();
        assert_eq!(wave.update_physics(&mut space, 0.01).unwrap(), WaveState::Expired);
    }

    #[test]
    fn test_eventually_expires() {
        let mut space = Space::new(0).unwrap();
        let mut wave = Wave::create(&mut space, spawn(Vec2::new(40.0, 0.0), 150.0)).unwrap();
        let dt = 1.0 / 60.0;

        let mut steps = 0;
        while wave.update_physics(&mut space, dt).unwrap() == WaveState::Growing {
            space.step(dt).unwrap();
            steps += 1;
            assert!(steps < 10_000, "wave never expired");
        }
        wave.remove(&mut space).unwrap();
        assert_eq!(space.body_count(), 0);
    }

    #[test]
    fn test_mark_influenced_once() {
        let mut space = Space::new(0).unwrap();
        let mut wave = Wave::create(&mut space, spawn(Vec2::X, 100.0)).unwrap();
        let molecule = MoleculeId::new();

        assert!(!wave.has_influenced(molecule));
        assert!(wave.mark_influenced(molecule));
        assert!(!wave.mark_influenced(molecule));
        assert_eq!(wave.influenced().len(), 1);
    }

    #[test]
    fn test_create_rejects_bad_parameters() {
        let mut space = Space::new(0).unwrap();
        let mut bad = spawn(Vec2::X, 100.0);
        bad.radius = -1.0;
        assert!(Wave::create(&mut space, bad).is_err());

        let mut bad = spawn(Vec2::X, 100.0);
        bad.impulse_strength = 0.0;
        assert!(Wave::create(&mut space, bad).is_err());
        assert_eq!(space.body_count(), 0);
    }
}
