//! Sensor event collection
//!
//! rapier calls the event handler from inside `PhysicsPipeline::step`, possibly
//! from a worker thread, so the collector only records collider pairs behind a
//! mutex. Resolution into wave/molecule pairs happens after the step returns.

use rapier2d::prelude::*;
use std::sync::{Mutex, PoisonError};

use crate::particles::{MoleculeId, WaveId};

/// A wave sensor started overlapping a molecule during the last step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorContact {
    pub wave: WaveId,
    pub molecule: MoleculeId,
}

#[derive(Default)]
pub(crate) struct SensorEventCollector {
    started: Mutex<Vec<(ColliderHandle, ColliderHandle)>>,
}

impl SensorEventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pair recorded since the last drain
    pub fn drain_started(&self) -> Vec<(ColliderHandle, ColliderHandle)> {
        std::mem::take(&mut *self.started.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl EventHandler for SensorEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let CollisionEvent::Started(a, b, flags) = event {
            if flags.contains(CollisionEventFlags::SENSOR) {
                self.started
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((a, b));
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}
