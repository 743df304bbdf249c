//! Rigid body space backed by rapier2d

use glam::Vec2;
use rapier2d::parry::bounding_volume::{Aabb, BoundingVolume};
use rapier2d::prelude::*;
use std::collections::HashMap;

use super::events::{SensorContact, SensorEventCollector};
use crate::error::{Result, SandboxError};
use crate::particles::{MoleculeId, WaveId};

fn vec2_to_na(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn na_to_vec2(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// What a collider in the space stands for, fixed when it is inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Molecule(MoleculeId),
    Wave(WaveId),
    /// Index into the world's wall list
    Wall(usize),
}

/// Handles of a body and its single collider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyHandles {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    pub kind: BodyKind,
}

/// Owns the rapier world that every molecule, wave and wall lives in
pub struct Space {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    /// Typed metadata for every collider we inserted
    kinds: HashMap<ColliderHandle, BodyKind>,

    events: SensorEventCollector,

    /// Pool the backend step runs on; `None` uses the caller's thread
    thread_pool: Option<rayon::ThreadPool>,

    torn_down: bool,
}

impl Space {
    /// Create an empty, gravity-free space.
    ///
    /// `threads == 0` steps on the calling thread, otherwise each step runs
    /// inside a dedicated rayon pool of that size.
    pub fn new(threads: usize) -> Result<Self> {
        let thread_pool = if threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("physics-{i}"))
                .build()?;
            log::debug!("Physics: step pool with {} threads", threads);
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            pipeline: PhysicsPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            kinds: HashMap::new(),
            events: SensorEventCollector::new(),
            thread_pool,
            torn_down: false,
        })
    }

    fn ensure_live(&self) -> Result<()> {
        if self.torn_down {
            Err(SandboxError::SpaceTornDown)
        } else {
            Ok(())
        }
    }

    /// Insert a body with exactly one collider
    pub fn insert(&mut self, body: RigidBody, collider: Collider, kind: BodyKind) -> Result<BodyHandles> {
        self.ensure_live()?;
        let body = self.rigid_body_set.insert(body);
        let collider =
            self.collider_set
                .insert_with_parent(collider, body, &mut self.rigid_body_set);
        self.kinds.insert(collider, kind);
        Ok(BodyHandles {
            body,
            collider,
            kind,
        })
    }

    /// Insert a collider without a parent body (never moves)
    pub fn insert_static(&mut self, collider: Collider, kind: BodyKind) -> Result<ColliderHandle> {
        self.ensure_live()?;
        let handle = self.collider_set.insert(collider);
        self.kinds.insert(handle, kind);
        Ok(handle)
    }

    /// Remove a body together with its collider
    pub fn remove(&mut self, handles: BodyHandles) -> Result<()> {
        self.ensure_live()?;
        self.kinds.remove(&handles.collider);
        self.rigid_body_set
            .remove(
                handles.body,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .map(|_| ())
            .ok_or(SandboxError::MissingBody(handles.kind))
    }

    /// Advance the space by `dt` and return the wave/molecule pairs whose
    /// overlap started during this step.
    pub fn step(&mut self, dt: f32) -> Result<Vec<SensorContact>> {
        self.ensure_live()?;
        self.integration_parameters.dt = dt;

        let Self {
            rigid_body_set,
            collider_set,
            pipeline,
            integration_parameters,
            island_manager,
            broad_phase,
            narrow_phase,
            impulse_joint_set,
            multibody_joint_set,
            ccd_solver,
            query_pipeline,
            events,
            thread_pool,
            ..
        } = self;

        let gravity = vector![0.0, 0.0];
        let mut run = || {
            pipeline.step(
                &gravity,
                integration_parameters,
                island_manager,
                broad_phase,
                narrow_phase,
                rigid_body_set,
                collider_set,
                impulse_joint_set,
                multibody_joint_set,
                ccd_solver,
                Some(&mut *query_pipeline),
                &(),
                &*events,
            )
        };
        match thread_pool {
            Some(pool) => pool.install(run),
            None => run(),
        }

        let contacts = self
            .events
            .drain_started()
            .into_iter()
            .filter_map(|(a, b)| self.sensor_contact(a, b))
            .collect();
        Ok(contacts)
    }

    fn sensor_contact(&self, a: ColliderHandle, b: ColliderHandle) -> Option<SensorContact> {
        match (self.kinds.get(&a)?, self.kinds.get(&b)?) {
            (BodyKind::Wave(wave), BodyKind::Molecule(molecule))
            | (BodyKind::Molecule(molecule), BodyKind::Wave(wave)) => Some(SensorContact {
                wave: *wave,
                molecule: *molecule,
            }),
            _ => None,
        }
    }

    fn body(&self, handles: &BodyHandles) -> Result<&RigidBody> {
        self.ensure_live()?;
        self.rigid_body_set
            .get(handles.body)
            .ok_or(SandboxError::MissingBody(handles.kind))
    }

    fn body_mut(&mut self, handles: &BodyHandles) -> Result<&mut RigidBody> {
        self.ensure_live()?;
        self.rigid_body_set
            .get_mut(handles.body)
            .ok_or(SandboxError::MissingBody(handles.kind))
    }

    pub fn position(&self, handles: &BodyHandles) -> Result<Vec2> {
        Ok(na_to_vec2(self.body(handles)?.translation()))
    }

    pub fn velocity(&self, handles: &BodyHandles) -> Result<Vec2> {
        Ok(na_to_vec2(self.body(handles)?.linvel()))
    }

    pub fn set_velocity(&mut self, handles: &BodyHandles, velocity: Vec2) -> Result<()> {
        self.body_mut(handles)?
            .set_linvel(vec2_to_na(velocity), true);
        Ok(())
    }

    /// Apply an instantaneous impulse at the body's center of mass
    pub fn apply_impulse(&mut self, handles: &BodyHandles, impulse: Vec2) -> Result<()> {
        self.body_mut(handles)?
            .apply_impulse(vec2_to_na(impulse), true);
        Ok(())
    }

    /// Replace the collider with a ball of the given radius
    pub fn set_ball_radius(&mut self, handles: &BodyHandles, radius: f32) -> Result<()> {
        self.ensure_live()?;
        let collider = self
            .collider_set
            .get_mut(handles.collider)
            .ok_or(SandboxError::MissingBody(handles.kind))?;
        collider.set_shape(SharedShape::ball(radius));
        Ok(())
    }

    /// Radius of a ball collider, `None` for other shapes
    pub fn ball_radius(&self, handles: &BodyHandles) -> Result<Option<f32>> {
        self.ensure_live()?;
        let collider = self
            .collider_set
            .get(handles.collider)
            .ok_or(SandboxError::MissingBody(handles.kind))?;
        Ok(collider.shape().as_ball().map(|ball| ball.radius))
    }

    /// Every collider whose bounding box touches `[min, max]`.
    ///
    /// Candidates come from the query pipeline's BVH as of the last step and
    /// are confirmed against their current bounding box, edges inclusive.
    pub fn kinds_in_aabb(&self, min: Vec2, max: Vec2) -> Result<Vec<BodyKind>> {
        self.ensure_live()?;
        let region = Aabb::new(point![min.x, min.y], point![max.x, max.y]);
        let mut found = Vec::new();

        self.query_pipeline
            .colliders_with_aabb_intersecting_aabb(&region, |handle| {
                if let (Some(kind), Some(collider)) =
                    (self.kinds.get(handle), self.collider_set.get(*handle))
                {
                    if region.intersects(&collider.compute_aabb()) {
                        found.push(*kind);
                    }
                }
                true
            });

        Ok(found)
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Release every backend resource. All later calls fail with
    /// [`SandboxError::SpaceTornDown`].
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        log::info!(
            "Physics: tearing down space ({} bodies, {} colliders)",
            self.rigid_body_set.len(),
            self.collider_set.len()
        );
        self.rigid_body_set = RigidBodySet::new();
        self.collider_set = ColliderSet::new();
        self.island_manager = IslandManager::new();
        self.broad_phase = BroadPhase::new();
        self.narrow_phase = NarrowPhase::new();
        self.impulse_joint_set = ImpulseJointSet::new();
        self.multibody_joint_set = MultibodyJointSet::new();
        self.query_pipeline = QueryPipeline::new();
        self.kinds.clear();
        self.events.drain_started();
        self.thread_pool = None;
        self.torn_down = true;
    }
}
