//! Momentum – collision and contact-solving core for real-time rigid-body
//! simulation.
//!
//! Each step finds all overlapping bounding volumes through a Morton-sorted
//! linear BVH, generates contact manifolds for overlapping shape pairs, and
//! resolves them with an iterative sequential-impulse solver using Baumgarte
//! positional stabilization. Scene management, integration of unconstrained
//! motion, and AABB refitting are external collaborators.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod pipeline;
pub mod utils;

pub use glam::{Mat3, Vec3};

pub use collision::{
    broadphase::{BroadPhase, CollisionPair},
    narrowphase::{ContactManifold, NarrowPhase},
};
pub use config::SimulationConfig;
pub use crate::core::{
    body::{BodyStore, RigidBodyState},
    types::{Aabb, ShapeKind, Velocity, Volume},
};
pub use dynamics::{
    constraint::{ContactConstraint, Jacobian12},
    solver::SequentialImpulseSolver,
};
pub use pipeline::{CollisionPipeline, StepSummary};
pub use utils::allocator::{Arena, EntityId, GenerationalId};

/// High-level convenience wrapper that owns a [`CollisionPipeline`] together
/// with the persistent body store and the current frame's volumes.
pub struct PhysicsEngine {
    pipeline: CollisionPipeline,
    bodies: BodyStore,
    volumes: Vec<Volume>,
    next_volume_index: u32,
}

impl PhysicsEngine {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            pipeline: CollisionPipeline::new(config),
            bodies: BodyStore::new(),
            volumes: Vec::new(),
            next_volume_index: 0,
        }
    }

    /// Adds a rigid body and returns its generated [`EntityId`].
    pub fn add_body(&mut self, body: RigidBodyState) -> EntityId {
        self.bodies.insert(body)
    }

    /// Registers a sphere volume owned by `body` and returns its volume id.
    pub fn add_sphere(&mut self, body: EntityId, center: Vec3, radius: f32) -> EntityId {
        let id = EntityId::from_index(self.next_volume_index);
        self.next_volume_index += 1;
        self.volumes.push(Volume::sphere(id, body, center, radius));
        id
    }

    /// Replaces a volume's AABB, standing in for the external refit stage.
    pub fn refit_volume(&mut self, id: EntityId, aabb: Aabb) {
        if let Some(volume) = self.volumes.iter_mut().find(|volume| volume.id == id) {
            volume.aabb = aabb;
        }
    }

    /// Advances collision detection and contact resolution by `dt` seconds.
    pub fn step(&mut self, dt: f32) -> StepSummary {
        self.pipeline.step(&self.volumes, &mut self.bodies, dt)
    }

    pub fn body(&self, id: EntityId) -> Option<&RigidBodyState> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut RigidBodyState> {
        self.bodies.get_mut(id)
    }

    pub fn pipeline(&self) -> &CollisionPipeline {
        &self.pipeline
    }
}
