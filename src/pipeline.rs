//! Per-step collision pipeline.
//!
//! One step runs the stages in fixed dependency order, each a function from
//! immutable inputs to owned outputs: spatial keys → radix sort → hierarchy
//! build → pair query → narrow phase → constraint build → impulse solve.
//! Queue-to-array compaction sits between the parallel stages so the next
//! stage always runs over a known-size index range.

use std::collections::HashMap;
use std::time::Instant;

use crate::collision::broadphase::{BroadPhase, CollisionPair};
use crate::collision::narrowphase::{ContactManifold, NarrowPhase};
use crate::config::SimulationConfig;
use crate::core::body::BodyStore;
use crate::core::types::Volume;
use crate::dynamics::constraint::{build_contact_constraints, ContactConstraint};
use crate::dynamics::solver::SequentialImpulseSolver;
use crate::utils::allocator::EntityId;
use crate::utils::logging::{warn_if_step_exceeds_timestep, ScopedTimer};

/// Per-step stage counts, reported from [`CollisionPipeline::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepSummary {
    pub volume_count: usize,
    pub pair_count: usize,
    pub manifold_count: usize,
    pub constraint_count: usize,
    pub solver_iterations: u32,
}

/// Owns the stage drivers and the per-step intermediate arrays.
///
/// The pair and manifold arrays are kept on the pipeline after each step so
/// alternate narrow phases or solvers can consume them; they are rebuilt from
/// scratch every step. Only the body store persists across steps.
pub struct CollisionPipeline {
    config: SimulationConfig,
    broadphase: BroadPhase,
    narrowphase: NarrowPhase,
    solver: SequentialImpulseSolver,
    pairs: Vec<CollisionPair>,
    manifolds: Vec<ContactManifold>,
    constraints: Vec<ContactConstraint>,
    volume_index: HashMap<EntityId, usize>,
}

impl Default for CollisionPipeline {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl CollisionPipeline {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            broadphase: BroadPhase::new(&config),
            narrowphase: NarrowPhase::new(config.narrowphase_batch_size),
            solver: SequentialImpulseSolver::new(&config),
            pairs: Vec::new(),
            manifolds: Vec::new(),
            constraints: Vec::new(),
            volume_index: HashMap::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Runs one collision/solve step over this frame's volumes, mutating the
    /// stored body velocities as its terminal output.
    pub fn step(&mut self, volumes: &[Volume], bodies: &mut BodyStore, dt: f32) -> StepSummary {
        let frame_start = Instant::now();

        self.pairs.clear();
        self.manifolds.clear();
        self.constraints.clear();
        self.volume_index.clear();

        if volumes.is_empty() {
            return StepSummary::default();
        }

        {
            let _timer = ScopedTimer::new("broadphase");
            self.pairs = self.broadphase.find_pairs(volumes);
        }

        {
            let _timer = ScopedTimer::new("narrowphase");
            self.volume_index
                .extend(volumes.iter().enumerate().map(|(i, v)| (v.id, i)));
            self.manifolds =
                self.narrowphase
                    .generate(&self.pairs, volumes, &self.volume_index, bodies);
        }

        {
            let _timer = ScopedTimer::new("constraints::build");
            self.constraints = build_contact_constraints(&self.manifolds, bodies);
        }

        let solver_iterations = if self.constraints.is_empty() {
            0
        } else {
            let _timer = ScopedTimer::new("solver");
            self.solver.solve(bodies, &self.constraints, dt);
            self.config.solver_iterations
        };

        warn_if_step_exceeds_timestep(frame_start.elapsed(), dt);

        StepSummary {
            volume_count: volumes.len(),
            pair_count: self.pairs.len(),
            manifold_count: self.manifolds.len(),
            constraint_count: self.constraints.len(),
            solver_iterations,
        }
    }

    /// Candidate pairs from the last step, consumable by any narrow phase.
    pub fn collision_pairs(&self) -> &[CollisionPair] {
        &self.pairs
    }

    /// Contact manifolds from the last step, consumable by any solver.
    pub fn manifolds(&self) -> &[ContactManifold] {
        &self.manifolds
    }

    pub fn constraints(&self) -> &[ContactConstraint] {
        &self.constraints
    }
}
