//! Tuning configuration for the collision/dynamics core.

use serde::{Deserialize, Serialize};

use crate::core::types::Aabb;
use glam::Vec3;

/// Number of sequential-impulse iterations performed per step.
pub const DEFAULT_SOLVER_ITERATIONS: u32 = 6;

/// Baumgarte positional-stabilization bias factor.
pub const DEFAULT_BAUMGARTE_BIAS: f32 = 0.01;

/// Parallel-for batch size for the broad-phase pair query.
pub const DEFAULT_BROADPHASE_BATCH_SIZE: usize = 32;

/// Parallel-for batch size for narrow-phase contact generation.
pub const DEFAULT_NARROWPHASE_BATCH_SIZE: usize = 32;

/// Default integration timestep (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Caller-supplied tuning parameters, applied once per pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub solver_iterations: u32,
    pub baumgarte_bias: f32,
    pub broadphase_batch_size: usize,
    pub narrowphase_batch_size: usize,
    /// Working volume mapped onto the unit cube before Morton quantization.
    /// Centers outside the bounds clamp to the nearest cell; that degrades
    /// sort quality but never correctness.
    pub scene_bounds: Aabb,
    /// When enabled, contacts use each body's real inverse inertia tensor and
    /// write angular velocity corrections back. Disabled by default: the
    /// reference behavior treats contacts as linear-only, which changes
    /// observable resting-contact behavior if flipped.
    pub angular_response: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            solver_iterations: DEFAULT_SOLVER_ITERATIONS,
            baumgarte_bias: DEFAULT_BAUMGARTE_BIAS,
            broadphase_batch_size: DEFAULT_BROADPHASE_BATCH_SIZE,
            narrowphase_batch_size: DEFAULT_NARROWPHASE_BATCH_SIZE,
            scene_bounds: Aabb::new(Vec3::ZERO, Vec3::ONE),
            angular_response: false,
        }
    }
}

impl SimulationConfig {
    pub fn with_scene_bounds(mut self, bounds: Aabb) -> Self {
        self.scene_bounds = bounds;
        self
    }

    pub fn with_solver_iterations(mut self, iterations: u32) -> Self {
        self.solver_iterations = iterations;
        self
    }
}
