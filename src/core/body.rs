use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

use super::types::Velocity;
use crate::utils::allocator::Arena;

/// Rigid-body state the collision core reads and partially mutates.
///
/// The solver reads mass, inertia, and center of mass, and writes linear
/// (and optionally angular) velocity. Everything else about a body lives
/// with the external scene management.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RigidBodyState {
    /// Kinematic bodies have infinite mass: they push, but are never pushed.
    pub is_kinematic: bool,
    pub inverse_mass: f32,
    pub center_of_mass: Vec3,
    pub inverse_inertia: Mat3,
    pub velocity: Velocity,
}

impl Default for RigidBodyState {
    fn default() -> Self {
        Self {
            is_kinematic: false,
            inverse_mass: 1.0,
            center_of_mass: Vec3::ZERO,
            inverse_inertia: Mat3::ZERO,
            velocity: Velocity::default(),
        }
    }
}

impl RigidBodyState {
    pub fn dynamic(mass: f32, center_of_mass: Vec3) -> Self {
        let inverse_mass = if mass.abs() < f32::EPSILON {
            0.0
        } else {
            1.0 / mass
        };
        Self {
            is_kinematic: false,
            inverse_mass,
            center_of_mass,
            ..Self::default()
        }
    }

    pub fn kinematic(center_of_mass: Vec3) -> Self {
        Self {
            is_kinematic: true,
            inverse_mass: 0.0,
            center_of_mass,
            ..Self::default()
        }
    }

    pub fn with_linear_velocity(mut self, linear: Vec3) -> Self {
        self.velocity.linear = linear;
        self
    }

    /// Inverse inertia for a solid sphere, for callers that enable the
    /// angular contact response.
    pub fn with_sphere_inertia(mut self, radius: f32, mass: f32) -> Self {
        let inertia = 0.4 * mass * radius * radius;
        self.inverse_inertia = if inertia.abs() < f32::EPSILON {
            Mat3::ZERO
        } else {
            Mat3::from_diagonal(Vec3::splat(1.0 / inertia))
        };
        self
    }
}

/// Keyed storage for rigid-body state, the one structure shared across steps.
pub type BodyStore = Arena<RigidBodyState>;
