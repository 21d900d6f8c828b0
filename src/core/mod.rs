//! Core types describing bounding volumes and rigid-body state.

pub mod body;
pub mod types;

pub use body::{BodyStore, RigidBodyState};
pub use types::{Aabb, ShapeKind, Velocity, Volume};
