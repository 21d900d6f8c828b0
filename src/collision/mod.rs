//! Collision detection stages: spatial keys, radix sort, hierarchy build,
//! pair query, and narrow-phase contact generation.

pub mod broadphase;
pub mod bvh;
pub mod morton;
pub mod narrowphase;
pub mod radix;

pub use broadphase::{query_pairs, BroadPhase, CollisionPair};
pub use bvh::{BvhNode, LinearBvh};
pub use morton::SpatialKeyBuilder;
pub use narrowphase::{ContactManifold, NarrowPhase};
pub use radix::IndexedRadixSorter;
