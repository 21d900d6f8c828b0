use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::utils::allocator::EntityId;

/// Axis-aligned bounding box represented by component-wise min/max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The empty box: unions with it are identities and overlap tests fail.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// A sphere's refit AABB is exactly center ± radius on every axis.
    pub fn from_sphere(center: Vec3, radius: f32) -> Self {
        Self::from_center_half_extents(center, Vec3::splat(radius))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Per-axis interval intersection on all three axes.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Collision shape category carried alongside each bounding volume so later
/// stages can route pairs to the matching contact routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Sphere,
    Box,
    Capsule,
    ConvexMesh,
    Mesh,
}

/// One collision volume for the current step, produced by the external
/// AABB-refit stage and consumed read-only by the collision core.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Volume {
    pub id: EntityId,
    pub aabb: Aabb,
    pub shape: ShapeKind,
    /// Owning rigid body, looked up in the body store by the narrow phase
    /// and the solver.
    pub body: EntityId,
}

impl Volume {
    pub fn sphere(id: EntityId, body: EntityId, center: Vec3, radius: f32) -> Self {
        Self {
            id,
            aabb: Aabb::from_sphere(center, radius),
            shape: ShapeKind::Sphere,
            body,
        }
    }
}

/// Linear and angular velocity of a rigid body.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_inclusive_of_touching_faces() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Vec3::new(1.1, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn empty_box_is_a_union_identity_and_never_overlaps() {
        let a = Aabb::new(Vec3::splat(-1.0), Vec3::splat(2.0));

        let merged = Aabb::EMPTY.union(&a);
        assert_eq!(merged, a);
        assert!(!Aabb::EMPTY.overlaps(&a));
        assert!(!Aabb::EMPTY.overlaps(&Aabb::EMPTY));
    }

    #[test]
    fn sphere_volume_round_trips_center_and_radius() {
        let volume = Volume::sphere(
            EntityId::from_index(0),
            EntityId::from_index(1),
            Vec3::new(1.0, 2.0, 3.0),
            0.5,
        );
        assert_eq!(volume.aabb.center(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(volume.aabb.half_extents(), Vec3::splat(0.5));
    }
}
