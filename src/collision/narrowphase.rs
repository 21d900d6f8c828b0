//! Narrow phase: precise contact generation for candidate pairs.
//!
//! Sphere-sphere is the only shape pairing generated here; other shape kinds
//! pass through the broad phase but produce no manifolds.

use std::collections::HashMap;

use glam::Vec3;

use crate::collision::broadphase::CollisionPair;
use crate::core::body::BodyStore;
use crate::core::types::{ShapeKind, Volume};
use crate::utils::allocator::EntityId;
use crate::utils::collector::ShardedCollector;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Geometric description of one contact between two bodies.
#[derive(Debug, Clone, Copy)]
pub struct ContactManifold {
    pub body_a: EntityId,
    pub body_b: EntityId,
    /// Contact point on the surface of A, offset from its center along the
    /// normal.
    pub contact_point_a: Vec3,
    /// Contact point on the surface of B, offset against the normal.
    pub contact_point_b: Vec3,
    /// Unit contact normal pointing from A toward B.
    pub normal_a_to_b: Vec3,
    /// Overlap along the normal, strictly positive.
    pub penetration: f32,
}

/// Narrow-phase driver converting candidate pairs into contact manifolds.
pub struct NarrowPhase {
    batch_size: usize,
}

impl NarrowPhase {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Generates manifolds for every candidate pair, in parallel over the
    /// pair array. Pairs whose volumes vanished this step are skipped.
    pub fn generate(
        &self,
        pairs: &[CollisionPair],
        volumes: &[Volume],
        volume_index: &HashMap<EntityId, usize>,
        bodies: &BodyStore,
    ) -> Vec<ContactManifold> {
        let collector = ShardedCollector::for_worker_threads();

        let collide = |pair: &CollisionPair| {
            let (Some(&a), Some(&b)) = (
                volume_index.get(&pair.volume_a),
                volume_index.get(&pair.volume_b),
            ) else {
                debug_assert!(false, "collision pair references unknown volume");
                return;
            };
            if let Some(manifold) = sphere_sphere(&volumes[a], &volumes[b], bodies) {
                collector.push(manifold);
            }
        };

        #[cfg(feature = "parallel")]
        pairs
            .par_iter()
            .with_min_len(self.batch_size)
            .for_each(collide);
        #[cfg(not(feature = "parallel"))]
        pairs.iter().for_each(collide);

        collector.drain()
    }
}

/// Sphere-sphere contact test.
///
/// Returns `None` for separated spheres, for non-sphere pairings, for two
/// volumes of the same compound body (self-contact resolves nothing), and
/// when both owning bodies are kinematic (no constraint could act on the
/// pair).
pub fn sphere_sphere(
    volume_a: &Volume,
    volume_b: &Volume,
    bodies: &BodyStore,
) -> Option<ContactManifold> {
    if volume_a.shape != ShapeKind::Sphere || volume_b.shape != ShapeKind::Sphere {
        return None;
    }
    if volume_a.body == volume_b.body {
        return None;
    }

    let center_a = volume_a.aabb.center();
    let center_b = volume_b.aabb.center();
    let radius_a = volume_a.aabb.half_extents().x;
    let radius_b = volume_b.aabb.half_extents().x;

    // Coincident centers have no usable direction; fall back to a canonical
    // up-vector instead of normalizing a zero-length separation.
    let mut separation = center_b - center_a;
    if separation.length_squared() < f32::EPSILON {
        separation = Vec3::Y;
    }

    let penetration = radius_a + radius_b - separation.length();
    if penetration <= 0.0 {
        return None;
    }

    let body_a = bodies.get(volume_a.body)?;
    let body_b = bodies.get(volume_b.body)?;
    if body_a.is_kinematic && body_b.is_kinematic {
        return None;
    }

    let normal_a_to_b = separation.normalize();
    Some(ContactManifold {
        body_a: volume_a.body,
        body_b: volume_b.body,
        contact_point_a: center_a + normal_a_to_b * radius_a,
        contact_point_b: center_b - normal_a_to_b * radius_b,
        normal_a_to_b,
        penetration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::body::RigidBodyState;
    use approx::assert_relative_eq;

    fn two_spheres(
        center_a: Vec3,
        radius_a: f32,
        center_b: Vec3,
        radius_b: f32,
    ) -> (Volume, Volume, BodyStore) {
        let mut bodies = BodyStore::new();
        let body_a = bodies.insert(RigidBodyState::dynamic(1.0, center_a));
        let body_b = bodies.insert(RigidBodyState::dynamic(1.0, center_b));
        let volume_a = Volume::sphere(EntityId::from_index(0), body_a, center_a, radius_a);
        let volume_b = Volume::sphere(EntityId::from_index(1), body_b, center_b, radius_b);
        (volume_a, volume_b, bodies)
    }

    #[test]
    fn manifold_exists_iff_spheres_overlap() {
        let (a, b, bodies) = two_spheres(Vec3::ZERO, 1.0, Vec3::new(1.5, 0.0, 0.0), 1.0);
        let manifold = sphere_sphere(&a, &b, &bodies).expect("overlapping spheres");
        assert_relative_eq!(manifold.penetration, 0.5, epsilon = 1e-5);
        assert_relative_eq!(manifold.normal_a_to_b.x, 1.0, epsilon = 1e-5);

        let (a, b, bodies) = two_spheres(Vec3::ZERO, 1.0, Vec3::new(2.5, 0.0, 0.0), 1.0);
        assert!(sphere_sphere(&a, &b, &bodies).is_none());

        // Exactly touching is not penetrating.
        let (a, b, bodies) = two_spheres(Vec3::ZERO, 1.0, Vec3::new(2.0, 0.0, 0.0), 1.0);
        assert!(sphere_sphere(&a, &b, &bodies).is_none());
    }

    #[test]
    fn contact_points_sit_on_each_surface() {
        let (a, b, bodies) = two_spheres(Vec3::ZERO, 1.0, Vec3::new(1.5, 0.0, 0.0), 1.0);
        let manifold = sphere_sphere(&a, &b, &bodies).unwrap();
        assert_relative_eq!(manifold.contact_point_a.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(manifold.contact_point_b.x, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn coincident_centers_use_the_canonical_up_normal() {
        let (a, b, bodies) = two_spheres(Vec3::splat(3.0), 1.0, Vec3::splat(3.0), 1.0);
        let manifold = sphere_sphere(&a, &b, &bodies).expect("coincident spheres overlap");
        assert_eq!(manifold.normal_a_to_b, Vec3::Y);
        assert!(manifold.penetration.is_finite());
        assert!(manifold.normal_a_to_b.is_finite());
    }

    #[test]
    fn kinematic_pair_is_discarded() {
        let center_b = Vec3::new(1.0, 0.0, 0.0);
        let mut bodies = BodyStore::new();
        let body_a = bodies.insert(RigidBodyState::kinematic(Vec3::ZERO));
        let body_b = bodies.insert(RigidBodyState::kinematic(center_b));
        let a = Volume::sphere(EntityId::from_index(0), body_a, Vec3::ZERO, 1.0);
        let b = Volume::sphere(EntityId::from_index(1), body_b, center_b, 1.0);
        assert!(sphere_sphere(&a, &b, &bodies).is_none());
    }

    #[test]
    fn volumes_of_one_compound_body_never_self_collide() {
        let mut bodies = BodyStore::new();
        let body = bodies.insert(RigidBodyState::dynamic(1.0, Vec3::ZERO));
        let a = Volume::sphere(EntityId::from_index(0), body, Vec3::ZERO, 1.0);
        let b = Volume::sphere(EntityId::from_index(1), body, Vec3::new(0.5, 0.0, 0.0), 1.0);
        assert!(sphere_sphere(&a, &b, &bodies).is_none());
    }

    #[test]
    fn non_sphere_shapes_are_ignored() {
        let (mut a, b, bodies) = two_spheres(Vec3::ZERO, 1.0, Vec3::new(1.0, 0.0, 0.0), 1.0);
        a.shape = ShapeKind::Box;
        assert!(sphere_sphere(&a, &b, &bodies).is_none());
    }
}
