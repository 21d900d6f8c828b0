//! Contact velocity constraints built from collision manifolds.

use glam::{Mat3, Vec3};

use crate::collision::narrowphase::ContactManifold;
use crate::core::body::BodyStore;
use crate::utils::allocator::EntityId;

/// Stacked 12-component vector over a body pair: linear and angular blocks
/// for A, then linear and angular blocks for B.
///
/// Used both as the constraint Jacobian and as the stacked velocity of the
/// two constrained bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Jacobian12 {
    pub linear_a: Vec3,
    pub angular_a: Vec3,
    pub linear_b: Vec3,
    pub angular_b: Vec3,
}

impl Jacobian12 {
    pub fn dot(&self, other: &Jacobian12) -> f32 {
        self.linear_a.dot(other.linear_a)
            + self.angular_a.dot(other.angular_a)
            + self.linear_b.dot(other.linear_b)
            + self.angular_b.dot(other.angular_b)
    }

    pub fn scale(&self, factor: f32) -> Jacobian12 {
        Jacobian12 {
            linear_a: self.linear_a * factor,
            angular_a: self.angular_a * factor,
            linear_b: self.linear_b * factor,
            angular_b: self.angular_b * factor,
        }
    }
}

/// Block-diagonal generalized inverse mass operator `M⁻¹` for a body pair:
/// scalar inverse masses on the linear blocks, inverse inertia tensors on the
/// angular blocks.
#[derive(Debug, Clone, Copy)]
pub struct InverseMass12 {
    pub inverse_mass_a: f32,
    pub inverse_inertia_a: Mat3,
    pub inverse_mass_b: f32,
    pub inverse_inertia_b: Mat3,
}

impl InverseMass12 {
    pub fn apply(&self, v: &Jacobian12) -> Jacobian12 {
        Jacobian12 {
            linear_a: v.linear_a * self.inverse_mass_a,
            angular_a: self.inverse_inertia_a * v.angular_a,
            linear_b: v.linear_b * self.inverse_mass_b,
            angular_b: self.inverse_inertia_b * v.angular_b,
        }
    }
}

/// One velocity-level contact constraint, built fresh each step. Never
/// persisted: there is no warm starting across steps.
#[derive(Debug, Clone, Copy)]
pub struct ContactConstraint {
    pub jacobian: Jacobian12,
    pub body_a: EntityId,
    pub body_b: EntityId,
    /// Penetration depth fed into the Baumgarte stabilization bias.
    pub baumgarte_depth: f32,
}

/// Builds one contact constraint per manifold.
///
/// The Jacobian encodes the rate of change of separation along the contact
/// normal: `[-n, -(rA×n), n, rB×n]`, with `rA`/`rB` the contact offsets from
/// each body's center of mass.
pub fn build_contact_constraints(
    manifolds: &[ContactManifold],
    bodies: &BodyStore,
) -> Vec<ContactConstraint> {
    let mut constraints = Vec::with_capacity(manifolds.len());

    for manifold in manifolds {
        let (Some(body_a), Some(body_b)) =
            (bodies.get(manifold.body_a), bodies.get(manifold.body_b))
        else {
            debug_assert!(false, "manifold references a missing body");
            continue;
        };

        let normal = manifold.normal_a_to_b;
        let r_a = manifold.contact_point_a - body_a.center_of_mass;
        let r_b = manifold.contact_point_b - body_b.center_of_mass;

        constraints.push(ContactConstraint {
            jacobian: Jacobian12 {
                linear_a: -normal,
                angular_a: -r_a.cross(normal),
                linear_b: normal,
                angular_b: r_b.cross(normal),
            },
            body_a: manifold.body_a,
            body_b: manifold.body_b,
            baumgarte_depth: manifold.penetration,
        });
    }

    constraints
}
