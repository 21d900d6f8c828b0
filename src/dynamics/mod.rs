//! Dynamics: constraint construction and the sequential-impulse solver.

pub mod constraint;
pub mod solver;

pub use constraint::{build_contact_constraints, ContactConstraint, InverseMass12, Jacobian12};
pub use solver::SequentialImpulseSolver;
