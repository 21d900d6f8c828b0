//! Iterative sequential-impulse contact solver.

use glam::Mat3;

use crate::config::SimulationConfig;
use crate::core::body::BodyStore;
use crate::dynamics::constraint::{ContactConstraint, InverseMass12, Jacobian12};

/// Effective masses below this are treated as degenerate and skipped rather
/// than divided by, so a bad constraint can never inject NaN/Inf into
/// velocity state.
const MIN_EFFECTIVE_MASS: f32 = 1e-9;

/// Gauss-Seidel sequential-impulse solver over the step's contact
/// constraints.
///
/// Each iteration walks the constraints in array order, live-reading both
/// bodies' velocities so later constraints see earlier corrections. The
/// converged result depends on constraint order; that is inherent to the
/// method and acceptable.
#[derive(Debug, Clone)]
pub struct SequentialImpulseSolver {
    pub iterations: u32,
    pub baumgarte_bias: f32,
    /// Write angular corrections back and use real inverse inertia. Off by
    /// default: contacts are linear-only, matching the reference behavior.
    pub angular_response: bool,
}

impl SequentialImpulseSolver {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            iterations: config.solver_iterations,
            baumgarte_bias: config.baumgarte_bias,
            angular_response: config.angular_response,
        }
    }

    /// Resolves `constraints` into velocity corrections applied directly to
    /// the body store. Runs zero iterations when there is nothing to solve.
    ///
    /// Single-threaded on purpose: Gauss-Seidel correctness depends on each
    /// constraint reading the velocities the previous one just wrote.
    pub fn solve(&self, bodies: &mut BodyStore, constraints: &[ContactConstraint], dt: f32) {
        if constraints.is_empty() || dt <= 0.0 {
            return;
        }

        for _ in 0..self.iterations {
            for constraint in constraints {
                let Some((body_a, body_b)) = bodies.get2_mut(constraint.body_a, constraint.body_b)
                else {
                    debug_assert!(false, "constraint references a missing body pair");
                    continue;
                };

                let velocity = Jacobian12 {
                    linear_a: body_a.velocity.linear,
                    angular_a: body_a.velocity.angular,
                    linear_b: body_b.velocity.linear,
                    angular_b: body_b.velocity.angular,
                };

                let inverse_mass = InverseMass12 {
                    inverse_mass_a: body_a.inverse_mass,
                    inverse_inertia_a: if self.angular_response {
                        body_a.inverse_inertia
                    } else {
                        Mat3::ZERO
                    },
                    inverse_mass_b: body_b.inverse_mass,
                    inverse_inertia_b: if self.angular_response {
                        body_b.inverse_inertia
                    } else {
                        Mat3::ZERO
                    },
                };

                // λ = (-(J·v) + (bias/dt)·depth) / (J·M⁻¹·Jᵗ)
                let effective_mass = constraint
                    .jacobian
                    .dot(&inverse_mass.apply(&constraint.jacobian));
                if effective_mass < MIN_EFFECTIVE_MASS {
                    log::trace!("skipping degenerate contact constraint");
                    continue;
                }

                let baumgarte = (self.baumgarte_bias / dt) * constraint.baumgarte_depth;
                let lambda = (-constraint.jacobian.dot(&velocity) + baumgarte) / effective_mass;

                let delta = inverse_mass.apply(&constraint.jacobian.scale(lambda));
                body_a.velocity.linear += delta.linear_a;
                body_b.velocity.linear += delta.linear_b;
                if self.angular_response {
                    body_a.velocity.angular += delta.angular_a;
                    body_b.velocity.angular += delta.angular_b;
                }
            }
        }
    }
}
