//! Closed-form inverse kinematics for the 4-DOF Quattro geometry.
//!
//! Same strut algebra as the Delta, with a fourth arm and one rotational
//! degree of freedom: the end-effector platform can turn around the vertical
//! axis by `phi`, the fourth pose component.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::forward_solver::solve_forward;
use crate::kinematic_traits::{Joints, Kinematics, Pose};
use crate::motion_error::MotionError;
use crate::parameters::QuattroParams;

/// Arms closer than this to the horizontal are rejected; the real mechanism
/// binds slightly before the mathematical limit.
const GUARD_ANGLE: f64 = 3.0 * PI / 180.0;

pub struct QuattroKinematics {
    params: QuattroParams,
}

impl QuattroKinematics {
    pub fn new(params: QuattroParams) -> Self {
        QuattroKinematics { params }
    }

    /// Resting pose below the base center, platform turned 45 degrees so all
    /// four effector bars see the same geometry.
    fn resting_pose(&self) -> Pose {
        let p = &self.params;
        let reach = p.base_radius - p.effector_bar / 2f64.sqrt();
        let z = p.l1 + (p.l2 * p.l2 - reach * reach).sqrt();
        vec![0.0, 0.0, -z, FRAC_PI_4]
    }
}

impl Kinematics for QuattroKinematics {
    fn dof(&self) -> usize {
        4
    }

    fn inverse(&self, pose: &[f64]) -> Result<Joints, MotionError> {
        let p = &self.params;
        let (l1, l2) = (p.l1, p.l2);
        let r = p.base_radius;
        let a = p.effector_bar;

        // Cartesian target; z measured downward in the strut equations
        let x = pose[0];
        let y = pose[1];
        let z = -pose[2];
        let phi = pose[3];

        let c_phi = phi.cos();
        let s_phi = phi.sin();

        // Auxiliary quadratic-form coefficients, one per arm
        let g = [
            2.0 * l1 * (x - a * c_phi + r),
            2.0 * l1 * (y - a * s_phi + r),
            2.0 * l1 * (-x - a * c_phi + r),
            2.0 * l1 * (-y - a * s_phi + r),
        ];

        let q = x * x + y * y + z * z + l1 * l1 + r * r - l2 * l2;
        let h = [
            q + (a * c_phi).powi(2) - 2.0 * a * c_phi * (x + r) + 2.0 * x * r,
            q + (a * s_phi).powi(2) - 2.0 * a * s_phi * (y + r) + 2.0 * y * r,
            q + (a * c_phi).powi(2) + 2.0 * a * c_phi * (x - r) - 2.0 * x * r,
            q + (a * s_phi).powi(2) + 2.0 * a * s_phi * (y - r) - 2.0 * y * r,
        ];

        let f = -2.0 * z * l1;

        let mut thetas = Vec::with_capacity(4);
        for i in 0..4 {
            let discriminant = f * f - h[i] * h[i] + g[i] * g[i];
            if discriminant < 0.0 {
                return Err(MotionError::WorkspaceViolation);
            }
            let root = discriminant.sqrt();
            let denom = h[i] - g[i];

            // Pick the solution with the arm pointing outwards
            let theta1 = 2.0 * f64::atan2(-f + root, denom);
            if theta1.abs() <= FRAC_PI_2 {
                if theta1 < GUARD_ANGLE {
                    return Err(MotionError::WorkspaceViolation);
                }
                thetas.push(theta1);
            } else {
                let mut theta2 = 2.0 * f64::atan2(-f - root, denom);
                if theta2 < -PI {
                    theta2 += 2.0 * PI;
                }
                if theta2 < GUARD_ANGLE {
                    return Err(MotionError::WorkspaceViolation);
                } else if theta2 > PI {
                    theta2 -= 2.0 * PI;
                }
                thetas.push(theta2);
            }
        }

        Ok(thetas)
    }

    fn forward(&self, joints: &[f64]) -> Result<Pose, MotionError> {
        solve_forward(self, joints, self.resting_pose())
    }

    fn set_dimensions(&mut self, params: &[f64]) -> Result<(), MotionError> {
        match params {
            [base_radius, effector_bar, l1, l2] => {
                self.params = QuattroParams {
                    base_radius: *base_radius,
                    effector_bar: *effector_bar,
                    l1: *l1,
                    l2: *l2,
                };
                Ok(())
            }
            _ => Err(MotionError::Configuration(format!(
                "Quattro geometry takes 4 parameters, got {}",
                params.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_pulled_too_high_is_rejected() {
        let kinematics = QuattroKinematics::new(QuattroParams::reference());
        let result = kinematics.inverse(&[0.0, 0.0, -60.0, FRAC_PI_4]);
        assert_eq!(result, Err(MotionError::WorkspaceViolation));
    }
}
