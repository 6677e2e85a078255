//! Closed-form inverse kinematics for the 3-DOF Delta geometry.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::forward_solver::solve_forward;
use crate::kinematic_traits::{Joints, Kinematics, Pose};
use crate::motion_error::MotionError;
use crate::parameters::DeltaParams;

pub struct DeltaKinematics {
    params: DeltaParams,
}

impl DeltaKinematics {
    pub fn new(params: DeltaParams) -> Self {
        DeltaKinematics { params }
    }

    /// Resting pose with the end effector straight below the base center:
    /// first arm pointing downward, Pythagoras for the second arm over the
    /// difference of base and effector radii.
    fn resting_pose(&self) -> Pose {
        let p = &self.params;
        let a = p.base_radius - p.effector_radius;
        let z = p.l1 + (p.l2 * p.l2 - a * a).sqrt();
        vec![0.0, 0.0, -z]
    }
}

impl Kinematics for DeltaKinematics {
    fn dof(&self) -> usize {
        3
    }

    fn inverse(&self, pose: &[f64]) -> Result<Joints, MotionError> {
        let p = &self.params;
        let (l1, l2) = (p.l1, p.l2);
        let a = p.base_radius - p.effector_radius;

        // Cartesian target; z measured downward in the strut equations
        let x = pose[0];
        let y = pose[1];
        let z = -pose[2];

        let sqrt3 = 3f64.sqrt();

        // Auxiliary quadratic-form coefficients, one per arm
        let g = [
            l1 * (2.0 * a + y + sqrt3 * x),
            2.0 * l1 * (y + a),
            l1 * (2.0 * a - y + sqrt3 * x),
        ];

        let q = x * x + y * y + z * z + l1 * l1 + a * a - l2 * l2;
        let h = [
            q + a * (sqrt3 * x - y),
            q + 2.0 * a * y,
            q - a * (sqrt3 * x + y),
        ];

        let f = -2.0 * z * l1;

        let mut thetas = Vec::with_capacity(3);
        for i in 0..3 {
            let discriminant = f * f - h[i] * h[i] + g[i] * g[i];
            if discriminant < 0.0 {
                return Err(MotionError::WorkspaceViolation);
            }
            let root = discriminant.sqrt();
            let denom = h[i] - g[i];

            // Pick the solution with the arm pointing outwards
            let theta1 = 2.0 * f64::atan2(-f + root, denom);
            if theta1.abs() <= FRAC_PI_2 {
                if theta1 < 0.0 {
                    return Err(MotionError::WorkspaceViolation);
                }
                thetas.push(theta1);
            } else {
                let mut theta2 = 2.0 * f64::atan2(-f - root, denom);
                if theta2 < 0.0 {
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
            [base_radius, effector_radius, l1, l2] => {
                self.params = DeltaParams {
                    base_radius: *base_radius,
                    effector_radius: *effector_radius,
                    l1: *l1,
                    l2: *l2,
                };
                Ok(())
            }
            _ => Err(MotionError::Configuration(format!(
                "Delta geometry takes 4 parameters, got {}",
                params.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pose_has_three_equal_angles() {
        let kinematics = DeltaKinematics::new(DeltaParams::reference());
        let pose = kinematics.resting_pose();
        // Slightly above the fully stretched configuration
        let angles = kinematics
            .inverse(&[pose[0], pose[1], pose[2] + 30.0])
            .expect("resting area must be reachable");
        assert_eq!(angles.len(), 3);
        assert!((angles[0] - angles[1]).abs() < 1e-9);
        assert!((angles[1] - angles[2]).abs() < 1e-9);
        assert!(angles[0] > 0.0 && angles[0] < FRAC_PI_2);
    }

    #[test]
    fn far_target_violates_workspace() {
        let kinematics = DeltaKinematics::new(DeltaParams::reference());
        let result = kinematics.inverse(&[500.0, 0.0, -200.0]);
        assert_eq!(result, Err(MotionError::WorkspaceViolation));
    }

    #[test]
    fn dimension_arity_is_checked() {
        let mut kinematics = DeltaKinematics::new(DeltaParams::reference());
        assert!(kinematics.set_dimensions(&[1.0, 2.0, 3.0]).is_err());
        assert!(kinematics.set_dimensions(&[41.7, 27.6, 48.6, 166.8]).is_ok());
    }
}
