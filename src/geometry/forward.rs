//! Numerical forward kinematics.
//!
//! None of the supported parallel mechanisms has a closed-form forward
//! transform, so the pose is recovered by Newton iteration on the inverse
//! transform: find the pose whose inverse-kinematic joint angles match the
//! given ones. The Jacobian is estimated by central finite differences, which
//! is accurate enough here because the inverse transforms are smooth inside
//! the workspace.

use nalgebra::{DMatrix, DVector};

use crate::kinematic_traits::{Kinematics, Pose};
use crate::motion_error::MotionError;

const MAX_ITERATIONS: usize = 50;
const TOLERANCE: f64 = 1e-10;
const JACOBIAN_STEP: f64 = 1e-6;

/// Solves `inverse(pose) == target` for `pose`, starting from `initial`
/// (normally the geometry's resting configuration).
///
/// Exhausting the iteration budget reports
/// [`MotionError::SolverDidNotConverge`] with the last residual norm instead
/// of silently returning a poor estimate. A workspace violation raised by the
/// inverse transform while iterating propagates unchanged.
pub(crate) fn solve_forward(
    kinematics: &dyn Kinematics,
    target: &[f64],
    initial: Pose,
) -> Result<Pose, MotionError> {
    let dof = kinematics.dof();
    if target.len() != dof {
        return Err(MotionError::Configuration(format!(
            "expected {} joint angles, got {}",
            dof,
            target.len()
        )));
    }

    let target = DVector::from_column_slice(target);
    let mut pose = DVector::from_vec(initial);
    let mut residual_norm = f64::INFINITY;

    for _ in 0..MAX_ITERATIONS {
        let angles = kinematics.inverse(pose.as_slice())?;
        let residual = &target - DVector::from_vec(angles);
        residual_norm = residual.norm();
        if residual_norm < TOLERANCE {
            return Ok(pose.as_slice().to_vec());
        }

        let mut jacobian = DMatrix::zeros(dof, dof);
        for col in 0..dof {
            let mut high = pose.clone();
            let mut low = pose.clone();
            high[col] += JACOBIAN_STEP;
            low[col] -= JACOBIAN_STEP;
            let angles_high = kinematics.inverse(high.as_slice())?;
            let angles_low = kinematics.inverse(low.as_slice())?;
            for row in 0..dof {
                jacobian[(row, col)] =
                    (angles_high[row] - angles_low[row]) / (2.0 * JACOBIAN_STEP);
            }
        }

        // Newton step: J * delta = target - inverse(pose)
        let step = jacobian
            .lu()
            .solve(&residual)
            .ok_or(MotionError::SolverDidNotConverge { residual: residual_norm })?;
        pose += step;
    }

    Err(MotionError::SolverDidNotConverge { residual: residual_norm })
}
