//! Core types and the kinematics seam shared by all robot geometries.
//!
//! A pose is an ordered vector of up to six scalars: `x, y, z` in millimeters
//! followed by `alpha, beta, gamma` in radians. Its length always equals the
//! degrees of freedom of the robot it is meant for; the trailing rotational
//! components simply do not exist for robots with fewer axes (the Quattro
//! carries a single rotation as its fourth component).

use crate::motion_error::MotionError;

/// Cartesian pose of the end effector, `dof` components long.
pub type Pose = Vec<f64>;

/// Driven joint angles in radians, one per actuated axis.
pub type Joints = Vec<f64>;

/// Absolute motor positions in microsteps, one per actuated axis.
pub type Steps = Vec<i64>;

/// How a waypoint wants to be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Point-to-point: joints interpolate freely, the Cartesian path between
    /// start and end is not constrained.
    Ptp,
    /// Linearly interpolated Cartesian path with orientation slerp.
    Linear,
}

/// Pose to joint-angle transforms for one robot geometry.
///
/// Implementations are selected once when the robot is built; the robot then
/// talks to the geometry through this trait only.
pub trait Kinematics: Send {
    /// Number of actuated axes (3 for Delta, 4 for Quattro, 6 for 6-RUS).
    fn dof(&self) -> usize;

    /// Closed-form inverse transform. Fails with
    /// [`MotionError::WorkspaceViolation`] if the pose has no admissible
    /// joint solution for this geometry.
    fn inverse(&self, pose: &[f64]) -> Result<Joints, MotionError>;

    /// Numerical forward transform (no closed form exists for these parallel
    /// mechanisms). The solver starts from the geometry's resting
    /// configuration and drives the inverse-transform residual to zero.
    fn forward(&self, joints: &[f64]) -> Result<Pose, MotionError>;

    /// Replaces the geometric dimensions wholesale. Must be called before
    /// homing or motion if the built-in reference dimensions do not match
    /// the mechanism. Fails with [`MotionError::Configuration`] when the
    /// parameter count does not fit the geometry.
    fn set_dimensions(&mut self, params: &[f64]) -> Result<(), MotionError>;
}

/// Truncates or zero-pads `pose` to exactly `dof` components.
pub fn fit_to_dof(pose: &[f64], dof: usize) -> Pose {
    let mut fitted = pose.to_vec();
    fitted.resize(dof, 0.0);
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_truncates_and_pads() {
        assert_eq!(fit_to_dof(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3), vec![1.0, 2.0, 3.0]);
        assert_eq!(fit_to_dof(&[1.0, 2.0], 4), vec![1.0, 2.0, 0.0, 0.0]);
        assert_eq!(fit_to_dof(&[], 3), vec![0.0, 0.0, 0.0]);
    }
}
