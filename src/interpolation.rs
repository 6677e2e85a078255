//! Pose interpolation for linear moves.
//!
//! A linear move is rendered as a chain of point-to-point moves over
//! intermediate poses: positions interpolate linearly, orientations follow
//! the spherical interpolation between the two end quaternions. The waypoint
//! count is whichever of the translation or rotation resolutions demands more
//! intermediate points.

use nalgebra::UnitQuaternion;

use crate::kinematic_traits::Pose;

/// Orientation of a pose as a quaternion. Robots with fewer than six axes
/// carry fewer rotational components: the Quattro's single rotation turns the
/// platform around the vertical axis, a 3-DOF pose has none at all.
fn orientation_of(pose: &[f64]) -> UnitQuaternion<f64> {
    match pose.len() {
        0..=3 => UnitQuaternion::identity(),
        4 | 5 => UnitQuaternion::from_euler_angles(0.0, 0.0, pose[3]),
        _ => UnitQuaternion::from_euler_angles(pose[3], pose[4], pose[5]),
    }
}

/// Minimal relative rotation between the orientations of two poses, radians.
pub fn rotation_between(current: &[f64], target: &[f64]) -> f64 {
    let difference = orientation_of(target) * orientation_of(current).inverse();
    difference.angle()
}

/// Number of intermediate waypoints a linear move needs.
///
/// `pos_res` counts interpolation points per centimeter of travel, `ang_res`
/// points per ten degrees of rotation. Zero means the poses already coincide.
pub fn waypoint_count(distance: f64, rotation: f64, pos_res: f64, ang_res: f64) -> usize {
    let from_translation = distance * pos_res / 10.0;
    let from_rotation = rotation.to_degrees() * ang_res / 10.0;
    let count = from_translation.max(from_rotation).ceil();
    if count <= 0.0 { 0 } else { count as usize }
}

/// `count + 1` poses from `current` to `target` inclusive, linear in
/// position and slerped in orientation.
pub fn slerp_poses(current: &[f64], target: &[f64], count: usize) -> Vec<Pose> {
    if count == 0 {
        return vec![target.to_vec()];
    }

    let dof = current.len();
    let start_rotation = orientation_of(current);
    let end_rotation = orientation_of(target);

    let mut poses = Vec::with_capacity(count + 1);
    for i in 0..=count {
        let fraction = i as f64 / count as f64;
        let mut pose = vec![0.0; dof];
        for axis in 0..dof.min(3) {
            pose[axis] = current[axis] + (target[axis] - current[axis]) * fraction;
        }
        let rotation = start_rotation.slerp(&end_rotation, fraction);
        match dof {
            4 | 5 => pose[3] = rotation.euler_angles().2,
            6 => {
                let (alpha, beta, gamma) = rotation.euler_angles();
                pose[3] = alpha;
                pose[4] = beta;
                pose[5] = gamma;
            }
            _ => {}
        }
        poses.push(pose);
    }
    poses
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn pure_translation_count() {
        // 100 mm at 10 points per cm
        assert_eq!(waypoint_count(100.0, 0.0, 10.0, 3.0), 100);
    }

    #[test]
    fn coinciding_poses_need_no_waypoints() {
        assert_eq!(waypoint_count(0.0, 0.0, 10.0, 3.0), 0);
    }

    #[test]
    fn rotation_dominates_when_larger() {
        // 90 degrees at 3 points per 10 degrees = 27 points, translation 1
        assert_eq!(waypoint_count(1.0, PI / 2.0, 10.0, 3.0), 27);
    }

    #[test]
    fn slerp_hits_both_endpoints() {
        let start = vec![0.0, 0.0, -200.0, 0.0];
        let end = vec![10.0, -10.0, -180.0, PI / 4.0];
        let poses = slerp_poses(&start, &end, 10);
        assert_eq!(poses.len(), 11);
        for (a, b) in poses[0].iter().zip(&start) {
            assert!((a - b).abs() < 1e-12);
        }
        for (a, b) in poses[10].iter().zip(&end) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn rotation_between_identical_poses_is_zero() {
        let pose = vec![5.0, 5.0, -150.0, 0.3, 0.1, -0.2];
        assert!(rotation_between(&pose, &pose).abs() < 1e-12);
    }
}
