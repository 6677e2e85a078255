//! Closed-form inverse kinematics for the 6-RUS strut geometry.
//!
//! Six cranks in mirrored pairs drive the platform over revolute-universal-
//! spherical struts, giving full 6-DOF poses `[x, y, z, alpha, beta, gamma]`.
//! Each crank angle is the principal argument of a complex expression derived
//! from the strut closure equation; the square root of the per-strut
//! discriminant is taken in complex arithmetic, so a strut pushed past its
//! mechanical limit yields the argument of a complex number rather than an
//! error. A workspace bound comparable to the Delta/Quattro check is not
//! implemented for this geometry.

use nalgebra::Complex;

use crate::forward_solver::solve_forward;
use crate::kinematic_traits::{fit_to_dof, Joints, Kinematics, Pose};
use crate::motion_error::MotionError;
use crate::parameters::SixRusParams;

pub struct SixRusKinematics {
    params: SixRusParams,
}

impl SixRusKinematics {
    pub fn new(params: SixRusParams) -> Self {
        SixRusKinematics { params }
    }

    /// Resting pose with the platform straight below the base center:
    /// cranks pointing downward, Pythagoras for the coupler over the base
    /// and effector joint offsets.
    fn resting_pose(&self) -> Pose {
        let p = &self.params;
        let reach = p.base_dx - p.dx;
        let z = -p.l1 - (p.l2 * p.l2 - reach * reach).sqrt();
        vec![0.0, 0.0, z, 0.0, 0.0, 0.0]
    }
}

/// Crank angle of one strut from its closure equation.
///
/// `zc`/`xc` are the vertical and (strut-frame) horizontal components of the
/// platform joint relative to the base joint, `sig` the scalar closure term
/// `zc^2 + xc^2 + yc^2 + l1^2 - l2^2`. The discriminant goes through complex
/// arithmetic; its sign is not checked here (see the module note).
fn strut_angle(zc: f64, xc: f64, sig: f64, l1: f64) -> f64 {
    let z2 = zc * zc;
    let x2 = xc * xc;
    let c = sig / (2.0 * l1);
    let root = Complex::new((z2 - c * c + x2) * z2, 0.0).sqrt();
    let denom = z2 + x2;
    let re = (root - xc * c) / denom;
    let im = -(root * xc + z2 * c) / (denom * zc);
    (re + im * Complex::i()).arg()
}

impl Kinematics for SixRusKinematics {
    fn dof(&self) -> usize {
        6
    }

    fn inverse(&self, pose: &[f64]) -> Result<Joints, MotionError> {
        let pose = fit_to_dof(pose, 6);
        let p = &self.params;
        let (l1, l2) = (p.l1, p.l2);
        let (dx, dy) = (p.dx, p.dy);
        let (bx, by) = (p.base_dx, p.base_dy);

        let x = pose[0];
        let y = pose[1];
        let z = pose[2];
        let (s_a, c_a) = pose[3].sin_cos();
        let (s_b, c_b) = pose[4].sin_cos();
        let (s_g, c_g) = pose[5].sin_cos();

        // Shared orientation products of the platform rotation matrix
        let t1 = s_a * s_g - c_a * c_g * s_b;
        let t2 = c_g * s_a + c_a * s_b * s_g;
        let t3 = c_a * s_g + c_g * s_a * s_b;
        let t4 = c_a * c_g - s_a * s_b * s_g;
        let c_bg = c_b * c_g;
        let cbsg = c_b * s_g;

        let sqrt3 = 3f64.sqrt();
        let sig = |zc: f64, xc: f64, yc: f64| {
            zc * zc + xc * xc + yc * yc + l1 * l1 - l2 * l2
        };

        // Strut pair along the x axis, mirrored mounting
        let z1 = z + dx * t1 + dy * t2;
        let x1 = bx - x - dx * c_bg + dy * cbsg;
        let y1 = y - by + dx * t3 + dy * t4;
        let theta_1 = strut_angle(z1, x1, sig(z1, x1, y1), l1);

        let z2 = z + dx * t1 - dy * t2;
        let x2 = x - bx + dx * c_bg + dy * cbsg;
        let y2 = by + y + dx * t3 - dy * t4;
        let theta_2 = strut_angle(z2, -x2, sig(z2, x2, y2), l1);

        // Effector and base joint offsets rotated by +-120 degrees
        let pe = dx / 2.0 - sqrt3 * dy / 2.0;
        let qe = dy / 2.0 + sqrt3 * dx / 2.0;
        let ue = dx / 2.0 + sqrt3 * dy / 2.0;
        let ve = dy / 2.0 - sqrt3 * dx / 2.0;

        let z3 = qe * t2 - z + pe * t1;
        let a3 = bx / 2.0 + x - sqrt3 * by / 2.0 - c_bg * pe + cbsg * qe;
        let b3 = by / 2.0 + y + sqrt3 * bx / 2.0 - t3 * pe - t4 * qe;
        let theta_3 = strut_angle(
            -2.0 * z3,
            a3 + sqrt3 * b3,
            2.0 * sig(z3, a3, b3),
            l1,
        );

        let z4 = z + ve * t2 - ue * t1;
        let a4 = bx / 2.0 + x + sqrt3 * by / 2.0 - c_bg * ue - cbsg * ve;
        let b4 = y - by / 2.0 + sqrt3 * bx / 2.0 - t3 * ue + t4 * ve;
        let theta_4 = strut_angle(
            2.0 * z4,
            a4 + sqrt3 * b4,
            2.0 * sig(z4, a4, b4),
            l1,
        );

        let z5 = ve * t2 - z + ue * t1;
        let a5 = bx / 2.0 + x + sqrt3 * by / 2.0 - c_bg * ue + cbsg * ve;
        let b5 = sqrt3 * bx / 2.0 - y - by / 2.0 + t3 * ue + t4 * ve;
        let theta_5 = strut_angle(
            -2.0 * z5,
            a5 + sqrt3 * b5,
            2.0 * sig(z5, a5, b5),
            l1,
        );

        let z6 = z + qe * t2 - pe * t1;
        let a6 = sqrt3 * by / 2.0 - x - bx / 2.0 + c_bg * pe + cbsg * qe;
        let b6 = by / 2.0 - y + sqrt3 * bx / 2.0 + t3 * pe - t4 * qe;
        let theta_6 = strut_angle(
            2.0 * z6,
            sqrt3 * b6 - a6,
            2.0 * sig(z6, a6, b6),
            l1,
        );

        Ok(vec![theta_1, theta_2, theta_3, theta_4, theta_5, theta_6])
    }

    fn forward(&self, joints: &[f64]) -> Result<Pose, MotionError> {
        solve_forward(self, joints, self.resting_pose())
    }

    fn set_dimensions(&mut self, params: &[f64]) -> Result<(), MotionError> {
        match params {
            [l1, l2, dx, dy, base_dx, base_dy] => {
                self.params = SixRusParams {
                    l1: *l1,
                    l2: *l2,
                    dx: *dx,
                    dy: *dy,
                    base_dx: *base_dx,
                    base_dy: *base_dy,
                };
                Ok(())
            }
            _ => Err(MotionError::Configuration(format!(
                "6-RUS geometry takes 6 parameters, got {}",
                params.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn resting_pose_puts_cranks_near_vertical() {
        let kinematics = SixRusKinematics::new(SixRusParams::big_effector());
        let angles = kinematics
            .inverse(&kinematics.resting_pose())
            .expect("resting pose is always computable");
        assert_eq!(angles.len(), 6);
        for angle in &angles {
            assert!(
                (angle - FRAC_PI_2).abs() < 0.1,
                "crank angle {} not near vertical",
                angle
            );
        }
    }

    #[test]
    fn center_pose_is_symmetric_in_pairs() {
        let kinematics = SixRusKinematics::new(SixRusParams::big_effector());
        let pose = kinematics.resting_pose();
        let angles = kinematics
            .inverse(&[0.0, 0.0, pose[2] + 40.0, 0.0, 0.0, 0.0])
            .unwrap();
        // All six struts see the same geometry at a centered, level pose
        for pair in angles.windows(2) {
            assert!((pair[0] - pair[1]).abs() < 1e-6, "angles {:?}", angles);
        }
    }
}
