use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::delta::DeltaKinematics;
use crate::kinematic_traits::Kinematics;
use crate::motion_error::MotionError;
use crate::parameters::{DeltaParams, QuattroParams, SixRusParams};
use crate::quattro::QuattroKinematics;
use crate::six_rus::SixRusKinematics;

const POSE_TOLERANCE: f64 = 1e-6;

fn assert_round_trip(kinematics: &dyn Kinematics, pose: &[f64]) {
    let angles = kinematics
        .inverse(pose)
        .unwrap_or_else(|e| panic!("pose {:?} should be reachable: {}", pose, e));
    let recovered = kinematics
        .forward(&angles)
        .unwrap_or_else(|e| panic!("forward solve failed for {:?}: {}", pose, e));
    for (have, want) in recovered.iter().zip(pose) {
        assert!(
            (have - want).abs() < POSE_TOLERANCE,
            "pose {:?} recovered as {:?}",
            pose,
            recovered
        );
    }
}

#[test]
fn delta_round_trips_inside_envelope() {
    let kinematics = DeltaKinematics::new(DeltaParams::reference());
    // Poses the demo programs actually visit
    for pose in [
        [0.0, 0.0, -164.8],
        [30.0, 30.0, -164.8],
        [-30.0, 30.0, -164.8],
        [40.0, 0.0, -164.8],
        [-20.0, -35.0, -184.8],
        [10.0, 5.0, -205.0],
    ] {
        assert_round_trip(&kinematics, &pose);
    }
}

#[test]
fn quattro_round_trips_inside_envelope() {
    let kinematics = QuattroKinematics::new(QuattroParams::reference());
    for pose in [
        [0.0, 0.0, -180.2, 0.78],
        [30.0, 30.0, -180.2, 0.78],
        [-30.0, 20.0, -200.0, 0.6],
        [0.0, -30.0, -220.0, 0.9],
    ] {
        assert_round_trip(&kinematics, &pose);
    }
}

#[test]
fn six_rus_round_trips_near_center() {
    let kinematics = SixRusKinematics::new(SixRusParams::big_effector());
    for pose in [
        [0.0, 0.0, -206.2, 0.0, 0.0, 0.0],
        [10.0, -10.0, -216.2, 0.0, 0.0, 0.0],
        [5.0, 5.0, -210.0, 0.05, -0.05, 0.1],
    ] {
        assert_round_trip(&kinematics, &pose);
    }
}

/// The documented reference scenario: at the fully stretched center pose all
/// four Quattro arms see identical geometry, and the discriminant degenerates
/// so the elbow-outward branch lands exactly on 90 degrees.
#[test]
fn quattro_reference_pose_yields_four_equal_right_angles() {
    let params = QuattroParams::reference();
    let reach = params.base_radius - params.effector_bar / 2f64.sqrt();
    let z0 = params.l1 + (params.l2 * params.l2 - reach * reach).sqrt();

    let kinematics = QuattroKinematics::new(params);
    let angles = kinematics
        .inverse(&[0.0, 0.0, -z0, FRAC_PI_4])
        .expect("the stretched center pose is reachable");

    assert_eq!(angles.len(), 4);
    for pair in angles.windows(2) {
        assert!((pair[0] - pair[1]).abs() < 1e-9, "angles differ: {:?}", angles);
    }
    for angle in &angles {
        assert!(*angle > 0.0, "angle {} must be positive", angle);
        assert!((angle - FRAC_PI_2).abs() < 1e-9, "angle {} is not 90 degrees", angle);
    }
}

#[test]
fn delta_negative_discriminant_raises_violation() {
    let kinematics = DeltaKinematics::new(DeltaParams::reference());
    assert_eq!(
        kinematics.inverse(&[400.0, 0.0, -150.0]),
        Err(MotionError::WorkspaceViolation)
    );
}

#[test]
fn delta_rejects_pose_when_no_branch_points_outward() {
    let kinematics = DeltaKinematics::new(DeltaParams::reference());
    // The discriminant is positive here, but the second arm's admissible
    // branch comes out negative: rejected by the sign constraint, not the
    // discriminant.
    assert_eq!(
        kinematics.inverse(&[0.0, -40.0, -150.0]),
        Err(MotionError::WorkspaceViolation)
    );
}

#[test]
fn six_rus_has_no_workspace_clamp() {
    // Known gap carried over from the reference behavior: the 6-RUS inverse
    // transform answers even for unreachable poses, through the complex
    // branch of its discriminant.
    let kinematics = SixRusKinematics::new(SixRusParams::big_effector());
    let angles = kinematics.inverse(&[500.0, 0.0, -100.0, 0.0, 0.0, 0.0]).unwrap();
    assert_eq!(angles.len(), 6);
    assert!(angles.iter().all(|a| a.is_finite()));
}

#[test]
fn reconfiguration_changes_the_transform() {
    let mut kinematics = DeltaKinematics::new(DeltaParams::reference());
    let before = kinematics.inverse(&[0.0, 0.0, -180.0]).unwrap();

    kinematics.set_dimensions(&[45.0, 25.0, 50.0, 170.0]).unwrap();
    let after = kinematics.inverse(&[0.0, 0.0, -180.0]).unwrap();

    assert!(
        (before[0] - after[0]).abs() > 1e-6,
        "new dimensions must change the solution"
    );
}
