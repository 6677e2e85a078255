use std::time::Instant;

use crate::delta::DeltaKinematics;
use crate::hardware::SimulatedDriver;
use crate::kinematic_traits::Kinematics;
use crate::motion_error::MotionError;
use crate::parameters::DeltaParams;
use crate::robot::{Robot, RobotVariant};

fn delta_robot() -> (Robot, std::sync::Arc<std::sync::Mutex<crate::hardware::DriverLog>>) {
    let driver = SimulatedDriver::new(3);
    let log = driver.log();
    let mut robot = Robot::build(RobotVariant::Delta, Box::new(driver));
    robot.home("90").expect("reference homing");
    (robot, log)
}

#[test]
fn homing_adopts_the_reference_pose() {
    let (robot, _) = delta_robot();
    assert_eq!(robot.current_pose(), robot.home_pose());
    // 90 degrees per joint, in microsteps of the configured resolution
    let quarter_turn = (std::f64::consts::FRAC_PI_2 / robot.config().step_angle()).round() as i64;
    assert_eq!(robot.current_steps(), &[quarter_turn; 3][..]);
    // The reference pose sits straight below the base center
    assert!(robot.home_pose()[0].abs() < 1e-6);
    assert!(robot.home_pose()[1].abs() < 1e-6);
    assert!(robot.home_pose()[2] < -200.0);
}

#[test]
fn unknown_homing_method_is_a_configuration_error() {
    let (mut robot, _) = delta_robot();
    assert!(matches!(
        robot.home("45"),
        Err(MotionError::Configuration(_))
    ));
}

#[test]
fn ptp_move_commits_pose_and_steps_together() {
    let (mut robot, log) = delta_robot();
    let before = robot.current_steps().to_vec();

    let target = vec![20.0, -15.0, robot.home_pose()[2] + 25.0];
    robot.mov(&target).expect("target is inside the workspace");

    assert_eq!(robot.current_pose(), &target[..]);

    // Steps must be the exact step-equivalent of the committed pose
    let kinematics = DeltaKinematics::new(DeltaParams::reference());
    let angles = kinematics.inverse(&target).unwrap();
    let expected = robot.angles_to_steps(&angles);
    assert_eq!(robot.current_steps(), &expected[..]);

    // And every axis received exactly its travel in pulses
    let log = log.lock().unwrap();
    for axis in 0..3 {
        let travel = (expected[axis] - before[axis]).unsigned_abs();
        assert_eq!(log.pulses[axis], travel, "axis {}", axis);
    }
}

#[test]
fn workspace_violation_leaves_the_robot_untouched() {
    let (mut robot, log) = delta_robot();
    let pose_before = robot.current_pose().to_vec();
    let steps_before = robot.current_steps().to_vec();

    let result = robot.mov(&[400.0, 0.0, -150.0]);
    assert_eq!(result, Err(MotionError::WorkspaceViolation));

    assert_eq!(robot.current_pose(), &pose_before[..]);
    assert_eq!(robot.current_steps(), &steps_before[..]);
    assert!(log.lock().unwrap().rounds.is_empty(), "no pulses may be emitted");
}

#[test]
fn oversized_pose_is_truncated_to_dof() {
    let (mut robot, _) = delta_robot();
    let z = robot.home_pose()[2] + 20.0;
    robot.mov(&[5.0, 5.0, z, 9.9, 9.9, 9.9]).expect("extra components are dropped");
    assert_eq!(robot.current_pose().len(), 3);
}

#[test]
fn linear_move_arrives_with_consistent_state() {
    let (mut robot, _) = delta_robot();
    let z = robot.home_pose()[2] + 30.0;
    robot.mov(&[0.0, 0.0, z]).unwrap();

    let target = vec![20.0, 0.0, z];
    robot.mov_lin(&target, 10.0, 3.0, None).unwrap();

    for (have, want) in robot.current_pose().iter().zip(&target) {
        assert!((have - want).abs() < 1e-9);
    }
    let kinematics = DeltaKinematics::new(DeltaParams::reference());
    let expected = robot.angles_to_steps(&kinematics.inverse(&target).unwrap());
    assert_eq!(robot.current_steps(), &expected[..]);
}

#[test]
fn linear_move_keeps_progress_up_to_the_workspace_edge() {
    let (mut robot, _) = delta_robot();
    let z = robot.home_pose()[2] + 40.0;
    robot.mov(&[0.0, 0.0, z]).unwrap();

    // Far outside laterally; the move must end quietly at the boundary
    robot.mov_lin(&[200.0, 0.0, z], 10.0, 3.0, None).expect("partial motion is not an error");

    let x = robot.current_pose()[0];
    assert!(x > 0.0, "some waypoints must have been reached, got x = {}", x);
    assert!(x < 200.0, "the target itself is unreachable");
}

#[test]
fn velocity_pacing_stretches_the_move_in_time() {
    let (mut robot, _) = delta_robot();
    let z = robot.home_pose()[2] + 30.0;
    robot.mov(&[0.0, 0.0, z]).unwrap();

    // 20 mm at 4 cm/s: half a second of schedule for an otherwise
    // instantaneous simulated move
    let started = Instant::now();
    robot.mov_lin(&[20.0, 0.0, z], 10.0, 3.0, Some(4.0)).unwrap();
    assert!(started.elapsed().as_secs_f64() > 0.4);
}

#[test]
fn unknown_variant_name_is_rejected() {
    assert!(matches!(
        "hexapod".parse::<RobotVariant>(),
        Err(MotionError::Configuration(_))
    ));
    assert_eq!("Quattro".parse::<RobotVariant>().unwrap(), RobotVariant::Quattro);
    assert_eq!(" 6rus ".parse::<RobotVariant>().unwrap(), RobotVariant::SixRus);
}
