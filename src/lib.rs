//! Motion control for parallel kinematic machines: 3-DOF Delta, 4-DOF
//! Quattro and 6-DOF 6-RUS strut platforms, driven from Cartesian pose
//! commands down to synchronized stepper-motor pulse trains.
//!
//! The pipeline: a [`robot::Robot`] owns one geometry behind the
//! [`kinematic_traits::Kinematics`] trait and turns target poses into joint
//! angles (closed-form inverse transforms, one per geometry), joint angles
//! into absolute microstep counts, and step deltas into a fair time-sliced
//! pulse train through the [`stepper::StepSynchronizer`] so that all axes
//! arrive together. Linear moves interpolate position linearly and
//! orientation spherically between the end poses, with optional best-effort
//! velocity pacing.
//!
//! Around the motion core, [`runtime::Runtime`] arbitrates the operating
//! modes (off, demo, manual, calibrate, stop) between a motion loop and
//! periodic input-evaluation, connectivity and indicator tasks, and
//! [`homing::HomingSequencer`] calibrates against the per-axis home sensors
//! in a coarse/fine two-stage pass.
//!
//! Hardware is consumed strictly through the traits in [`hardware`]; the
//! crate ships simulated implementations that back the test suite and the
//! demonstration binary.
//!
//! # Example
//!
//! ```
//! use rs_pkm_motion::hardware::SimulatedDriver;
//! use rs_pkm_motion::robot::{Robot, RobotVariant};
//!
//! let mut robot = Robot::build(RobotVariant::Delta, Box::new(SimulatedDriver::new(3)));
//! robot.home("90").expect("reference pose is reachable");
//! robot.mov(&[10.0, -10.0, robot.home_pose()[2] + 20.0]).expect("inside the workspace");
//! ```

pub mod parameters;
pub mod parameters_robots;

pub mod utils;
pub mod kinematic_traits;
pub mod motion_error;

#[path = "geometry/delta.rs"]
pub mod delta;

#[path = "geometry/quattro.rs"]
pub mod quattro;

#[path = "geometry/six_rus.rs"]
pub mod six_rus;

#[path = "geometry/forward.rs"]
mod forward_solver;

pub mod interpolation;

pub mod hardware;
pub mod stepper;
pub mod robot;
pub mod homing;

pub mod input;
pub mod demo;
pub mod indicator;
pub mod runtime;

#[cfg(test)]
mod tests;
