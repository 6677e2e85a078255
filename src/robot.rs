//! The robot aggregate: geometry, stepper state and the two move primitives.

use std::f64::consts::FRAC_PI_2;
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::delta::DeltaKinematics;
use crate::hardware::StepDriver;
use crate::interpolation;
use crate::kinematic_traits::{fit_to_dof, Kinematics, Pose, Steps};
use crate::motion_error::MotionError;
use crate::parameters::{DeltaParams, QuattroParams, Resolution, SixRusParams, StepperConfig};
use crate::quattro::QuattroKinematics;
use crate::six_rus::SixRusKinematics;
use crate::stepper::StepSynchronizer;

/// The supported parallel-kinematic geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotVariant {
    Delta,
    Quattro,
    SixRus,
}

impl FromStr for RobotVariant {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, MotionError> {
        match s.trim().to_lowercase().as_str() {
            "delta" => Ok(RobotVariant::Delta),
            "quattro" => Ok(RobotVariant::Quattro),
            "6rus" | "sixrus" => Ok(RobotVariant::SixRus),
            other => Err(MotionError::Configuration(format!(
                "unknown robot type: {}",
                other
            ))),
        }
    }
}

/// One physical robot. Created once at startup; every successful move and
/// every homing mutates its pose and step state, nothing else does.
///
/// Invariant: `current_steps` is always the integral step-equivalent of the
/// last committed pose under the current geometry; a move updates both or
/// neither.
pub struct Robot {
    kinematics: Box<dyn Kinematics>,
    config: StepperConfig,
    synchronizer: StepSynchronizer,
    driver: Box<dyn StepDriver>,
    current_pose: Pose,
    current_steps: Steps,
    home_pose: Pose,
}

impl Robot {
    pub fn new(
        kinematics: Box<dyn Kinematics>,
        rotation_compensation: Vec<i8>,
        config: StepperConfig,
        driver: Box<dyn StepDriver>,
    ) -> Self {
        let dof = kinematics.dof();
        Robot {
            synchronizer: StepSynchronizer::new(rotation_compensation, config.step_delay()),
            kinematics,
            config,
            driver,
            current_pose: vec![0.0; dof],
            current_steps: vec![0; dof],
            home_pose: vec![0.0; dof],
        }
    }

    /// Builds a variant with its reference dimensions and stepper timing.
    pub fn build(variant: RobotVariant, driver: Box<dyn StepDriver>) -> Self {
        let (kinematics, compensation, base_delay): (Box<dyn Kinematics>, Vec<i8>, f64) =
            match variant {
                RobotVariant::Delta => (
                    Box::new(DeltaKinematics::new(DeltaParams::reference())),
                    vec![-1; 3],
                    0.002,
                ),
                RobotVariant::Quattro => (
                    Box::new(QuattroKinematics::new(QuattroParams::reference())),
                    vec![-1; 4],
                    0.004,
                ),
                RobotVariant::SixRus => (
                    Box::new(SixRusKinematics::new(SixRusParams::big_effector())),
                    vec![1, -1, 1, -1, 1, -1],
                    0.002,
                ),
            };
        let config = StepperConfig {
            resolution: Resolution::ThirtySecond,
            steps_per_rev: 200,
            base_delay,
        };
        Self::new(kinematics, compensation, config, driver)
    }

    pub fn dof(&self) -> usize {
        self.kinematics.dof()
    }

    pub fn current_pose(&self) -> &[f64] {
        &self.current_pose
    }

    pub fn current_steps(&self) -> &[i64] {
        &self.current_steps
    }

    pub fn home_pose(&self) -> &[f64] {
        &self.home_pose
    }

    pub fn config(&self) -> &StepperConfig {
        &self.config
    }

    /// Replaces the geometric dimensions wholesale. Must happen before the
    /// kinematics are trusted, never implicitly.
    pub fn set_dimensions(&mut self, params: &[f64]) -> Result<(), MotionError> {
        self.kinematics.set_dimensions(params)
    }

    pub fn energize(&mut self) {
        self.driver.energize();
    }

    pub fn release(&mut self) {
        self.driver.release();
    }

    /// Converts joint angles to absolute step counts.
    pub fn angles_to_steps(&self, angles: &[f64]) -> Steps {
        let step_angle = self.config.step_angle();
        angles.iter().map(|a| (a / step_angle).round() as i64).collect()
    }

    /// Borrows the pulse machinery for the homing stages.
    pub(crate) fn stepper_access(&mut self) -> (&StepSynchronizer, &mut dyn StepDriver) {
        (&self.synchronizer, self.driver.as_mut())
    }

    /// Adopts the reference pose as current and home state.
    ///
    /// Method `"90"` puts every joint at 90 degrees and derives the matching
    /// pose through forward kinematics. Any other name is a configuration
    /// error.
    pub fn home(&mut self, method: &str) -> Result<(), MotionError> {
        match method {
            "90" => {
                let angles = vec![FRAC_PI_2; self.dof()];
                let pose = self.kinematics.forward(&angles)?;
                info!("robot is now at homing pose {:?}", pose);
                self.current_steps = self.angles_to_steps(&angles);
                self.current_pose = pose.clone();
                self.home_pose = pose;
                Ok(())
            }
            other => Err(MotionError::Configuration(format!(
                "chosen homing method '{}' is not defined",
                other
            ))),
        }
    }

    /// Point-to-point move: joints travel straight to the target angles.
    ///
    /// On a workspace violation nothing moves and nothing is committed.
    pub fn mov(&mut self, pose: &[f64]) -> Result<(), MotionError> {
        let pose = fit_to_dof(pose, self.dof());
        let angles = self.kinematics.inverse(&pose)?;
        let target_steps = self.angles_to_steps(&angles);
        let delta: Steps = target_steps
            .iter()
            .zip(&self.current_steps)
            .map(|(target, current)| target - current)
            .collect();

        self.synchronizer.move_steps(self.driver.as_mut(), &delta);

        for (current, moved) in self.current_steps.iter_mut().zip(&delta) {
            *current += moved;
        }
        // The commanded pose is committed verbatim; its exact step
        // equivalent can differ by up to half a step per axis.
        self.current_pose = pose;
        Ok(())
    }

    /// Linearly interpolated move with optional velocity pacing.
    ///
    /// `pos_res` is interpolation points per centimeter of travel, `ang_res`
    /// points per ten degrees of rotation, `velocity` centimeters per second.
    /// A waypoint outside the workspace ends the move there; the progress
    /// already made stays committed. Pacing is best effort: falling behind
    /// schedule warns and continues, it never aborts the move.
    pub fn mov_lin(
        &mut self,
        pose: &[f64],
        pos_res: f64,
        ang_res: f64,
        velocity: Option<f64>,
    ) -> Result<(), MotionError> {
        let target = fit_to_dof(pose, self.dof());

        let distance = (0..3)
            .map(|axis| (target[axis] - self.current_pose[axis]).powi(2))
            .sum::<f64>()
            .sqrt();
        let rotation = interpolation::rotation_between(&self.current_pose, &target);
        let count = interpolation::waypoint_count(distance, rotation, pos_res, ang_res);
        if count == 0 {
            return Ok(());
        }

        let mut ideal_step_duration = None;
        if let Some(velocity) = velocity {
            if velocity > 0.0 {
                let total_duration = (distance / 10.0) / velocity;
                ideal_step_duration = Some(total_duration / count as f64);
            } else {
                warn!("given velocity is zero or negative, using default");
            }
        }

        let waypoints = interpolation::slerp_poses(&self.current_pose, &target, count);
        let step_delay = self.config.step_delay().as_secs_f64();
        let started = Instant::now();

        for (index, waypoint) in waypoints.iter().enumerate() {
            match self.mov(waypoint) {
                Ok(()) => {}
                Err(MotionError::WorkspaceViolation) => {
                    debug!("linear move ends at waypoint {}: workspace violation", index);
                    break;
                }
                Err(other) => return Err(other),
            }

            if let Some(dt_ideal) = ideal_step_duration {
                let ideal = (index + 1) as f64 * dt_ideal;
                let lag = ideal - started.elapsed().as_secs_f64();
                if lag > step_delay {
                    thread::sleep(Duration::from_secs_f64(lag));
                } else if lag < -2.0 * step_delay {
                    warn!("can not keep velocity");
                }
            }
        }
        Ok(())
    }
}
