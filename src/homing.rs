//! Two-stage sensor-guided calibration.
//!
//! Each axis carries a break-beam sensor at its home limit. The sequencer
//! steps every axis whose sensor has not triggered yet, one simultaneous
//! pulse per sensor poll, first at a coarse microstep resolution for speed
//! and again at the finest one for precision. Between the passes the axes
//! back off the hard stop a little to relieve the sensor pre-load. A final
//! reposition drives the platform a fixed distance away from the limits into
//! a safe ready position. The kinematics are never involved.

use std::time::Duration;

use tracing::info;

use crate::hardware::{HomeSensors, StepDriver};
use crate::motion_error::MotionError;
use crate::parameters::Resolution;
use crate::stepper::StepSynchronizer;

/// Steps driven off the hard stop between the coarse and the fine pass.
const BACKOFF_STEPS: u32 = 8;
/// Steps from the home limit to the ready position, at quarter resolution.
const READY_STEPS: u32 = 200;

pub struct HomingSequencer {
    dof: usize,
    step_delay: Duration,
    /// Iterations a seek may take before giving up on a silent sensor.
    seek_budget: u64,
}

impl HomingSequencer {
    pub fn new(dof: usize) -> Self {
        Self::with_budget(dof, 20_000)
    }

    pub fn with_budget(dof: usize, seek_budget: u64) -> Self {
        HomingSequencer {
            dof,
            step_delay: Duration::from_millis(20),
            seek_budget,
        }
    }

    /// Direction signs toward the home sensors. Every second crank of the
    /// 6-RUS is mounted mirrored.
    fn directions_toward_home(&self) -> Vec<i8> {
        if self.dof == 6 {
            vec![1, -1, 1, -1, 1, -1]
        } else {
            vec![1; self.dof]
        }
    }

    fn directions_away(&self) -> Vec<i8> {
        self.directions_toward_home().iter().map(|d| -d).collect()
    }

    /// Runs the full calibration: coarse pass, fine pass, ready reposition.
    pub fn calibrate(
        &self,
        synchronizer: &StepSynchronizer,
        driver: &mut dyn StepDriver,
        sensors: &mut dyn HomeSensors,
    ) -> Result<(), MotionError> {
        info!("homing: coarse pass");
        self.stage(synchronizer, driver, sensors, Resolution::Half)?;
        info!("homing: fine pass");
        self.stage(synchronizer, driver, sensors, Resolution::ThirtySecond)?;
        self.move_to_ready(synchronizer, driver);
        Ok(())
    }

    fn stage(
        &self,
        synchronizer: &StepSynchronizer,
        driver: &mut dyn StepDriver,
        sensors: &mut dyn HomeSensors,
        resolution: Resolution,
    ) -> Result<(), MotionError> {
        driver.set_resolution(resolution);
        self.seek(synchronizer, driver, sensors)?;

        if resolution != Resolution::ThirtySecond {
            // Move off the top position so the precise pass approaches the
            // sensors freshly instead of starting pre-loaded.
            let away = self.directions_away();
            let all_axes = vec![true; self.dof];
            for _ in 0..BACKOFF_STEPS {
                synchronizer.step_once(driver, &all_axes, &away, self.step_delay);
            }
        }

        driver.set_resolution(Resolution::ThirtySecond);
        Ok(())
    }

    /// Steps every axis toward home until its sensor triggers.
    fn seek(
        &self,
        synchronizer: &StepSynchronizer,
        driver: &mut dyn StepDriver,
        sensors: &mut dyn HomeSensors,
    ) -> Result<(), MotionError> {
        let toward = self.directions_toward_home();
        for _ in 0..self.seek_budget {
            let seeking: Vec<bool> = (0..self.dof)
                .map(|axis| !sensors.triggered(axis))
                .collect();
            if !seeking.iter().any(|s| *s) {
                return Ok(());
            }
            synchronizer.step_once(driver, &seeking, &toward, self.step_delay);
        }

        let axes: Vec<usize> = (0..self.dof)
            .filter(|axis| !sensors.triggered(*axis))
            .collect();
        Err(MotionError::HomingTimeout { axes })
    }

    /// Drives all axes a fixed distance away from the home limits.
    fn move_to_ready(&self, synchronizer: &StepSynchronizer, driver: &mut dyn StepDriver) {
        driver.set_resolution(Resolution::Quarter);
        let away = self.directions_away();
        let all_axes = vec![true; self.dof];
        for _ in 0..READY_STEPS {
            synchronizer.step_once(driver, &all_axes, &away, self.step_delay);
        }
        driver.set_resolution(Resolution::ThirtySecond);
    }
}
