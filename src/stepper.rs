//! Multi-axis step distribution.
//!
//! Converts a signed per-axis step delta into a single time-sliced pulse
//! train so that all joints arrive together. Rather than finishing one axis
//! before starting the next, the axis with the largest travel sets the
//! iteration count and every other axis spreads its fewer steps evenly over
//! those iterations, which approximates a straight line in joint space.

use std::time::Duration;

use crate::hardware::StepDriver;

pub struct StepSynchronizer {
    /// Direction sign per axis compensating for mirrored motor mounting.
    compensation: Vec<i8>,
    step_delay: Duration,
}

impl StepSynchronizer {
    pub fn new(compensation: Vec<i8>, step_delay: Duration) -> Self {
        StepSynchronizer { compensation, step_delay }
    }

    /// Drives every axis by its signed delta, all axes finishing together.
    ///
    /// Over the whole call axis `i` receives exactly `delta[i].abs()` pulses;
    /// an axis with a zero delta receives none. Iterations where no axis is
    /// due still consume a full pulse cycle, keeping the slicing uniform.
    pub fn move_steps(&self, driver: &mut dyn StepDriver, delta: &[i64]) {
        let moves: Vec<i64> = delta
            .iter()
            .zip(&self.compensation)
            .map(|(steps, sign)| steps * *sign as i64)
            .collect();

        for (axis, value) in moves.iter().enumerate() {
            driver.set_direction(axis, *value >= 0);
        }

        let max_steps = moves.iter().map(|v| v.abs()).max().unwrap_or(0);
        if max_steps == 0 {
            return;
        }

        let mut taken = vec![0i64; moves.len()];
        for iteration in 0..max_steps {
            let due: Vec<bool> = moves
                .iter()
                .enumerate()
                .map(|(axis, value)| {
                    if *value == 0 {
                        return false;
                    }
                    // After how many iterations this axis owes its next step
                    let ratio = max_steps as f64 / (value.abs() as f64 + 1.0);
                    let next = ((taken[axis] + 1) as f64 * ratio).round() as i64;
                    if next == iteration || ratio < 1.0 {
                        taken[axis] += 1;
                        true
                    } else {
                        false
                    }
                })
                .collect();

            driver.pulse_axes(&due, self.step_delay);
        }
    }

    /// One simultaneous step on the flagged axes with explicit direction
    /// signs, bypassing the mounting compensation. The homing stages drive
    /// the motors through this, one sensor poll per step.
    pub fn step_once(
        &self,
        driver: &mut dyn StepDriver,
        axes: &[bool],
        directions: &[i8],
        delay: Duration,
    ) {
        for (axis, sign) in directions.iter().enumerate() {
            driver.set_direction(axis, *sign > 0);
        }
        driver.pulse_axes(axes, delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{DriverLog, SimulatedDriver};
    use std::sync::{Arc, Mutex};

    fn run(delta: &[i64], compensation: Vec<i8>) -> Arc<Mutex<DriverLog>> {
        let mut driver = SimulatedDriver::new(delta.len());
        let log = driver.log();
        let sync = StepSynchronizer::new(compensation, Duration::ZERO);
        sync.move_steps(&mut driver, delta);
        log
    }

    #[test]
    fn every_axis_gets_exactly_its_delta() {
        let log = run(&[2, -5, 1, -10], vec![1, 1, 1, 1]);
        let log = log.lock().unwrap();
        assert_eq!(log.pulses, vec![2, 5, 1, 10]);
        assert_eq!(log.rounds.len(), 10);
    }

    #[test]
    fn zero_delta_axis_never_pulses() {
        let log = run(&[10, 0, 3], vec![1, 1, 1]);
        let log = log.lock().unwrap();
        assert_eq!(log.pulses, vec![10, 0, 3]);
    }

    #[test]
    fn compensation_flips_direction_not_count() {
        let log = run(&[4, 4, 4], vec![-1, 1, -1]);
        let log = log.lock().unwrap();
        assert_eq!(log.pulses, vec![4, 4, 4]);
        assert_eq!(log.directions, vec![false, true, false]);
    }

    #[test]
    fn slow_axis_steps_are_spread_out() {
        let log = run(&[10, 3, 0], vec![1, 1, 1]);
        let log = log.lock().unwrap();
        // Axis 1 must never pulse in two adjacent rounds while axis 0 is
        // still catching up.
        let mut previous_had_axis_1 = false;
        for round in &log.rounds {
            let has_axis_1 = round.contains(&1);
            assert!(!(has_axis_1 && previous_had_axis_1), "axis 1 pulsed twice in a row");
            previous_had_axis_1 = has_axis_1;
        }
        assert_eq!(log.pulses, vec![10, 3, 0]);
    }

    #[test]
    fn all_zero_delta_is_a_no_op() {
        let log = run(&[0, 0, 0], vec![1, 1, 1]);
        assert!(log.lock().unwrap().rounds.is_empty());
    }
}
