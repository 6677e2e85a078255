//! Geometric and stepper parameter data structures

use std::f64::consts::PI;
use std::time::Duration;

/// Dimensions of a Delta (3-DOF) mechanism. All lengths in millimeters.
/// See [parameters_robots.rs](parameters_robots.rs) for the reference set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaParams {
    /// Distance from the base center to the driven joints.
    pub base_radius: f64,

    /// Distance from the end-effector center to its joints.
    pub effector_radius: f64,

    /// Length of the bar between the driven joint and the first undriven joint.
    pub l1: f64,

    /// Length of the bar between the first and second undriven joints.
    pub l2: f64,
}

/// Dimensions of a Quattro (4-DOF) mechanism. All lengths in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuattroParams {
    /// Distance from the base center to the driven joints.
    pub base_radius: f64,

    /// Length of an end-effector bar.
    pub effector_bar: f64,

    /// Length of the bar between the driven joint and the first undriven joint.
    pub l1: f64,

    /// Length of the bar between the first and second undriven joints.
    pub l2: f64,
}

/// Dimensions of a 6-RUS strut mechanism. All lengths in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SixRusParams {
    /// Length of the driven crank.
    pub l1: f64,

    /// Length of the coupler rod.
    pub l2: f64,

    /// Effector joint offset along x.
    pub dx: f64,

    /// Effector joint offset along y.
    pub dy: f64,

    /// Base joint offset along x.
    pub base_dx: f64,

    /// Base joint offset along y.
    pub base_dy: f64,
}

/// Microstep resolution selectable on the stepper driver. Finer resolutions
/// trade speed for positioning precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Full,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
}

impl Resolution {
    /// The fraction of a full step one pulse advances the motor by.
    pub fn factor(&self) -> f64 {
        match self {
            Resolution::Full => 1.0,
            Resolution::Half => 1.0 / 2.0,
            Resolution::Quarter => 1.0 / 4.0,
            Resolution::Eighth => 1.0 / 8.0,
            Resolution::Sixteenth => 1.0 / 16.0,
            Resolution::ThirtySecond => 1.0 / 32.0,
        }
    }
}

/// Stepper timing parameters shared by all axes of one robot.
#[derive(Debug, Clone, Copy)]
pub struct StepperConfig {
    /// Microstep resolution the robot normally runs at.
    pub resolution: Resolution,

    /// Full steps per motor revolution (200 for the usual 1.8 degree motors).
    pub steps_per_rev: u32,

    /// Inter-pulse delay at full-step resolution, in seconds. Lower allows
    /// faster rotation but is more susceptible to missed steps.
    pub base_delay: f64,
}

impl StepperConfig {
    /// Shaft angle one pulse advances the motor by, in radians.
    pub fn step_angle(&self) -> f64 {
        self.resolution.factor() * 2.0 * PI / self.steps_per_rev as f64
    }

    /// Effective inter-pulse delay at the configured resolution.
    pub fn step_delay(&self) -> Duration {
        Duration::from_secs_f64(self.resolution.factor() * self.base_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_angle_at_thirty_second() {
        let config = StepperConfig {
            resolution: Resolution::ThirtySecond,
            steps_per_rev: 200,
            base_delay: 0.004,
        };
        // 6400 microsteps per revolution
        assert!((config.step_angle() - 2.0 * PI / 6400.0).abs() < 1e-15);
        assert_eq!(config.step_delay(), Duration::from_micros(125));
    }

    #[test]
    fn resolution_factors_halve() {
        let all = [
            Resolution::Full,
            Resolution::Half,
            Resolution::Quarter,
            Resolution::Eighth,
            Resolution::Sixteenth,
            Resolution::ThirtySecond,
        ];
        for pair in all.windows(2) {
            assert!((pair[0].factor() / 2.0 - pair[1].factor()).abs() < 1e-15);
        }
    }
}
