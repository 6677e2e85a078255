//! Error handling for kinematics and motion

use std::fmt;

/// Unified error for everything that can go wrong between a pose command and
/// the pulses reaching the motors. Hardware faults are deliberately absent:
/// the pulse driver, sensors and display are assumed infallible, and a broken
/// wire is a fatal condition no recovery path in here could fix.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// The requested pose has no admissible joint solution: an axis
    /// discriminant went negative, or no solution branch satisfied the
    /// elbow-outward sign constraints.
    WorkspaceViolation,
    /// Unknown robot variant, unknown homing method, or geometry parameters
    /// of the wrong arity. Fatal, surfaced immediately.
    Configuration(String),
    /// The forward-kinematics root finder exhausted its iteration budget
    /// without driving the residual below tolerance.
    SolverDidNotConverge { residual: f64 },
    /// A home sensor never triggered within the homing iteration budget.
    /// Carries the axes that were still seeking when the budget ran out.
    HomingTimeout { axes: Vec<usize> },
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MotionError::WorkspaceViolation =>
                write!(f, "target pose is outside the reachable workspace"),
            MotionError::Configuration(msg) =>
                write!(f, "Configuration Error: {}", msg),
            MotionError::SolverDidNotConverge { residual } =>
                write!(f, "forward kinematics did not converge (residual {})", residual),
            MotionError::HomingTimeout { axes } =>
                write!(f, "home sensor(s) on axes {:?} never triggered", axes),
        }
    }
}

impl std::error::Error for MotionError {}
