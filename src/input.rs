//! Operator input: snapshots, mode decoding and manual-drive pose deltas.

use std::collections::VecDeque;

use crate::hardware::InputSource;
use crate::kinematic_traits::{fit_to_dof, Pose};
use crate::runtime::Mode;

/// Translation millimeters added per manual-drive cycle at full stick.
const TRANSLATION_FACTOR: f64 = 1.0;
/// Rotation degrees added per manual-drive cycle per held key.
const ROTATION_FACTOR: f64 = 0.25;

/// One poll of the operator input device. Continuous axes are in `-1..=1`,
/// everything else is a pressed/not-pressed flag. A physical pad maps its
/// sticks and buttons onto these fields, the web remote its widgets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    /// Forward/back translation (x).
    pub surge: f64,
    /// Left/right translation (y).
    pub sway: f64,
    /// Up/down translation (z).
    pub heave: f64,

    pub alpha_plus: bool,
    pub alpha_minus: bool,
    pub beta_plus: bool,
    pub beta_minus: bool,
    pub gamma_plus: bool,
    pub gamma_minus: bool,

    pub stop_button: bool,
    pub off_button: bool,
    pub demo_button: bool,
    pub manual_button: bool,
    pub calibrate_button: bool,
    pub trigger_left: bool,
    pub trigger_right: bool,
    pub confirm_button: bool,
    /// Raised by the web remote only; gates mode evaluation, never switches.
    pub homing_request: bool,
}

/// What the operator asked for, decoded from one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCommand {
    Switch(Mode),
    /// Suppress mode evaluation while a homing runs elsewhere.
    Homing,
}

/// Decodes the mode selection from a snapshot through a fixed priority table
/// of mutually exclusive button combinations. `None` means no change.
pub fn mode_from_snapshot(s: &InputSnapshot) -> Option<ModeCommand> {
    let plain_stop = s.stop_button && !s.confirm_button && !s.calibrate_button && !s.off_button;
    let plain_off = s.off_button && !s.confirm_button && !s.calibrate_button && !s.stop_button;
    let calibrate_combo = s.trigger_right
        && s.trigger_left
        && s.calibrate_button
        && !s.confirm_button
        && !s.off_button
        && !s.stop_button;

    if plain_stop {
        Some(ModeCommand::Switch(Mode::Stop))
    } else if plain_off {
        Some(ModeCommand::Switch(Mode::Off))
    } else if s.demo_button && !s.manual_button {
        Some(ModeCommand::Switch(Mode::Demo))
    } else if s.manual_button && !s.demo_button {
        Some(ModeCommand::Switch(Mode::Manual))
    } else if calibrate_combo {
        Some(ModeCommand::Switch(Mode::Calibrate))
    } else if s.homing_request {
        Some(ModeCommand::Homing)
    } else {
        None
    }
}

/// Reachable bounds the manual drive clamps its targets to, per component.
#[derive(Debug, Clone, Copy)]
pub struct WorkspaceBounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
    pub z: (f64, f64),
    pub alpha: (f64, f64),
    pub beta: (f64, f64),
    pub gamma: (f64, f64),
}

impl WorkspaceBounds {
    /// Manual-drive bounds for a robot with the given degrees of freedom.
    pub fn for_dof(dof: usize) -> Self {
        let alpha = if dof == 4 { (0.4, 1.0) } else { (0.3, 0.9) };
        WorkspaceBounds {
            x: (-60.0, 60.0),
            y: (-60.0, 60.0),
            z: (-290.0, 0.0),
            alpha,
            beta: (0.0, 0.0),
            gamma: (0.0, 0.0),
        }
    }

    fn clamp(&self, pose: &mut [f64]) {
        let limits = [self.x, self.y, self.z, self.alpha, self.beta, self.gamma];
        for (value, (low, high)) in pose.iter_mut().zip(limits) {
            *value = value.clamp(low, high);
        }
    }
}

/// New manual-drive target: the current pose nudged by the snapshot's axes
/// and clamped into the workspace bounds. Always six components; the robot
/// truncates to its degrees of freedom.
pub fn movement_from(s: &InputSnapshot, current: &[f64], bounds: &WorkspaceBounds) -> Pose {
    let mut pose = fit_to_dof(current, 6);

    pose[0] += s.surge * TRANSLATION_FACTOR;
    pose[1] -= s.sway * TRANSLATION_FACTOR;
    pose[2] -= s.heave * TRANSLATION_FACTOR;

    let key = |plus: bool, minus: bool| (plus as i8 - minus as i8) as f64;
    pose[3] = (pose[3].to_degrees() + key(s.alpha_plus, s.alpha_minus) * ROTATION_FACTOR).to_radians();
    pose[4] = (pose[4].to_degrees() + key(s.beta_plus, s.beta_minus) * ROTATION_FACTOR).to_radians();
    pose[5] = (pose[5].to_degrees() + key(s.gamma_plus, s.gamma_minus) * ROTATION_FACTOR).to_radians();

    bounds.clamp(&mut pose);
    pose
}

/// Input source replaying a fixed snapshot sequence; the last snapshot
/// repeats once the script runs out. Backs tests and the demonstration
/// binary.
pub struct ScriptedInput {
    script: VecDeque<InputSnapshot>,
    hold: InputSnapshot,
}

impl ScriptedInput {
    pub fn new(script: Vec<InputSnapshot>) -> Self {
        ScriptedInput {
            script: script.into(),
            hold: InputSnapshot::default(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Option<InputSnapshot> {
        if let Some(next) = self.script.pop_front() {
            self.hold = next.clone();
            Some(next)
        } else {
            Some(self.hold.clone())
        }
    }

    fn still_connected(&mut self) -> bool {
        true
    }

    fn reinit(&mut self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_table_is_exclusive() {
        let mut s = InputSnapshot::default();
        s.stop_button = true;
        assert_eq!(mode_from_snapshot(&s), Some(ModeCommand::Switch(Mode::Stop)));

        // stop together with confirm is not a selection
        s.confirm_button = true;
        assert_eq!(mode_from_snapshot(&s), None);

        let mut s = InputSnapshot::default();
        s.off_button = true;
        assert_eq!(mode_from_snapshot(&s), Some(ModeCommand::Switch(Mode::Off)));

        let mut s = InputSnapshot::default();
        s.demo_button = true;
        assert_eq!(mode_from_snapshot(&s), Some(ModeCommand::Switch(Mode::Demo)));
        s.manual_button = true;
        assert_eq!(mode_from_snapshot(&s), None);

        let mut s = InputSnapshot::default();
        s.manual_button = true;
        assert_eq!(mode_from_snapshot(&s), Some(ModeCommand::Switch(Mode::Manual)));

        let mut s = InputSnapshot::default();
        s.calibrate_button = true;
        assert_eq!(mode_from_snapshot(&s), None, "calibrate needs both triggers");
        s.trigger_left = true;
        s.trigger_right = true;
        assert_eq!(mode_from_snapshot(&s), Some(ModeCommand::Switch(Mode::Calibrate)));

        assert_eq!(mode_from_snapshot(&InputSnapshot::default()), None);
    }

    #[test]
    fn homing_request_gates_but_does_not_switch() {
        let mut s = InputSnapshot::default();
        s.homing_request = true;
        assert_eq!(mode_from_snapshot(&s), Some(ModeCommand::Homing));
    }

    #[test]
    fn manual_target_is_clamped_to_workspace() {
        let bounds = WorkspaceBounds::for_dof(4);
        let mut s = InputSnapshot::default();
        s.surge = 1.0;
        s.heave = -1.0;
        let current = vec![59.5, 0.0, -0.5, 0.7];
        let target = movement_from(&s, &current, &bounds);
        assert_eq!(target[0], 60.0, "x hits the upper bound");
        assert_eq!(target[2], 0.0, "z hits the upper bound");
        // beta and gamma are pinned for every variant
        assert_eq!(target[4], 0.0);
        assert_eq!(target[5], 0.0);
    }

    #[test]
    fn rotation_keys_nudge_in_degrees() {
        let bounds = WorkspaceBounds::for_dof(4);
        let mut s = InputSnapshot::default();
        s.alpha_plus = true;
        let current = vec![0.0, 0.0, -200.0, 0.7];
        let target = movement_from(&s, &current, &bounds);
        let expected = (0.7f64.to_degrees() + 0.25).to_radians();
        assert!((target[3] - expected).abs() < 1e-12);
    }
}
