//! Shared indicator-LED state and the blink task.
//!
//! The runtime writes the desired mode of each LED channel on mode and phase
//! changes; a dedicated task owns the actual pins and periodically renders
//! the state, toggling any blinking channel. Each channel is one atomic
//! cell, so neither side ever takes a lock for it.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread;
use std::time::Duration;

use crate::hardware::Indicator;

/// Steady/blink indicator showing whether the robot is powered or idle.
pub const POWER_LED: usize = 0;
/// Lit while a motion mode (demo, manual, calibrate) is active.
pub const ACTIVITY_LED: usize = 1;
/// Input-device connectivity.
pub const LINK_LED: usize = 2;

pub const CHANNELS: usize = 3;

const BLINK_INTERVAL: Duration = Duration::from_millis(250);
const IDLE_INTERVAL: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedMode {
    Off,
    On,
    Blink,
}

/// Desired LED state, one atomic per channel.
#[derive(Default)]
pub struct IndicatorState {
    modes: [AtomicU8; CHANNELS],
}

impl IndicatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, channel: usize, mode: LedMode) {
        let value = match mode {
            LedMode::Off => 0,
            LedMode::On => 1,
            LedMode::Blink => 2,
        };
        self.modes[channel].store(value, Ordering::Relaxed);
    }

    pub fn get(&self, channel: usize) -> LedMode {
        match self.modes[channel].load(Ordering::Relaxed) {
            1 => LedMode::On,
            2 => LedMode::Blink,
            _ => LedMode::Off,
        }
    }

    fn snapshot(&self) -> [LedMode; CHANNELS] {
        std::array::from_fn(|channel| self.get(channel))
    }
}

/// Renders the shared state onto the LEDs until `stopped` is raised.
/// Blinking channels toggle every quarter second; with nothing blinking the
/// task idles at a slow poll.
pub fn blink_loop(state: &IndicatorState, indicator: &mut dyn Indicator, stopped: &AtomicBool) {
    let mut phase = false;
    while !stopped.load(Ordering::Relaxed) {
        let modes = state.snapshot();
        for (channel, mode) in modes.iter().enumerate() {
            let level = match mode {
                LedMode::On => true,
                LedMode::Off => false,
                LedMode::Blink => phase,
            };
            indicator.set(channel, level);
        }

        if modes.contains(&LedMode::Blink) {
            phase = !phase;
            thread::sleep(BLINK_INTERVAL);
        } else {
            thread::sleep(IDLE_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_per_channel() {
        let state = IndicatorState::new();
        state.set(POWER_LED, LedMode::Blink);
        state.set(ACTIVITY_LED, LedMode::On);
        assert_eq!(state.get(POWER_LED), LedMode::Blink);
        assert_eq!(state.get(ACTIVITY_LED), LedMode::On);
        assert_eq!(state.get(LINK_LED), LedMode::Off);
    }
}
