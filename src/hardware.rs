//! Collaborator seams to the hardware, and simulated stand-ins.
//!
//! The core never touches GPIO directly; it drives motors, reads sensors and
//! updates the operator displays through these traits. None of the methods
//! return errors: a pulse that cannot reach a motor or a display that cannot
//! be written is a fatal hardware condition no caller in here could handle.
//!
//! The simulated implementations record what the core asked of them. They
//! back the test suite and the demonstration binary; a deployment replaces
//! them with thin GPIO wrappers.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::input::InputSnapshot;
use crate::parameters::Resolution;

/// Stepper pulse output for all axes of one robot.
pub trait StepDriver: Send {
    /// Selects the microstep resolution on the driver mode pins.
    fn set_resolution(&mut self, resolution: Resolution);

    /// Latches the rotation direction of one axis.
    fn set_direction(&mut self, axis: usize, forward: bool);

    /// One simultaneous pulse cycle: every flagged axis goes high together,
    /// holds, then goes low together and holds again.
    fn pulse_axes(&mut self, axes: &[bool], hold: Duration);

    /// Energizes the motor coils (holding torque on).
    fn energize(&mut self);

    /// De-energizes the motor coils.
    fn release(&mut self);
}

/// Binary home limit sensors, one per axis.
pub trait HomeSensors: Send {
    /// Whether the axis interrupts its break-beam at the home position.
    fn triggered(&mut self, axis: usize) -> bool;
}

/// Operator input device; a physical pad and a web remote are the two known
/// implementations.
pub trait InputSource: Send {
    /// Latest input snapshot, or `None` while the device is unavailable.
    fn poll(&mut self) -> Option<InputSnapshot>;

    /// Cheap liveness check, polled every few seconds.
    fn still_connected(&mut self) -> bool;

    /// Reinitializes the device after (re)connection. Returns success.
    fn reinit(&mut self) -> bool;
}

/// Status output. Fire-and-forget: implementations must never block motion,
/// an unavailable display simply swallows the updates.
pub trait StatusDisplay: Send {
    fn print_pose(&mut self, pose: &[f64]);
    fn print_status(&mut self, status: &str);
    fn print_connected(&mut self, connected: bool);
}

/// Indicator LEDs, driven by the blink task only.
pub trait Indicator: Send {
    fn set(&mut self, channel: usize, on: bool);
}

/// What the simulated driver has been asked to do so far.
#[derive(Debug)]
pub struct DriverLog {
    pub resolution: Resolution,
    pub directions: Vec<bool>,
    /// Pulses emitted per axis, over the whole life of the driver.
    pub pulses: Vec<u64>,
    /// Axis positions in full-step units, signed by the latched direction.
    pub positions: Vec<f64>,
    /// Every pulse cycle in order, as the list of axes that stepped in it.
    pub rounds: Vec<Vec<usize>>,
    pub energized: bool,
}

/// In-memory stand-in for the stepper driver. With `realtime` set it sleeps
/// through the pulse holds like real hardware would make it.
pub struct SimulatedDriver {
    log: Arc<Mutex<DriverLog>>,
    /// Mechanical sign per axis: a mirrored motor moves its crank the other
    /// way for the same direction pin state.
    mounting: Vec<i8>,
    realtime: bool,
}

impl SimulatedDriver {
    pub fn new(dof: usize) -> Self {
        Self::with_realtime(dof, false)
    }

    pub fn with_realtime(dof: usize, realtime: bool) -> Self {
        Self::with_mounting(vec![1; dof], realtime)
    }

    pub fn with_mounting(mounting: Vec<i8>, realtime: bool) -> Self {
        let dof = mounting.len();
        SimulatedDriver {
            log: Arc::new(Mutex::new(DriverLog {
                resolution: Resolution::ThirtySecond,
                directions: vec![true; dof],
                pulses: vec![0; dof],
                positions: vec![0.0; dof],
                rounds: Vec::new(),
                energized: false,
            })),
            mounting,
            realtime,
        }
    }

    /// Handle to the recorded state, shared with any interested observer.
    pub fn log(&self) -> Arc<Mutex<DriverLog>> {
        self.log.clone()
    }
}

impl StepDriver for SimulatedDriver {
    fn set_resolution(&mut self, resolution: Resolution) {
        self.log.lock().expect("driver log poisoned").resolution = resolution;
    }

    fn set_direction(&mut self, axis: usize, forward: bool) {
        self.log.lock().expect("driver log poisoned").directions[axis] = forward;
    }

    fn pulse_axes(&mut self, axes: &[bool], hold: Duration) {
        {
            let mut log = self.log.lock().expect("driver log poisoned");
            let mut round = Vec::new();
            let factor = log.resolution.factor();
            for (axis, stepping) in axes.iter().enumerate() {
                if *stepping {
                    log.pulses[axis] += 1;
                    let pin = if log.directions[axis] { 1.0 } else { -1.0 };
                    log.positions[axis] += pin * self.mounting[axis] as f64 * factor;
                    round.push(axis);
                }
            }
            log.rounds.push(round);
        }
        if self.realtime {
            // high hold plus low hold
            thread::sleep(hold * 2);
        }
    }

    fn energize(&mut self) {
        self.log.lock().expect("driver log poisoned").energized = true;
    }

    fn release(&mut self) {
        self.log.lock().expect("driver log poisoned").energized = false;
    }
}

/// Home sensors watching a simulated driver: an axis reads triggered once its
/// position has travelled to the configured threshold (full-step units).
pub struct SimulatedSensors {
    driver: Arc<Mutex<DriverLog>>,
    trigger_at: Vec<f64>,
}

impl SimulatedSensors {
    pub fn new(driver: Arc<Mutex<DriverLog>>, trigger_at: Vec<f64>) -> Self {
        SimulatedSensors { driver, trigger_at }
    }
}

impl HomeSensors for SimulatedSensors {
    fn triggered(&mut self, axis: usize) -> bool {
        let log = self.driver.lock().expect("driver log poisoned");
        log.positions[axis] >= self.trigger_at[axis]
    }
}

/// What the simulated display has been asked to show.
#[derive(Debug, Default)]
pub struct DisplayLog {
    pub statuses: Vec<String>,
    pub poses: Vec<Vec<f64>>,
    pub connected: Vec<bool>,
}

/// In-memory stand-in for the status display.
#[derive(Default)]
pub struct SimulatedDisplay {
    log: Arc<Mutex<DisplayLog>>,
}

impl SimulatedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Arc<Mutex<DisplayLog>> {
        self.log.clone()
    }
}

impl StatusDisplay for SimulatedDisplay {
    fn print_pose(&mut self, pose: &[f64]) {
        self.log.lock().expect("display log poisoned").poses.push(pose.to_vec());
    }

    fn print_status(&mut self, status: &str) {
        self.log.lock().expect("display log poisoned").statuses.push(status.to_string());
    }

    fn print_connected(&mut self, connected: bool) {
        self.log.lock().expect("display log poisoned").connected.push(connected);
    }
}

/// In-memory stand-in for the indicator LEDs.
#[derive(Default)]
pub struct SimulatedIndicator {
    log: Arc<Mutex<Vec<(usize, bool)>>>,
}

impl SimulatedIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Arc<Mutex<Vec<(usize, bool)>>> {
        self.log.clone()
    }
}

impl Indicator for SimulatedIndicator {
    fn set(&mut self, channel: usize, on: bool) {
        self.log.lock().expect("indicator log poisoned").push((channel, on));
    }
}
