//! Mode arbitration and the concurrent runtime.
//!
//! One motion loop owns the robot and executes the behavior of the active
//! mode; an input-evaluation task decodes operator input into mode
//! candidates every 100 ms; a connectivity task watches the input device and
//! reinitializes it when it reappears; a blink task renders the indicator
//! state. The active mode sits behind a single mutex, the ignore-input gate
//! and the stop flag are atomics. Robot pose and step state are touched by
//! the motion loop only, so they need no locking at all.
//!
//! There is no preemptive cancellation: an in-flight motion finishes its
//! waypoint, and the cooperative mode check between waypoints is the only
//! abort path. The stop flag makes every task exit on its next wake.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::demo::DemoRegistry;
use crate::hardware::{HomeSensors, Indicator, InputSource, StatusDisplay};
use crate::homing::HomingSequencer;
use crate::indicator::{blink_loop, IndicatorState, LedMode, ACTIVITY_LED, POWER_LED};
use crate::input::{self, InputSnapshot, ModeCommand, WorkspaceBounds};
use crate::kinematic_traits::MoveKind;
use crate::motion_error::MotionError;
use crate::robot::Robot;

const INPUT_POLL: Duration = Duration::from_millis(100);
const CONNECTIVITY_POLL: Duration = Duration::from_secs(5);
const MANUAL_CYCLE: Duration = Duration::from_millis(5);
const DEMO_PAUSE: Duration = Duration::from_secs(2);
const CALIBRATE_SETTLE: Duration = Duration::from_millis(500);
/// Keeps the idle modes from spinning without delaying mode changes.
const IDLE_NAP: Duration = Duration::from_micros(100);
/// Granularity at which sleeping tasks notice the stop flag.
const WAKE_SLICE: Duration = Duration::from_millis(50);

/// Operating mode of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Motors de-energized, nothing moves.
    Off,
    /// Scripted demonstration trajectories.
    Demo,
    /// Operator drives the robot directly.
    Manual,
    /// Sensor-guided homing runs.
    Calibrate,
    /// Motors energized and holding position.
    Stop,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Mode::Off => "off",
            Mode::Demo => "demo",
            Mode::Manual => "manual",
            Mode::Calibrate => "calibrate",
            Mode::Stop => "stop",
        };
        write!(f, "{}", name)
    }
}

/// State shared between the motion loop and the periodic tasks.
pub struct SharedState {
    mode: Mutex<Mode>,
    ignore_input: AtomicBool,
    stopped: AtomicBool,
    latest_input: Mutex<InputSnapshot>,
    pub indicator: IndicatorState,
}

impl SharedState {
    pub fn new() -> Self {
        SharedState {
            mode: Mutex::new(Mode::Off),
            ignore_input: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            latest_input: Mutex::new(InputSnapshot::default()),
            indicator: IndicatorState::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        *self.mode.lock().expect("mode lock poisoned")
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock().expect("mode lock poisoned") = mode;
    }

    /// Asks every task, including the motion loop, to exit on its next wake.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    pub fn set_ignore_input(&self, ignore: bool) {
        self.ignore_input.store(ignore, Ordering::Relaxed);
    }

    pub fn ignores_input(&self) -> bool {
        self.ignore_input.load(Ordering::Relaxed)
    }

    pub fn latest_input(&self) -> InputSnapshot {
        self.latest_input.lock().expect("input lock poisoned").clone()
    }

    fn store_input(&self, snapshot: InputSnapshot) {
        *self.latest_input.lock().expect("input lock poisoned") = snapshot;
    }

    pub(crate) fn stop_flag(&self) -> &AtomicBool {
        &self.stopped
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a decoded mode candidate. A candidate equal to the current mode
/// is debounced: nothing is written and no display update happens. Returns
/// whether the mode actually changed.
pub fn apply_candidate(
    shared: &SharedState,
    display: &Mutex<Box<dyn StatusDisplay>>,
    candidate: ModeCommand,
) -> bool {
    match candidate {
        ModeCommand::Homing => {
            shared.set_ignore_input(true);
            false
        }
        ModeCommand::Switch(mode) => {
            let current = shared.mode();
            if current == mode {
                return false;
            }
            debug!("switching from {} to {}", current, mode);
            if let Ok(mut display) = display.lock() {
                display.print_status(&format!("Status: {}", mode));
            }
            shared.set_mode(mode);
            true
        }
    }
}

/// Sleeps for `period`, waking early if the stop flag is raised.
fn sleep_until(shared: &SharedState, period: Duration) {
    let deadline = Instant::now() + period;
    while !shared.is_stopped() {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep(WAKE_SLICE.min(deadline - now));
    }
}

/// The top-level orchestrator: owns the robot, arbitrates modes and drives
/// motion according to the active one.
pub struct Runtime {
    robot: Robot,
    homing: HomingSequencer,
    sensors: Box<dyn HomeSensors>,
    display: Arc<Mutex<Box<dyn StatusDisplay>>>,
    registry: DemoRegistry,
    bounds: WorkspaceBounds,
    shared: Arc<SharedState>,
}

impl Runtime {
    pub fn new(robot: Robot, sensors: Box<dyn HomeSensors>, display: Box<dyn StatusDisplay>) -> Self {
        let dof = robot.dof();
        Runtime {
            homing: HomingSequencer::new(dof),
            bounds: WorkspaceBounds::for_dof(dof),
            registry: DemoRegistry::standard(),
            shared: Arc::new(SharedState::new()),
            display: Arc::new(Mutex::new(display)),
            sensors,
            robot,
        }
    }

    /// Handle to the shared state, e.g. for stopping the runtime or
    /// selecting a mode from outside.
    pub fn shared(&self) -> Arc<SharedState> {
        self.shared.clone()
    }

    /// Homes the robot, starts the periodic tasks and runs the motion loop
    /// until the stop flag is raised or a fatal error surfaces.
    pub fn run(
        &mut self,
        input: Box<dyn InputSource>,
        mut indicator: Box<dyn Indicator>,
    ) -> Result<(), MotionError> {
        self.robot.home("90")?;
        if let Ok(mut display) = self.display.lock() {
            display.print_status("Started");
        }

        let source = Arc::new(Mutex::new(input));
        let input_task = spawn_input_task(self.shared.clone(), self.display.clone(), source.clone());
        let connectivity_task =
            spawn_connectivity_task(self.shared.clone(), self.display.clone(), source);

        let blink_shared = self.shared.clone();
        let blink_task = thread::spawn(move || {
            blink_loop(&blink_shared.indicator, indicator.as_mut(), blink_shared.stop_flag());
        });

        let result = self.motion_loop();

        // Whether we stopped or failed, take the tasks down with us.
        self.shared.stop();
        let _ = input_task.join();
        let _ = connectivity_task.join();
        let _ = blink_task.join();
        result
    }

    fn motion_loop(&mut self) -> Result<(), MotionError> {
        while !self.shared.is_stopped() {
            match self.shared.mode() {
                Mode::Off => {
                    self.robot.release();
                    self.shared.indicator.set(POWER_LED, LedMode::Blink);
                    self.shared.indicator.set(ACTIVITY_LED, LedMode::Off);
                    thread::sleep(IDLE_NAP);
                }
                Mode::Stop => {
                    self.robot.energize();
                    self.shared.indicator.set(POWER_LED, LedMode::On);
                    self.shared.indicator.set(ACTIVITY_LED, LedMode::Off);
                    thread::sleep(IDLE_NAP);
                }
                Mode::Demo => {
                    self.robot.energize();
                    self.shared.indicator.set(POWER_LED, LedMode::Off);
                    self.shared.indicator.set(ACTIVITY_LED, LedMode::On);
                    self.run_demo()?;
                    sleep_until(&self.shared, DEMO_PAUSE);
                }
                Mode::Manual => {
                    self.robot.energize();
                    self.shared.indicator.set(POWER_LED, LedMode::Off);
                    self.shared.indicator.set(ACTIVITY_LED, LedMode::On);
                    self.manual_step()?;
                }
                Mode::Calibrate => {
                    self.robot.energize();
                    self.shared.indicator.set(POWER_LED, LedMode::Off);
                    self.shared.indicator.set(ACTIVITY_LED, LedMode::Blink);
                    self.calibrate()?;
                }
            }
        }
        Ok(())
    }

    /// One point-to-point move with the workspace check at the single-move
    /// boundary: a violation aborts just this move, the robot state stays
    /// untouched and the loop goes on.
    fn move_checked(&mut self, pose: &[f64]) -> Result<(), MotionError> {
        match self.robot.mov(pose) {
            Ok(()) => {
                if let Ok(mut display) = self.display.lock() {
                    display.print_pose(self.robot.current_pose());
                }
                Ok(())
            }
            Err(MotionError::WorkspaceViolation) => {
                debug!("cannot move to pose {:?}", pose);
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    /// Streams one randomly chosen demo program, honoring each waypoint's
    /// move kind. A mode change aborts the sequence and returns to the home
    /// pose.
    fn run_demo(&mut self) -> Result<(), MotionError> {
        let Some((name, waypoints)) = self.registry.choose(self.robot.dof()) else {
            return Ok(());
        };
        info!("demo: running '{}'", name);

        for (pose, kind) in waypoints {
            match kind {
                MoveKind::Ptp => self.move_checked(&pose)?,
                MoveKind::Linear => self.robot.mov_lin(&pose, 10.0, 3.0, None)?,
            }

            if self.shared.mode() != Mode::Demo || self.shared.is_stopped() {
                self.shared.indicator.set(ACTIVITY_LED, LedMode::Off);
                let home = self.robot.home_pose().to_vec();
                self.move_checked(&home)?;
                break;
            }
        }
        Ok(())
    }

    /// One manual-drive cycle: latest input becomes a clamped pose delta and
    /// a single point-to-point move. The manual loop evaluates mode changes
    /// itself, so the input task is gated while it runs.
    fn manual_step(&mut self) -> Result<(), MotionError> {
        self.shared.set_ignore_input(true);
        thread::sleep(MANUAL_CYCLE);

        let snapshot = self.shared.latest_input();
        let target = input::movement_from(&snapshot, self.robot.current_pose(), &self.bounds);

        if let Some(candidate) = input::mode_from_snapshot(&snapshot) {
            if apply_candidate(&self.shared, &self.display, candidate) {
                self.shared.set_ignore_input(false);
                self.shared.indicator.set(ACTIVITY_LED, LedMode::Off);
            }
        }

        self.move_checked(&target)
    }

    /// Full calibration: sensor homing, reference pose, raise to a safe
    /// height, then force Stop. Input evaluation is suppressed throughout.
    fn calibrate(&mut self) -> Result<(), MotionError> {
        self.shared.set_ignore_input(true);
        thread::sleep(CALIBRATE_SETTLE);

        let (synchronizer, driver) = self.robot.stepper_access();
        self.homing.calibrate(synchronizer, driver, self.sensors.as_mut())?;
        thread::sleep(CALIBRATE_SETTLE);

        self.robot.home("90")?;

        info!("switching to stop");
        if let Ok(mut display) = self.display.lock() {
            display.print_status("Status: stop");
        }
        self.shared.set_mode(Mode::Stop);

        // Move a bit upwards off the freshly homed pose
        let mut raised = self.robot.home_pose().to_vec();
        raised[2] *= 0.8;
        self.move_checked(&raised)?;

        self.shared.set_ignore_input(false);
        Ok(())
    }
}

fn spawn_input_task(
    shared: Arc<SharedState>,
    display: Arc<Mutex<Box<dyn StatusDisplay>>>,
    source: Arc<Mutex<Box<dyn InputSource>>>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !shared.is_stopped() {
            // Poll even while gated so the stored snapshot stays fresh for
            // the manual loop; only the mode evaluation is suppressed.
            let snapshot = source
                .lock()
                .ok()
                .and_then(|mut source| source.poll());
            if let Some(snapshot) = snapshot {
                shared.store_input(snapshot.clone());
                if !shared.ignores_input() {
                    if let Some(candidate) = input::mode_from_snapshot(&snapshot) {
                        apply_candidate(&shared, &display, candidate);
                    }
                }
            }
            sleep_until(&shared, INPUT_POLL);
        }
    })
}

fn spawn_connectivity_task(
    shared: Arc<SharedState>,
    display: Arc<Mutex<Box<dyn StatusDisplay>>>,
    source: Arc<Mutex<Box<dyn InputSource>>>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut already_connected = false;
        while !shared.is_stopped() {
            if let Ok(mut source) = source.lock() {
                if !source.still_connected() {
                    already_connected = false;
                    info!("input device not connected, retrying");
                    if let Ok(mut display) = display.lock() {
                        display.print_connected(false);
                    }
                } else if already_connected {
                    debug!("input device still connected");
                } else {
                    // Gate mode evaluation while the device reinitializes
                    shared.set_ignore_input(true);
                    already_connected = source.reinit();
                    shared.set_ignore_input(false);
                    if already_connected {
                        info!("input device connected");
                        if let Ok(mut display) = display.lock() {
                            display.print_connected(true);
                        }
                    }
                }
            }
            sleep_until(&shared, CONNECTIVITY_POLL);
        }
    })
}
