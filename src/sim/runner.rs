use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::dynamics::VehicleBody;
use crate::error::{TvcError, TvcResult};
use crate::gnc::{PidController, TvcMount};
use crate::vehicle::Scenario;
use super::clock::TimeSource;
use super::config::LoopConfig;

// ---------------------------------------------------------------------------
// One control-loop iteration
// ---------------------------------------------------------------------------

/// What one iteration observed and commanded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSample {
    pub time: Duration,
    pub body_angle: f64,  // deg
    pub error: f64,       // deg
    pub command: f64,     // deg, raw PID output before clamping
    pub mount_angle: f64, // deg, after clamping and deadband
    pub recorded: bool,
}

/// Closed attitude loop: body angle -> error -> PID -> mount.
///
/// Owns its PID controller, so the controller's windows are only ever
/// touched from the thread that drives this loop. The mount and body are
/// shared with readers through `Arc`.
pub struct ControlLoop {
    pid: PidController,
    mount: Arc<TvcMount>,
    body: Arc<VehicleBody>,
    clock: Arc<dyn TimeSource>,
    config: LoopConfig,
    iterations: usize,
}

impl ControlLoop {
    pub fn new(
        pid: PidController,
        body: Arc<VehicleBody>,
        clock: Arc<dyn TimeSource>,
        config: LoopConfig,
    ) -> TvcResult<Self> {
        config.validate()?;
        Ok(Self {
            pid,
            mount: body.mount().clone(),
            body,
            clock,
            config,
            iterations: 0,
        })
    }

    /// Wire a complete loop (PID, mount, body) from a scenario.
    pub fn from_scenario(scenario: &Scenario, clock: Arc<dyn TimeSource>) -> TvcResult<Self> {
        let pid = PidController::new(&scenario.pid)?;
        let mount = Arc::new(TvcMount::new(clock.clone(), scenario.mount.clone())?);
        let body = Arc::new(VehicleBody::new(mount, scenario.vehicle.clone())?);
        info!(
            scenario = %scenario.name,
            kp = scenario.pid.kp,
            ki = scenario.pid.ki,
            kd = scenario.pid.kd,
            setpoint = scenario.control.setpoint,
            "control loop wired"
        );
        Self::new(pid, body, clock, scenario.control.clone())
    }

    pub fn mount(&self) -> Arc<TvcMount> {
        self.mount.clone()
    }

    pub fn body(&self) -> Arc<VehicleBody> {
        self.body.clone()
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Run a single iteration without sleeping.
    pub fn step(&mut self) -> TvcResult<LoopSample> {
        let now = self.clock.time();
        let body_angle = self.body.angle();
        let error = self.config.error_sign.error(self.config.setpoint, body_angle);
        let command = self.pid.update(error, now);
        let recorded = self.mount.set_angle(command)?;
        let mount_angle = self.mount.angle();
        self.iterations += 1;

        debug!(
            t = now.as_secs_f64(),
            body_angle, error, command, mount_angle, recorded, "loop step"
        );
        Ok(LoopSample { time: now, body_angle, error, command, mount_angle, recorded })
    }

    /// Iterate at the configured period until `stop` is set.
    ///
    /// The flag is checked once per iteration. Returns the number of
    /// iterations run.
    pub fn run(&mut self, stop: &AtomicBool) -> TvcResult<usize> {
        info!(period_ms = self.config.period.as_millis() as u64, "control loop started");
        let start_count = self.iterations;

        while !stop.load(Ordering::Relaxed) {
            let started = Instant::now();
            self.step()?;
            let spent = started.elapsed();
            match self.config.period.checked_sub(spent) {
                Some(rest) => thread::sleep(rest),
                None => warn!(spent_ms = spent.as_secs_f64() * 1e3, "control loop overran its period"),
            }
        }

        let ran = self.iterations - start_count;
        info!(iterations = ran, "control loop stopped");
        Ok(ran)
    }

    /// Move the loop onto its own thread.
    pub fn spawn(mut self) -> LoopHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = thread::spawn(move || self.run(&flag));
        LoopHandle { stop, handle }
    }
}

impl std::fmt::Debug for ControlLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("pid", &self.pid)
            .field("config", &self.config)
            .field("iterations", &self.iterations)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Threaded loop handle
// ---------------------------------------------------------------------------

/// Handle to a control loop running on its own thread.
pub struct LoopHandle {
    stop: Arc<AtomicBool>,
    handle: thread::JoinHandle<TvcResult<usize>>,
}

impl LoopHandle {
    /// Ask the loop to stop after its current iteration.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the loop and wait for it, returning the iteration count.
    pub fn stop(self) -> TvcResult<usize> {
        self.request_stop();
        self.handle.join().map_err(|_| TvcError::LoopPanicked)?
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::ManualClock;
    use crate::sim::config::ErrorSign;
    use crate::vehicle::presets;

    fn manual_loop(scenario: &Scenario) -> (Arc<ManualClock>, ControlLoop) {
        let clock = Arc::new(ManualClock::new());
        let control = ControlLoop::from_scenario(scenario, clock.clone()).unwrap();
        (clock, control)
    }

    #[test]
    fn first_step_uses_initial_angle() {
        let (_, mut control) = manual_loop(&presets::console());
        let sample = control.step().unwrap();
        assert_eq!(sample.time, Duration::ZERO);
        assert_eq!(sample.body_angle, 40.0);
        assert_eq!(sample.error, -40.0);
        // kp = -1, I and D cold-start: command = 40, clamped to 35
        assert_eq!(sample.command, 40.0);
        assert_eq!(sample.mount_angle, 35.0);
        assert!(sample.recorded);
        assert_eq!(control.iterations(), 1);
    }

    #[test]
    fn error_sign_flips_the_command() {
        let mut scenario = presets::console();
        scenario.pid.kp = 1.0;
        scenario.control.error_sign = ErrorSign::MeasuredMinusSetpoint;
        let (_, mut control) = manual_loop(&scenario);
        let sample = control.step().unwrap();
        assert_eq!(sample.error, 40.0);
        assert_eq!(sample.mount_angle, 35.0);
    }

    #[test]
    fn mount_never_exceeds_limit() {
        let (clock, mut control) = manual_loop(&presets::console());
        for _ in 0..300 {
            let sample = control.step().unwrap();
            assert!(sample.mount_angle.abs() <= 35.0);
            clock.advance(control.config().period);
        }
        for entry in control.mount().history() {
            assert!(entry.angle.abs() <= 35.0);
        }
    }

    #[test]
    fn spawned_loop_stops_cooperatively() {
        let clock = Arc::new(crate::sim::clock::TimeClock::new());
        let mut scenario = presets::console();
        scenario.control.period = Duration::from_millis(5);
        let control = ControlLoop::from_scenario(&scenario, clock.clone()).unwrap();
        let mount = control.mount();
        clock.start().unwrap();

        let handle = control.spawn();
        thread::sleep(Duration::from_millis(40));
        let ran = handle.stop().unwrap();
        assert!(ran > 0);
        assert!(mount.len() >= 1);
        assert!(mount.angle().abs() <= 35.0);
    }

    #[test]
    fn invalid_period_rejected() {
        let mut scenario = presets::console();
        scenario.control.period = Duration::ZERO;
        let clock = Arc::new(ManualClock::new());
        assert!(ControlLoop::from_scenario(&scenario, clock).is_err());
    }
}
