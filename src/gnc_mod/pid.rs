use std::time::Duration;

use crate::error::TvcResult;
use super::gain::{AggregateGain, DerivativeGain, Gain, IntegralGain, ProportionalGain};

// ---------------------------------------------------------------------------
// PID configuration
// ---------------------------------------------------------------------------

/// Coefficients and estimator windows for one PID controller.
///
/// Gains are signed; the sign convention of the loop is chosen here together
/// with [`crate::sim::ErrorSign`].
#[derive(Debug, Clone, PartialEq)]
pub struct PidConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub integral_window: usize,
    pub derivative_window: usize,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: -1.0,
            ki: 0.0,
            kd: -0.8,
            integral_window: 5,
            derivative_window: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// PID controller (parallel form over windowed gains)
// ---------------------------------------------------------------------------

/// Parallel-form PID built from one fresh P, I and D term.
///
/// Each controller owns its windows, so it must be driven by a single loop.
/// `update` takes `&mut self`, which keeps it that way.
pub struct PidController {
    terms: AggregateGain,
}

impl PidController {
    /// Build a controller with freshly constructed terms from `config`.
    pub fn new(config: &PidConfig) -> TvcResult<Self> {
        Self::from_factories(
            || ProportionalGain::new(config.kp),
            || IntegralGain::new(config.ki, config.integral_window),
            || DerivativeGain::new(config.kd, config.derivative_window),
        )
    }

    /// Build a controller from three zero-argument term constructors.
    ///
    /// Each factory is invoked exactly once.
    pub fn from_factories<P, I, D, GP, GI, GD>(p: P, i: I, d: D) -> TvcResult<Self>
    where
        P: FnOnce() -> TvcResult<GP>,
        I: FnOnce() -> TvcResult<GI>,
        D: FnOnce() -> TvcResult<GD>,
        GP: Gain + 'static,
        GI: Gain + 'static,
        GD: Gain + 'static,
    {
        let terms: Vec<Box<dyn Gain>> = vec![Box::new(p()?), Box::new(i()?), Box::new(d()?)];
        Ok(Self {
            terms: AggregateGain::new(terms),
        })
    }

    /// Feed one error sample observed at `now`, returning the command.
    pub fn update(&mut self, error: f64, now: Duration) -> f64 {
        self.terms.update(error, now)
    }

    pub fn reset(&mut self) {
        self.terms.reset();
    }
}

impl Gain for PidController {
    fn update(&mut self, input: f64, now: Duration) -> f64 {
        PidController::update(self, input, now)
    }

    fn reset(&mut self) {
        PidController::reset(self);
    }

    fn name(&self) -> &str {
        "PID"
    }
}

impl std::fmt::Debug for PidController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PidController")
            .field("terms", &self.terms.names())
            .finish()
    }
}
