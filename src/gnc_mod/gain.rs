use std::time::Duration;

use crate::error::{ensure_finite, TvcError, TvcResult};
use super::window::BoundedQueue;

// ---------------------------------------------------------------------------
// Gain: one term of a control law
// ---------------------------------------------------------------------------

/// Scalar transform with private state, one term of a PID law.
///
/// `now` is the caller's timestamp for this input; only time-aware gains
/// (the derivative estimator) look at it.
pub trait Gain: Send {
    fn update(&mut self, input: f64, now: Duration) -> f64;

    /// Drop any windowed history.
    fn reset(&mut self) {}

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// A value paired with the time it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub time: Duration,
}

// ---------------------------------------------------------------------------
// Proportional
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ProportionalGain {
    pub k: f64,
}

impl ProportionalGain {
    pub fn new(k: f64) -> TvcResult<Self> {
        Ok(Self { k: ensure_finite(k, "proportional gain")? })
    }
}

impl Gain for ProportionalGain {
    fn update(&mut self, input: f64, _now: Duration) -> f64 {
        self.k * input
    }

    fn name(&self) -> &str {
        "P"
    }
}

// ---------------------------------------------------------------------------
// Integral: finite-window Riemann sum
// ---------------------------------------------------------------------------

/// Sums the last `window` inputs. Bounded on purpose so it cannot wind up.
#[derive(Debug, Clone)]
pub struct IntegralGain {
    pub k: f64,
    inputs: BoundedQueue<f64>,
}

impl IntegralGain {
    pub fn new(k: f64, window: usize) -> TvcResult<Self> {
        if window == 0 {
            return Err(TvcError::InvalidArg {
                what: "integral window must be at least 1",
            });
        }
        Ok(Self {
            k: ensure_finite(k, "integral gain")?,
            inputs: BoundedQueue::new(window)?,
        })
    }
}

impl Gain for IntegralGain {
    fn update(&mut self, input: f64, _now: Duration) -> f64 {
        self.inputs.push(input);

        // A single sample is not an integral yet.
        if self.inputs.len() <= 1 {
            return 0.0;
        }
        self.k * self.inputs.iter().sum::<f64>()
    }

    fn reset(&mut self) {
        self.inputs.clear();
    }

    fn name(&self) -> &str {
        "I"
    }
}

// ---------------------------------------------------------------------------
// Derivative: averaged pairwise slope over a sample window
// ---------------------------------------------------------------------------

/// Averages the slopes between consecutive samples over a window of
/// `window` points (the stored `window - 1` plus the incoming one).
///
/// Wider windows smooth noise at the cost of lag.
#[derive(Debug, Clone)]
pub struct DerivativeGain {
    pub k: f64,
    inputs: BoundedQueue<Sample>,
}

impl DerivativeGain {
    pub fn new(k: f64, window: usize) -> TvcResult<Self> {
        if window < 2 {
            return Err(TvcError::InvalidArg {
                what: "derivative window must be at least 2",
            });
        }
        Ok(Self {
            k: ensure_finite(k, "derivative gain")?,
            inputs: BoundedQueue::new(window - 1)?,
        })
    }
}

/// Slope between two samples in units per second. Coincident timestamps
/// contribute a zero slope.
fn slope(a: &Sample, b: &Sample) -> f64 {
    let dt = a.time.as_secs_f64() - b.time.as_secs_f64();
    if dt == 0.0 {
        return 0.0;
    }
    (a.value - b.value) / dt
}

impl Gain for DerivativeGain {
    fn update(&mut self, input: f64, now: Duration) -> f64 {
        let sample = Sample { value: input, time: now };

        if self.inputs.is_empty() {
            self.inputs.push(sample);
            return 0.0;
        }

        let points: Vec<Sample> = self
            .inputs
            .iter()
            .copied()
            .chain(std::iter::once(sample))
            .collect();
        let pairs = points.windows(2);
        let n = pairs.len();
        let mean_slope = pairs.map(|w| slope(&w[0], &w[1])).sum::<f64>() / n as f64;

        self.inputs.push(sample);
        self.k * mean_slope
    }

    fn reset(&mut self) {
        self.inputs.clear();
    }

    fn name(&self) -> &str {
        "D"
    }
}

// ---------------------------------------------------------------------------
// Aggregate: parallel sum of terms
// ---------------------------------------------------------------------------

/// Feeds every term the same input and sums the outputs. Terms never see
/// each other's output.
pub struct AggregateGain {
    gains: Vec<Box<dyn Gain>>,
}

impl AggregateGain {
    pub fn new(gains: Vec<Box<dyn Gain>>) -> Self {
        Self { gains }
    }

    pub fn len(&self) -> usize {
        self.gains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }

    /// Term names in evaluation order.
    pub fn names(&self) -> Vec<&str> {
        self.gains.iter().map(|g| g.name()).collect()
    }
}

impl Gain for AggregateGain {
    fn update(&mut self, input: f64, now: Duration) -> f64 {
        self.gains.iter_mut().map(|g| g.update(input, now)).sum()
    }

    fn reset(&mut self) {
        for g in &mut self.gains {
            g.reset();
        }
    }

    fn name(&self) -> &str {
        "aggregate"
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn proportional_matches_k_times_x(k in -1e3_f64..1e3_f64, x in -1e3_f64..1e3_f64) {
            let mut p = ProportionalGain::new(k).unwrap();
            prop_assert_eq!(p.update(x, Duration::ZERO), k * x);
        }

        #[test]
        fn derivative_of_a_line_is_its_slope(
            m in -50.0_f64..50.0,
            window in 2usize..8,
            steps in 2usize..20,
        ) {
            let mut d = DerivativeGain::new(1.0, window).unwrap();
            let mut out = 0.0;
            for n in 0..steps {
                let t = n as f64 * 0.05;
                out = d.update(m * t, Duration::from_secs_f64(t));
            }
            prop_assert!((out - m).abs() < 1e-6 * (1.0 + m.abs()));
        }
    }
}
