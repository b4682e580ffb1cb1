use std::time::Duration;

use crate::error::{ensure_finite, TvcError, TvcResult};

// ---------------------------------------------------------------------------
// Control loop configuration
// ---------------------------------------------------------------------------

/// Which way the loop forms its error signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorSign {
    /// `error = setpoint - measured`
    #[default]
    SetpointMinusMeasured,
    /// `error = measured - setpoint`
    MeasuredMinusSetpoint,
}

impl ErrorSign {
    pub fn error(self, setpoint: f64, measured: f64) -> f64 {
        match self {
            ErrorSign::SetpointMinusMeasured => setpoint - measured,
            ErrorSign::MeasuredMinusSetpoint => measured - setpoint,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    pub setpoint: f64, // deg
    pub error_sign: ErrorSign,
    pub period: Duration,
}

impl LoopConfig {
    pub fn validate(&self) -> TvcResult<()> {
        ensure_finite(self.setpoint, "setpoint")?;
        if self.period.is_zero() {
            return Err(TvcError::InvalidArg {
                what: "control loop period must be positive",
            });
        }
        Ok(())
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            setpoint: 0.0,
            error_sign: ErrorSign::default(),
            period: Duration::from_millis(50), // 20 Hz
        }
    }
}
