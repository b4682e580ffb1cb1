use crate::error::TvcResult;
use crate::gnc::{MountConfig, PidConfig};
use crate::sim::LoopConfig;
use super::params::VehicleParams;

// ---------------------------------------------------------------------------
// Scenario: everything needed to wire one closed loop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub pid: PidConfig,
    pub mount: MountConfig,
    pub vehicle: VehicleParams,
    pub control: LoopConfig,
}

impl Scenario {
    /// Check the parts that can be checked without building the loop.
    pub fn validate(&self) -> TvcResult<()> {
        self.vehicle.validate()?;
        self.control.validate()
    }
}

impl Default for Scenario {
    fn default() -> Self {
        presets::console()
    }
}

// ---------------------------------------------------------------------------
// Preset scenarios
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;
    use crate::sim::ErrorSign;
    use crate::vehicle::VehicleBuilder;

    /// Recover from a 40 deg, 40 deg/s disturbance back to vertical with PD
    /// action. Negative gains against a `setpoint - measured` error.
    pub fn console() -> Scenario {
        Scenario {
            name: "Console".into(),
            pid: PidConfig {
                kp: -1.0,
                ki: 0.0,
                kd: -0.8,
                integral_window: 5,
                derivative_window: 5,
            },
            mount: MountConfig::default(),
            vehicle: VehicleBuilder::new("Rod-1")
                .height(1.0)
                .mass(0.5)
                .thrust(7.0)
                .initial_angle(40.0)
                .initial_rate(40.0)
                .build(),
            control: LoopConfig {
                setpoint: 0.0,
                error_sign: ErrorSign::SetpointMinusMeasured,
                ..LoopConfig::default()
            },
        }
    }

    /// Hold -20 deg after a 40 deg, 70 deg/s disturbance with a small
    /// integral term. Positive gains against a `measured - setpoint` error.
    pub fn visualization() -> Scenario {
        Scenario {
            name: "Visualization".into(),
            pid: PidConfig {
                kp: 1.0,
                ki: 0.01,
                kd: 0.8,
                integral_window: 5,
                derivative_window: 5,
            },
            mount: MountConfig::default(),
            vehicle: VehicleBuilder::new("Rod-1")
                .height(1.0)
                .mass(0.5)
                .thrust(7.0)
                .initial_angle(40.0)
                .initial_rate(70.0)
                .build(),
            control: LoopConfig {
                setpoint: -20.0,
                error_sign: ErrorSign::MeasuredMinusSetpoint,
                ..LoopConfig::default()
            },
        }
    }
}
