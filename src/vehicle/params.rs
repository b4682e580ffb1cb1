use crate::error::{ensure_finite, TvcError, TvcResult};

// ---------------------------------------------------------------------------
// Vehicle definition (rigid rod pivoting about its center)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleParams {
    pub name: String,
    pub height: f64,        // m
    pub mass: f64,          // kg
    pub thrust: f64,        // N, constant
    pub initial_angle: f64, // deg
    pub initial_rate: f64,  // deg/s
}

impl VehicleParams {
    /// Moment of inertia of a uniform rod about its center: m*h^2/12.
    pub fn moment_of_inertia(&self) -> f64 {
        self.mass * self.height.powi(2) / 12.0
    }

    /// Reject parameters that would produce non-finite dynamics.
    pub fn validate(&self) -> TvcResult<()> {
        let mass = ensure_finite(self.mass, "vehicle mass")?;
        let height = ensure_finite(self.height, "vehicle height")?;
        ensure_finite(self.thrust, "vehicle thrust")?;
        ensure_finite(self.initial_angle, "vehicle initial angle")?;
        ensure_finite(self.initial_rate, "vehicle initial rate")?;
        if mass <= 0.0 {
            return Err(TvcError::InvalidArg { what: "vehicle mass must be positive" });
        }
        if height <= 0.0 {
            return Err(TvcError::InvalidArg { what: "vehicle height must be positive" });
        }
        ensure_finite(self.moment_of_inertia(), "moment of inertia")?;
        Ok(())
    }
}

impl Default for VehicleParams {
    fn default() -> Self {
        VehicleBuilder::new("Vehicle").build()
    }
}

// ---------------------------------------------------------------------------
// Vehicle builder
// ---------------------------------------------------------------------------

pub struct VehicleBuilder {
    name: String,
    height: f64,
    mass: f64,
    thrust: f64,
    initial_angle: f64,
    initial_rate: f64,
}

impl VehicleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            height: 1.0,
            mass: 0.5,
            thrust: 7.0,
            initial_angle: 0.0,
            initial_rate: 0.0,
        }
    }

    pub fn height(mut self, v: f64) -> Self { self.height = v; self }
    pub fn mass(mut self, v: f64) -> Self { self.mass = v; self }
    pub fn thrust(mut self, v: f64) -> Self { self.thrust = v; self }
    pub fn initial_angle(mut self, v: f64) -> Self { self.initial_angle = v; self }
    pub fn initial_rate(mut self, v: f64) -> Self { self.initial_rate = v; self }

    pub fn build(self) -> VehicleParams {
        VehicleParams {
            name: self.name,
            height: self.height,
            mass: self.mass,
            thrust: self.thrust,
            initial_angle: self.initial_angle,
            initial_rate: self.initial_rate,
        }
    }
}
