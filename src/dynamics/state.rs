use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// Planar attitude state: angle and angular rate
// ---------------------------------------------------------------------------

/// Single-axis attitude. Angles in deg, rates in deg/s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AttitudeState {
    pub angle: f64, // deg
    pub rate: f64,  // deg/s
}

impl AttitudeState {
    pub fn new(angle: f64, rate: f64) -> Self {
        Self { angle, rate }
    }

    /// `[angle, rate]` column, the layout used by the step integrator.
    pub fn as_vector(&self) -> Vector2<f64> {
        Vector2::new(self.angle, self.rate)
    }

    pub fn from_vector(v: Vector2<f64>) -> Self {
        Self { angle: v.x, rate: v.y }
    }
}
