use nalgebra::{Matrix2, Vector2};

use crate::dynamics::state::AttitudeState;

// ---------------------------------------------------------------------------
// Constant-acceleration step (second order in position)
// ---------------------------------------------------------------------------

/// Advance `state` by `dt` seconds under constant angular acceleration `domega`.
///
///   angle' = angle + rate*dt + 0.5*domega*dt^2
///   rate'  = rate + domega*dt
pub fn verlet_step(state: &AttitudeState, domega: f64, dt: f64) -> AttitudeState {
    let transition = Matrix2::new(
        1.0, dt,
        0.0, 1.0,
    );
    let input = Vector2::new(0.5 * dt * dt, dt);
    AttitudeState::from_vector(transition * state.as_vector() + input * domega)
}
