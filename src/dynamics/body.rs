use std::sync::Arc;

use parking_lot::Mutex;

use crate::dynamics::state::AttitudeState;
use crate::error::{TvcError, TvcResult};
use crate::gnc::tvc::{AngleDelta, TvcMount};
use crate::sim::integrator::verlet_step;
use crate::vehicle::VehicleParams;

// ---------------------------------------------------------------------------
// Vehicle body: attitude reconstructed from the mount's command history
// ---------------------------------------------------------------------------

/// Settled prefix of the delta log already folded into `state`.
#[derive(Debug, Clone, Copy)]
struct FoldCursor {
    consumed: usize,
    state: AttitudeState,
}

/// Rigid vehicle whose attitude follows from the TVC command history.
///
/// Each accepted mount command is held for its recorded dwell time; over that
/// interval the deflected thrust produces a constant torque
/// `-thrust * sin(deflection)` about the center of mass.
///
/// The mount log is append-only, so the settled prefix is folded once and
/// cached. Every read folds the new entries plus the dwell at the current
/// command, which gives the same result as [`VehicleBody::replay`].
pub struct VehicleBody {
    mount: Arc<TvcMount>,
    params: VehicleParams,
    moment_of_inertia: f64,
    cursor: Mutex<FoldCursor>,
}

impl VehicleBody {
    pub fn new(mount: Arc<TvcMount>, params: VehicleParams) -> TvcResult<Self> {
        params.validate()?;
        let moment_of_inertia = params.moment_of_inertia();
        if moment_of_inertia <= 0.0 {
            return Err(TvcError::InvalidArg {
                what: "moment of inertia must be positive",
            });
        }
        let initial = AttitudeState::new(params.initial_angle, params.initial_rate);
        Ok(Self {
            mount,
            params,
            moment_of_inertia,
            cursor: Mutex::new(FoldCursor { consumed: 0, state: initial }),
        })
    }

    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    pub fn moment_of_inertia(&self) -> f64 {
        self.moment_of_inertia
    }

    pub fn mount(&self) -> &Arc<TvcMount> {
        &self.mount
    }

    /// Angular acceleration (deg/s^2) while the mount holds `deflection` deg.
    pub fn angular_acceleration(&self, deflection: f64) -> f64 {
        -(self.params.thrust * deflection.to_radians().sin()) / self.moment_of_inertia
    }

    fn advance(&self, state: &AttitudeState, delta: &AngleDelta) -> AttitudeState {
        verlet_step(
            state,
            self.angular_acceleration(delta.angle),
            delta.dt.as_secs_f64(),
        )
    }

    /// Attitude integrated up to the current run time.
    pub fn attitude(&self) -> AttitudeState {
        let mut cursor = self.cursor.lock();
        let tail = self.mount.delta_history_since(cursor.consumed);
        for delta in &tail.settled {
            cursor.state = self.advance(&cursor.state, delta);
        }
        cursor.consumed = tail.total;
        self.advance(&cursor.state, &tail.dwell)
    }

    /// Current body angle (deg).
    pub fn angle(&self) -> f64 {
        self.attitude().angle
    }

    /// Current angular rate (deg/s).
    pub fn angular_rate(&self) -> f64 {
        self.attitude().rate
    }

    /// Fold the entire delta history from the initial conditions, ignoring
    /// the cached prefix.
    pub fn replay(&self) -> AttitudeState {
        let initial = AttitudeState::new(self.params.initial_angle, self.params.initial_rate);
        self.mount
            .delta_history()
            .iter()
            .fold(initial, |state, delta| self.advance(&state, delta))
    }
}

impl std::fmt::Debug for VehicleBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VehicleBody")
            .field("params", &self.params)
            .field("moment_of_inertia", &self.moment_of_inertia)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
