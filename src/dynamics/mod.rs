pub mod body;
pub mod state;

pub use body::VehicleBody;
pub use state::AttitudeState;
