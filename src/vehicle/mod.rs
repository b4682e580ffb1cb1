pub mod params;
pub mod scenario;

pub use params::{VehicleBuilder, VehicleParams};
pub use scenario::{presets, Scenario};
