pub mod clock;
pub mod config;
pub mod integrator;
pub mod runner;

pub use clock::{ManualClock, TimeClock, TimeSource};
pub use config::{ErrorSign, LoopConfig};
pub use integrator::verlet_step;
pub use runner::{ControlLoop, LoopHandle, LoopSample};
