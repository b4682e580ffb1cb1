pub mod gain;
pub mod pid;
pub mod tvc;
pub mod window;

pub use gain::{AggregateGain, DerivativeGain, Gain, IntegralGain, ProportionalGain, Sample};
pub use pid::{PidConfig, PidController};
pub use tvc::{AngleDelta, AngleEntry, MountConfig, TvcMount, DEADBAND, MAX_ANGLE};
pub use window::BoundedQueue;
