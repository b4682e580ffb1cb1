//! Closed-loop thrust-vector-control attitude simulation.
//!
//! A windowed PID drives a TVC mount whose accepted commands are kept as a
//! time-stamped history; the vehicle body integrates that history to recover
//! its attitude.

pub mod dynamics;
pub mod error;
mod gnc_mod;
pub mod sim;
pub mod vehicle;

// The gnc module: expose gnc_mod as `gnc` publicly
pub mod gnc {
    pub use crate::gnc_mod::*;
}

pub use error::{TvcError, TvcResult};
