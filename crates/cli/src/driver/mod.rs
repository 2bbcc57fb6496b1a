//! Scripted session against the simulated tracker SDK.

mod runner;
mod stats;

pub use runner::{Driver, DriverConfig};
pub use stats::RunStats;
