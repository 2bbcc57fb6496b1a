//! # Contracts
//!
//! Frozen interface contracts shared by every bridge crate: event records,
//! hardware metric types, SDK traits, configuration and the error taxonomy.
//! Business crates depend on this crate only; reverse dependencies are
//! prohibited.
//!
//! ## Units
//! - Anything crossing the SDK traits is in device pixels
//! - Anything crossing the command surface or an event stream is in logical
//!   units; `DisplayScale` converts between the two

mod calibration;
mod camera;
mod config;
mod error;
mod events;
mod generation;
mod geometry;
mod hardware;
mod options;
mod sdk;

pub use calibration::*;
pub use camera::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use generation::Generation;
pub use geometry::*;
pub use hardware::*;
pub use options::*;
pub use sdk::*;
