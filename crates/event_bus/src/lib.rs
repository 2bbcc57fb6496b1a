//! # Event Bus
//!
//! Per-category single-subscriber broadcast.
//!
//! Responsibilities:
//! - Hold at most one subscriber per category (tracking / status / calibration)
//! - Hand events to the subscriber without blocking the producer thread
//! - Drop events from sessions that are no longer live
//! - Signal end-of-stream to every subscriber on session release

pub mod bus;
pub mod channel;
pub mod error;
pub mod metrics;
pub mod sink;
pub mod sinks;

pub use bus::{BusEvent, EventBus};
pub use channel::EventChannel;
pub use contracts::{CalibrationEvent, EventCategory, StatusEvent, TrackingEvent};
pub use error::EventBusError;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sink::EventSink;
pub use sinks::{CallbackSink, ChannelSink, EventStream, LogSink};
