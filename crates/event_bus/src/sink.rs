//! EventSink trait - subscriber side of an event channel

use crate::error::EventBusError;

/// Receives events for one category
///
/// `send` runs on the hardware producer thread and holds up later events of
/// the same category, so it should return in constant time: hand the event
/// off (for example with a bounded `try_send`) and never wait on the
/// consumer.
pub trait EventSink<E>: Send + Sync {
    /// Sink name, used in logs and metrics
    fn name(&self) -> &str;

    /// Hand one event to the subscriber
    fn send(&self, event: E) -> Result<(), EventBusError>;

    /// No further events will follow
    ///
    /// Called at most once per subscription, when the session is released.
    fn end_of_stream(&self);
}
