//! LogSink - logs event summaries via tracing

use std::fmt::Debug;
use std::sync::Arc;

use contracts::{CategorizedEvent, EventCategory};
use tracing::{debug, info};

use crate::error::EventBusError;
use crate::sink::EventSink;

/// Sink that logs every event for debugging
///
/// Optionally forwards each event to an inner sink after logging it, so a
/// consumer stream can be observed without giving up its slot.
pub struct LogSink<E> {
    name: String,
    inner: Option<Arc<dyn EventSink<E>>>,
}

impl<E> LogSink<E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: None,
        }
    }

    /// Forward logged events to `inner`
    pub fn forward_to(mut self, inner: Arc<dyn EventSink<E>>) -> Self {
        self.inner = Some(inner);
        self
    }
}

impl<E: CategorizedEvent + Debug> EventSink<E> for LogSink<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, event: E) -> Result<(), EventBusError> {
        let category = E::CATEGORY;
        match category {
            // Frame-rate stream
            EventCategory::Tracking => debug!(sink = %self.name, event = ?event, "Event received"),
            _ => info!(sink = %self.name, category = %category, event = ?event, "Event received"),
        }
        match &self.inner {
            Some(inner) => inner.send(event),
            None => Ok(()),
        }
    }

    fn end_of_stream(&self) {
        let category = E::CATEGORY;
        info!(sink = %self.name, category = %category, "LogSink stream ended");
        if let Some(inner) = &self.inner {
            inner.end_of_stream();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::ChannelSink;
    use contracts::StatusEvent;

    #[test]
    fn test_log_sink_accepts_events() {
        let sink = LogSink::<StatusEvent>::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
        assert!(sink.send(StatusEvent::Start).is_ok());
    }

    #[test]
    fn test_log_sink_forwards_events_and_end_of_stream() {
        let (inner, mut stream) = ChannelSink::<StatusEvent>::new("inner", 1);
        let sink = LogSink::new("logged").forward_to(Arc::new(inner));

        assert!(sink.send(StatusEvent::Start).is_ok());
        // Inner queue is full
        assert!(sink.send(StatusEvent::Start).is_err());

        sink.end_of_stream();
        assert_eq!(stream.drain(), vec![StatusEvent::Start]);
        assert!(stream.blocking_recv().is_none());
    }
}
