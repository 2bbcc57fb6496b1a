//! Event bus error types

use thiserror::Error;

/// Delivery failures reported by a sink
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventBusError {
    /// Subscriber queue is full; the event was dropped
    #[error("queue full for sink '{sink}', event dropped")]
    QueueFull { sink: String },

    /// Subscriber has gone away or already received end-of-stream
    #[error("sink '{sink}' is closed")]
    Closed { sink: String },
}

impl EventBusError {
    pub fn queue_full(sink: impl Into<String>) -> Self {
        Self::QueueFull { sink: sink.into() }
    }

    pub fn closed(sink: impl Into<String>) -> Self {
        Self::Closed { sink: sink.into() }
    }

    /// Label used on the dropped-events counter
    pub fn reason(&self) -> &'static str {
        match self {
            Self::QueueFull { .. } => "queue_full",
            Self::Closed { .. } => "closed",
        }
    }
}
