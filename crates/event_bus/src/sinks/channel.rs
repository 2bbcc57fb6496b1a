//! ChannelSink - bounded queue between the producer thread and a consumer

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};

use crate::error::EventBusError;
use crate::sink::EventSink;

/// Sink that forwards events into a bounded tokio channel
///
/// `end_of_stream` drops the sender, so the paired `EventStream` yields
/// `None` once the queued events are drained.
pub struct ChannelSink<E> {
    name: String,
    tx: Mutex<Option<mpsc::Sender<E>>>,
}

impl<E: Send> ChannelSink<E> {
    /// Create a sink and its receiving stream
    pub fn new(name: impl Into<String>, capacity: usize) -> (Self, EventStream<E>) {
        let name = name.into();
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let sink = Self {
            name: name.clone(),
            tx: Mutex::new(Some(tx)),
        };
        (sink, EventStream { name, rx })
    }
}

impl<E: Send> EventSink<E> for ChannelSink<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, event: E) -> Result<(), EventBusError> {
        let guard = self.tx.lock();
        let Some(tx) = guard.as_ref() else {
            return Err(EventBusError::closed(&self.name));
        };
        match tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(EventBusError::queue_full(&self.name)),
            Err(TrySendError::Closed(_)) => Err(EventBusError::closed(&self.name)),
        }
    }

    fn end_of_stream(&self) {
        self.tx.lock().take();
    }
}

/// Receiving end of a `ChannelSink`
pub struct EventStream<E> {
    name: String,
    rx: mpsc::Receiver<E>,
}

impl<E> EventStream<E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next event, or `None` after end-of-stream
    pub async fn recv(&mut self) -> Option<E> {
        self.rx.recv().await
    }

    /// Blocking variant for non-async consumers
    pub fn blocking_recv(&mut self) -> Option<E> {
        self.rx.blocking_recv()
    }

    pub fn try_recv(&mut self) -> Result<E, TryRecvError> {
        self.rx.try_recv()
    }

    /// Take everything currently queued
    pub fn drain(&mut self) -> Vec<E> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Whether the sender side is gone
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
