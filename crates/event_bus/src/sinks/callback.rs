//! CallbackSink - invokes a closure on the producer thread

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::EventBusError;
use crate::sink::EventSink;

type EventFn<E> = Box<dyn Fn(E) + Send + Sync>;
type EndFn = Box<dyn Fn() + Send + Sync>;

/// Sink backed by closures
///
/// The event closure runs on the producer thread and must return quickly. It
/// may call back into the bus, including unsubscribing itself.
pub struct CallbackSink<E> {
    name: String,
    on_event: EventFn<E>,
    on_end: Option<EndFn>,
    ended: AtomicBool,
}

impl<E> CallbackSink<E> {
    pub fn new(name: impl Into<String>, on_event: impl Fn(E) + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            on_event: Box::new(on_event),
            on_end: None,
            ended: AtomicBool::new(false),
        }
    }

    /// Closure to run on end-of-stream
    pub fn on_end(mut self, on_end: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_end = Some(Box::new(on_end));
        self
    }

    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }
}

impl<E> EventSink<E> for CallbackSink<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, event: E) -> Result<(), EventBusError> {
        if self.is_ended() {
            return Err(EventBusError::closed(&self.name));
        }
        (self.on_event)(event);
        Ok(())
    }

    fn end_of_stream(&self) {
        if self.ended.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(on_end) = &self.on_end {
            on_end();
        }
    }
}
