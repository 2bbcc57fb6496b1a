//! EventBus - the three event channels plus the live-session gate

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use contracts::{
    CalibrationEvent, CategorizedEvent, EventBusConfig, EventCategory, Generation, StatusEvent,
    TrackingEvent,
};
use tracing::{debug, info, instrument};

use crate::channel::EventChannel;
use crate::metrics::SinkMetrics;
use crate::sink::EventSink;
use crate::sinks::{ChannelSink, EventStream};

/// Event types routed by the bus
pub trait BusEvent: CategorizedEvent + Sized {
    fn channel(bus: &EventBus) -> &EventChannel<Self>;
}

impl BusEvent for TrackingEvent {
    fn channel(bus: &EventBus) -> &EventChannel<Self> {
        &bus.tracking
    }
}

impl BusEvent for StatusEvent {
    fn channel(bus: &EventBus) -> &EventChannel<Self> {
        &bus.status
    }
}

impl BusEvent for CalibrationEvent {
    fn channel(bus: &EventBus) -> &EventChannel<Self> {
        &bus.calibration
    }
}

/// Per-category single-subscriber broadcast
///
/// Subscriptions are independent of the session: a client may listen before
/// the tracker exists. Publishing is gated on the live generation, which the
/// session controller sets on activation and `close_all` resets.
pub struct EventBus {
    live: AtomicU64,
    tracking: EventChannel<TrackingEvent>,
    status: EventChannel<StatusEvent>,
    calibration: EventChannel<CalibrationEvent>,
    capacities: EventBusConfig,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(&EventBusConfig::default())
    }
}

impl EventBus {
    pub fn new(config: &EventBusConfig) -> Self {
        Self {
            live: AtomicU64::new(Generation::NONE.get()),
            tracking: EventChannel::new(),
            status: EventChannel::new(),
            calibration: EventChannel::new(),
            capacities: config.clone(),
        }
    }

    pub fn tracking(&self) -> &EventChannel<TrackingEvent> {
        &self.tracking
    }

    pub fn status(&self) -> &EventChannel<StatusEvent> {
        &self.status
    }

    pub fn calibration(&self) -> &EventChannel<CalibrationEvent> {
        &self.calibration
    }

    /// Queue size used by `listen` for a category
    pub fn queue_capacity(&self, category: EventCategory) -> usize {
        match category {
            EventCategory::Tracking => self.capacities.tracking_queue_capacity,
            EventCategory::Status => self.capacities.status_queue_capacity,
            EventCategory::Calibration => self.capacities.calibration_queue_capacity,
        }
    }

    /// Replace the subscriber of `E`'s category
    pub fn subscribe<E: BusEvent>(&self, sink: Arc<dyn EventSink<E>>) -> Arc<SinkMetrics> {
        E::channel(self).subscribe(sink)
    }

    /// Subscribe a bounded queue and return its receiving end
    pub fn listen<E: BusEvent>(&self, name: impl Into<String>) -> EventStream<E> {
        let (sink, stream) = ChannelSink::new(name, self.queue_capacity(E::CATEGORY));
        self.subscribe::<E>(Arc::new(sink));
        stream
    }

    /// Clear the subscriber of a category. Idempotent.
    pub fn unsubscribe(&self, category: EventCategory) -> bool {
        match category {
            EventCategory::Tracking => self.tracking.unsubscribe(),
            EventCategory::Status => self.status.unsubscribe(),
            EventCategory::Calibration => self.calibration.unsubscribe(),
        }
    }

    pub fn has_subscriber(&self, category: EventCategory) -> bool {
        match category {
            EventCategory::Tracking => self.tracking.has_subscriber(),
            EventCategory::Status => self.status.has_subscriber(),
            EventCategory::Calibration => self.calibration.has_subscriber(),
        }
    }

    /// Deliver an event produced by the session `generation`
    ///
    /// Dropped unless `generation` is the live one. The check happens under
    /// the channel lock, so nothing slips in after `close_all` has begun.
    pub fn publish<E: BusEvent>(&self, generation: Generation, event: E) -> bool {
        E::channel(self).publish_if(|| self.live.load(Ordering::SeqCst) == generation.get(), event)
    }

    /// Accept events from `generation` from now on
    #[instrument(name = "event_bus_activate", skip(self), fields(generation = %generation))]
    pub fn activate(&self, generation: Generation) {
        self.live.store(generation.get(), Ordering::SeqCst);
        debug!("Event bus opened");
    }

    pub fn live_generation(&self) -> Generation {
        Generation::new(self.live.load(Ordering::SeqCst))
    }

    pub fn is_open(&self) -> bool {
        !self.live_generation().is_none()
    }

    /// Sever every channel
    ///
    /// Resets the live generation first, then clears each subscriber and
    /// signals end-of-stream to it. Returns the number of subscribers
    /// signalled.
    #[instrument(name = "event_bus_close_all", skip(self))]
    pub fn close_all(&self) -> usize {
        let previous = self.live.swap(Generation::NONE.get(), Ordering::SeqCst);

        let signalled = [
            self.tracking.close(),
            self.status.close(),
            self.calibration.close(),
        ]
        .into_iter()
        .filter(|closed| *closed)
        .count();

        info!(
            generation = previous,
            subscribers = signalled,
            "Event bus closed"
        );
        signalled
    }
}
