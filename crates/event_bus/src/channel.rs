//! EventChannel - one category, at most one subscriber

use std::sync::Arc;

use contracts::{CategorizedEvent, EventCategory};
use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, trace, warn};

use crate::metrics::SinkMetrics;
use crate::sink::EventSink;

struct Subscription<E> {
    sink: Arc<dyn EventSink<E>>,
    metrics: Arc<SinkMetrics>,
}

impl<E> Clone for Subscription<E> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

struct Slot<E> {
    current: Option<Subscription<E>>,
    /// Deliveries handed to a sink and not yet returned
    in_flight: usize,
    /// Closed while a delivery was in flight; signalled once it returns
    deferred_ends: Vec<Subscription<E>>,
}

/// Single-subscriber slot for one event category
///
/// Sinks run outside the slot lock, so a subscriber may call back into the
/// bus from `send`. Publishers serialize on a separate delivery lock, which
/// keeps delivery order equal to publish order within the category.
pub struct EventChannel<E> {
    category: EventCategory,
    slot: Mutex<Slot<E>>,
    delivery: ReentrantMutex<()>,
}

impl<E: CategorizedEvent> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CategorizedEvent> EventChannel<E> {
    pub fn new() -> Self {
        Self {
            category: E::CATEGORY,
            slot: Mutex::new(Slot {
                current: None,
                in_flight: 0,
                deferred_ends: Vec::new(),
            }),
            delivery: ReentrantMutex::new(()),
        }
    }

    pub fn category(&self) -> EventCategory {
        self.category
    }

    /// Replace the current subscriber
    ///
    /// The previous subscriber, if any, is dropped without an end-of-stream
    /// signal. Returns the metrics of the new subscription.
    pub fn subscribe(&self, sink: Arc<dyn EventSink<E>>) -> Arc<SinkMetrics> {
        let metrics = Arc::new(SinkMetrics::new());
        let name = sink.name().to_string();
        let previous = self.slot.lock().current.replace(Subscription {
            sink,
            metrics: Arc::clone(&metrics),
        });

        match previous {
            Some(old) => debug!(
                category = %self.category,
                sink = %name,
                replaced = %old.sink.name(),
                "Subscriber replaced"
            ),
            None => debug!(category = %self.category, sink = %name, "Subscriber attached"),
        }
        metrics
    }

    /// Clear the subscriber. Returns whether one was present.
    pub fn unsubscribe(&self) -> bool {
        let previous = self.slot.lock().current.take();
        if let Some(old) = &previous {
            debug!(category = %self.category, sink = %old.sink.name(), "Subscriber detached");
        }
        previous.is_some()
    }

    pub fn has_subscriber(&self) -> bool {
        self.slot.lock().current.is_some()
    }

    pub fn subscriber_name(&self) -> Option<String> {
        self.slot
            .lock()
            .current
            .as_ref()
            .map(|s| s.sink.name().to_string())
    }

    /// Metrics of the current subscription
    pub fn metrics(&self) -> Option<Arc<SinkMetrics>> {
        self.slot
            .lock()
            .current
            .as_ref()
            .map(|s| Arc::clone(&s.metrics))
    }

    /// Deliver to the current subscriber, or drop when there is none
    pub fn publish(&self, event: E) -> bool {
        self.publish_if(|| true, event)
    }

    /// Deliver only if `accept` holds once the slot lock is taken
    pub(crate) fn publish_if(&self, accept: impl FnOnce() -> bool, event: E) -> bool {
        let _delivery = self.delivery.lock();

        let subscription = {
            let mut slot = self.slot.lock();
            if !accept() {
                drop(slot);
                record_drop(self.category, "stale_generation");
                trace!(category = %self.category, "Event from stale session dropped");
                return false;
            }
            let Some(current) = slot.current.clone() else {
                drop(slot);
                record_drop(self.category, "no_subscriber");
                return false;
            };
            slot.in_flight += 1;
            current
        };

        let delivered = self.deliver(&subscription, event);

        let ended = {
            let mut slot = self.slot.lock();
            slot.in_flight -= 1;
            if slot.in_flight == 0 {
                std::mem::take(&mut slot.deferred_ends)
            } else {
                Vec::new()
            }
        };
        for subscription in &ended {
            self.signal_end(subscription);
        }
        delivered
    }

    fn deliver(&self, subscription: &Subscription<E>, event: E) -> bool {
        match subscription.sink.send(event) {
            Ok(()) => {
                subscription.metrics.inc_delivered_count();
                metrics::counter!(
                    "gaze_bridge_events_published_total",
                    "category" => self.category.as_str()
                )
                .increment(1);
                true
            }
            Err(e) => {
                subscription.metrics.inc_dropped_count();
                record_drop(self.category, e.reason());
                warn!(
                    category = %self.category,
                    sink = %subscription.sink.name(),
                    error = %e,
                    "Event dropped"
                );
                false
            }
        }
    }

    /// Clear the subscriber and signal end-of-stream to it
    ///
    /// With a delivery in flight the signal is left to the delivering thread
    /// and follows the event being handed over. Returns whether a subscriber
    /// was signalled.
    pub fn close(&self) -> bool {
        let mut slot = self.slot.lock();
        let Some(subscription) = slot.current.take() else {
            return false;
        };
        if slot.in_flight > 0 {
            debug!(
                category = %self.category,
                sink = %subscription.sink.name(),
                "End of stream deferred behind in-flight delivery"
            );
            slot.deferred_ends.push(subscription);
            return true;
        }
        drop(slot);

        self.signal_end(&subscription);
        true
    }

    fn signal_end(&self, subscription: &Subscription<E>) {
        subscription.sink.end_of_stream();
        debug!(
            category = %self.category,
            sink = %subscription.sink.name(),
            delivered = subscription.metrics.delivered_count(),
            dropped = subscription.metrics.dropped_count(),
            "End of stream signalled"
        );
    }
}

fn record_drop(category: EventCategory, reason: &'static str) {
    metrics::counter!(
        "gaze_bridge_events_dropped_total",
        "category" => category.as_str(),
        "reason" => reason
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::CallbackSink;
    use contracts::StatusEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_sink(name: &str, count: &Arc<AtomicUsize>) -> Arc<CallbackSink<StatusEvent>> {
        let count = Arc::clone(count);
        Arc::new(CallbackSink::new(name, move |_event: StatusEvent| {
            count.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[test]
    fn test_publish_without_subscriber_drops() {
        let channel = EventChannel::<StatusEvent>::new();
        assert!(!channel.publish(StatusEvent::Start));
    }

    #[test]
    fn test_unsubscribe_then_publish_delivers_nothing() {
        let channel = EventChannel::<StatusEvent>::new();
        let count = Arc::new(AtomicUsize::new(0));

        channel.subscribe(counting_sink("a", &count));
        assert!(channel.unsubscribe());
        assert!(!channel.unsubscribe());

        assert!(!channel.publish(StatusEvent::Start));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_replacing_subscriber_routes_to_new_one() {
        let channel = EventChannel::<StatusEvent>::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        channel.subscribe(counting_sink("first", &first));
        channel.publish(StatusEvent::Start);
        let metrics = channel.subscribe(counting_sink("second", &second));
        channel.publish(StatusEvent::Start);
        channel.publish(StatusEvent::Start);

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
        assert_eq!(metrics.delivered_count(), 2);
        assert_eq!(channel.subscriber_name().as_deref(), Some("second"));
    }

    #[test]
    fn test_close_signals_once_and_clears() {
        let channel = EventChannel::<StatusEvent>::new();
        let ends = Arc::new(AtomicUsize::new(0));
        let ends_in_sink = Arc::clone(&ends);
        let sink = CallbackSink::new("closing", |_event: StatusEvent| {}).on_end(move || {
            ends_in_sink.fetch_add(1, Ordering::SeqCst);
        });
        channel.subscribe(Arc::new(sink));

        assert!(channel.close());
        assert!(!channel.close());
        assert!(!channel.has_subscriber());
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rejected_event_is_not_delivered() {
        let channel = EventChannel::<StatusEvent>::new();
        let count = Arc::new(AtomicUsize::new(0));
        channel.subscribe(counting_sink("a", &count));

        assert!(!channel.publish_if(|| false, StatusEvent::Start));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscriber_may_unsubscribe_from_its_own_callback() {
        let channel = Arc::new(EventChannel::<StatusEvent>::new());
        let count = Arc::new(AtomicUsize::new(0));
        {
            let channel_in_sink = Arc::clone(&channel);
            let count = Arc::clone(&count);
            channel.subscribe(Arc::new(CallbackSink::new("self-detaching", move |_: StatusEvent| {
                count.fetch_add(1, Ordering::SeqCst);
                channel_in_sink.unsubscribe();
            })));
        }

        let producer = {
            let channel = Arc::clone(&channel);
            std::thread::spawn(move || channel.publish(StatusEvent::Start))
        };
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(producer.join());
        });
        let delivered = rx
            .recv_timeout(std::time::Duration::from_secs(2))
            .expect("producer blocked inside publish")
            .unwrap();

        assert!(delivered);
        assert!(!channel.has_subscriber());
        assert!(!channel.publish(StatusEvent::Start));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_from_callback_ends_after_the_delivered_event() {
        let channel = Arc::new(EventChannel::<StatusEvent>::new());
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        {
            let channel_in_sink = Arc::clone(&channel);
            let events = Arc::clone(&log);
            let ends = Arc::clone(&log);
            let sink = CallbackSink::new("closing", move |_: StatusEvent| {
                events.lock().push("event");
                // The end signal waits for this delivery to return
                assert!(channel_in_sink.close());
                events.lock().push("closed");
            })
            .on_end(move || ends.lock().push("end"));
            channel.subscribe(Arc::new(sink));
        }

        assert!(channel.publish(StatusEvent::Start));
        assert!(!channel.publish(StatusEvent::Start));
        assert_eq!(*log.lock(), vec!["event", "closed", "end"]);
    }

    #[test]
    fn test_publish_from_callback_is_delivered_in_order() {
        let channel = Arc::new(EventChannel::<StatusEvent>::new());
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        {
            let channel_in_sink = Arc::clone(&channel);
            let seen = Arc::clone(&seen);
            channel.subscribe(Arc::new(CallbackSink::new("echo", move |event: StatusEvent| {
                let first = seen.lock().is_empty();
                seen.lock().push(event);
                if first {
                    channel_in_sink.publish(StatusEvent::Stop {
                        failed_reason: "ERROR_NONE".into(),
                    });
                }
            })));
        }

        assert!(channel.publish(StatusEvent::Start));
        assert_eq!(seen.lock().len(), 2);
        assert_eq!(seen.lock()[0], StatusEvent::Start);
    }
}
