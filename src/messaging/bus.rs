use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
/// Event bus for pub/sub messaging
///
/// Broadcasts detector events to every subscriber and doubles as the
/// detector's `ComponentPort`.
use std::sync::Arc;
use std::time::Instant;

use super::commands::{CommandId, CommandResponse};
use super::events::{Event, Telemetry};
use super::port::ComponentPort;

const LOG_TARGET_EVENTS: &str = "object_detector::events";

/// Subscriber ID for tracking subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

/// Event subscriber
struct Subscriber {
    id: SubscriberId,
    sender: Sender<Event>,
}

/// Event bus for broadcasting events to subscribers
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    next_id: Arc<RwLock<usize>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(RwLock::new(0)),
        }
    }

    /// Subscribe to events, returns a receiver and subscription ID
    pub fn subscribe(&self) -> (Receiver<Event>, SubscriberId) {
        let (tx, rx) = unbounded();

        let mut next_id = self.next_id.write();
        let id = SubscriberId(*next_id);
        *next_id += 1;
        drop(next_id);

        self.subscribers.write().push(Subscriber { id, sender: tx });

        (rx, id)
    }

    /// Unsubscribe from events
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: Event) {
        let subscribers = self.subscribers.read();

        for subscriber in subscribers.iter() {
            // Closed subscriber channels are fine
            let _ = subscriber.sender.try_send(event.clone());
        }
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl ComponentPort for EventBus {
    fn log_object_detected(&self, message: &str) {
        tracing::info!(target: LOG_TARGET_EVENTS, "ObjectDetected: {}", message);
        self.publish(Event::ObjectDetected {
            message: message.to_string(),
            timestamp: Instant::now(),
        });
    }

    fn command_response(&self, id: CommandId, response: CommandResponse) {
        tracing::debug!(
            target: LOG_TARGET_EVENTS,
            opcode = id.opcode,
            seq = id.seq,
            "Command response: {:?}",
            response
        );
        self.publish(Event::CommandCompleted { id, response });
    }

    fn telemetry(&self, tlm: Telemetry) {
        tracing::trace!(
            target: LOG_TARGET_EVENTS,
            detection_count = tlm.detection_count,
            listener_running = tlm.listener_running,
            "Telemetry"
        );
        self.publish(Event::Telemetry(tlm));
    }
}
