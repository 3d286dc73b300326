//! Local event bus.
//!
//! Topic-keyed publish/subscribe used by actions to learn about in-world
//! occurrences (an interaction happened, an item was placed) and to announce
//! new ones (a task UI should appear). The tree engine itself never publishes
//! or subscribes; only actions do.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// One in-world occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEvent {
    pub topic: String,
    pub payload: Value,
}

type Channel = (
    async_broadcast::Sender<BusEvent>,
    async_broadcast::InactiveReceiver<BusEvent>,
);

/// Topic-keyed broadcast bus. Cheap to clone; clones share channels.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<DashMap<String, Channel>>,
    capacity: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            capacity,
        }
    }

    fn channel(&self, topic: &str) -> Channel {
        let entry = self.channels.entry(topic.to_string()).or_insert_with(|| {
            let (mut tx, rx) = async_broadcast::broadcast(self.capacity);
            // slow subscribers lose oldest events rather than blocking publishers
            tx.set_overflow(true);
            // the parked receiver keeps the channel open across subscriber churn
            (tx, rx.deactivate())
        });
        (entry.0.clone(), entry.1.clone())
    }

    /// Subscribe to a topic. Events published before the subscription are not
    /// replayed.
    pub fn subscribe(&self, topic: &str) -> async_broadcast::Receiver<BusEvent> {
        self.channel(topic).1.activate()
    }

    /// Publish an event. Publishing to a topic nobody subscribes to is a no-op.
    pub fn publish(&self, topic: &str, payload: Value) {
        let event = BusEvent {
            topic: topic.to_string(),
            payload,
        };
        let sender = self.channel(topic).0;
        match sender.try_broadcast(event) {
            Ok(_) => {}
            Err(async_broadcast::TrySendError::Inactive(_)) => {
                debug!(topic, "no subscribers; event dropped");
            }
            Err(err) => {
                warn!(topic, error = %err, "event bus publish failed");
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
