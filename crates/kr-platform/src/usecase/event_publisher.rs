//! Event Publishing
//!
//! Stored events are handed to an [`EventPublisher`] once their transaction
//! has committed. Subscribers never see events from rolled-back work.

use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::event::Event;

pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &Event);
}

/// In-process fan-out over a tokio broadcast channel.
///
/// Slow subscribers lag and lose the oldest events; publishing never blocks.
#[derive(Clone)]
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<Event>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventPublisher for BroadcastEventPublisher {
    fn publish(&self, event: &Event) {
        match self.sender.send(event.clone()) {
            Ok(receivers) => debug!(
                event_id = %event.id,
                event_type = %event.event_type,
                receivers,
                "Published event"
            ),
            Err(_) => trace!(event_id = %event.id, "No subscribers for event"),
        }
    }
}
