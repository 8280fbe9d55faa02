//! Event bus for broadcasting CRUD events to in-process listeners

use super::{CrudEvent, EventEmitter};
use tokio::sync::broadcast;
use tracing::debug;

/// Default broadcast channel capacity
const DEFAULT_CAPACITY: usize = 256;

/// Event bus that distributes CrudEvents via `tokio::sync::broadcast`
///
/// Emitting never blocks. With no subscribers, events are dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CrudEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CrudEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventEmitter for EventBus {
    fn emit(&self, event: CrudEvent) {
        let entity_type = event.entity_type;
        let action = event.action;
        let entity_id = event.entity_id;
        if let Ok(n) = self.sender.send(event) {
            debug!(
                ?entity_type,
                ?action,
                ?entity_id,
                subscribers = n,
                "CrudEvent emitted"
            );
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
