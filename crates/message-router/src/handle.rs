use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use tabpilot_core_types::Message;
use tabpilot_event_bus::{EventBus, InMemoryBus, OneShot};

use crate::error::RouterError;

/// Sending side of the router plus access to its fan-out bus. Cheap to clone;
/// every context holds one.
#[derive(Clone)]
pub struct RouterHandle {
    inbound: mpsc::UnboundedSender<Value>,
    outbound: Arc<InMemoryBus<Message>>,
}

/// Receiving side consumed by [`MessageRouter`](crate::MessageRouter).
pub struct RouterInbox {
    inbound: mpsc::UnboundedReceiver<Value>,
}

impl RouterHandle {
    pub fn channel(bus_capacity: usize) -> (RouterHandle, RouterInbox) {
        let (inbound, receiver) = mpsc::unbounded_channel();
        let handle = RouterHandle {
            inbound,
            outbound: InMemoryBus::new(bus_capacity),
        };
        (handle, RouterInbox { inbound: receiver })
    }

    /// Best-effort send. A router that has gone away is not an error for the
    /// sender.
    pub fn send(&self, message: Message) {
        self.send_raw(message.to_value());
    }

    /// Send an unvalidated value, as a context outside this process would.
    pub fn send_raw(&self, value: Value) {
        if self.inbound.send(value).is_err() {
            debug!("router inbox closed; message dropped");
        }
    }

    pub fn try_send(&self, message: Message) -> Result<(), RouterError> {
        self.inbound
            .send(message.to_value())
            .map_err(|_| RouterError::Closed)
    }

    /// Messages fanned out by the router from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.outbound.subscribe()
    }

    /// One-shot wait on the fan-out, registered immediately.
    pub fn once<F>(&self, predicate: F) -> OneShot<Message, F>
    where
        F: FnMut(&Message) -> bool + Send,
    {
        self.outbound.once(predicate)
    }

    pub(crate) fn bus(&self) -> &Arc<InMemoryBus<Message>> {
        &self.outbound
    }
}

impl RouterInbox {
    pub async fn recv(&mut self) -> Option<Value> {
        self.inbound.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Value> {
        self.inbound.try_recv().ok()
    }
}
