use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use tabpilot_core_types::CoreError;

/// Trait implemented by payload types that can be carried on the bus.
pub trait Event: Clone + Send + Sync + std::fmt::Debug + 'static {}

impl<T> Event for T where T: Clone + Send + Sync + std::fmt::Debug + 'static {}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("bus closed before a matching event arrived")]
    Closed,

    #[error("no matching event within {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait EventBus<E>: Send + Sync
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), CoreError>;
    fn subscribe(&self) -> broadcast::Receiver<E>;
}

/// Simple in-memory bus. Delivery is best-effort: publishing with no live
/// subscriber reports an error the caller is free to ignore.
pub struct InMemoryBus<E>
where
    E: Event,
{
    sender: broadcast::Sender<E>,
}

impl<E> InMemoryBus<E>
where
    E: Event,
{
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self { sender })
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Register a one-shot subscription. The registration happens here, so
    /// events published after this call are never missed by the returned
    /// waiter.
    pub fn once<F>(&self, predicate: F) -> OneShot<E, F>
    where
        F: FnMut(&E) -> bool + Send,
    {
        OneShot::new(self.sender.subscribe(), predicate)
    }
}

#[async_trait]
impl<E> EventBus<E> for InMemoryBus<E>
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), CoreError> {
        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|err| CoreError::new(err.to_string()))
    }

    fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }
}

/// Suspends until the first event matching a predicate, then unsubscribes.
///
/// The subscription is dropped when the waiter resolves or is dropped, so a
/// waiter can never fire twice.
pub struct OneShot<E, F>
where
    E: Event,
{
    receiver: broadcast::Receiver<E>,
    predicate: F,
}

impl<E, F> OneShot<E, F>
where
    E: Event,
    F: FnMut(&E) -> bool + Send,
{
    pub fn new(receiver: broadcast::Receiver<E>, predicate: F) -> Self {
        Self {
            receiver,
            predicate,
        }
    }

    pub async fn wait(mut self) -> Result<E, BusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if (self.predicate)(&event) => return Ok(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "one-shot subscriber lagged behind the bus");
                }
                Err(RecvError::Closed) => return Err(BusError::Closed),
            }
        }
    }

    /// Like [`OneShot::wait`], bounded by `limit` when one is given.
    pub async fn wait_for(self, limit: Option<Duration>) -> Result<E, BusError> {
        match limit {
            None => self.wait().await,
            Some(limit) => tokio::time::timeout(limit, self.wait())
                .await
                .map_err(|_| BusError::Timeout(limit))?,
        }
    }
}
