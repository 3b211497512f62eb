//! In-process fan-out of rating updates to open event-stream subscribers.
//!
//! The registry is an explicit object carried in `AppState`. Each subscriber
//! owns an unbounded queue, so publishing never waits on a slow client. A
//! subscriber whose queue is gone (the HTTP response was dropped) is removed
//! the next time anything is published, or immediately when its
//! [`Subscription`] is dropped.

use std::{
    collections::HashMap,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard},
    task::{Context, Poll},
};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use utoipa::ToSchema;

pub type SubscriberId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum BroadcastEvent {
    #[serde(rename = "rating:update", rename_all = "camelCase")]
    RatingUpdate { store_id: i32, avg_rating: f64 },
}

#[derive(Default)]
struct Registry {
    next_id: SubscriberId,
    subscribers: HashMap<SubscriberId, mpsc::UnboundedSender<BroadcastEvent>>,
}

#[derive(Clone, Default)]
pub struct RatingBroadcaster {
    inner: Arc<Mutex<Registry>>,
}

impl RatingBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // The map stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.registry();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.insert(id, tx);
        let count = registry.subscribers.len();
        drop(registry);

        tracing::debug!(subscriber = id, subscribers = count, "event stream subscribed");
        Subscription {
            id,
            receiver: rx,
            broadcaster: self.clone(),
        }
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut registry = self.registry();
        let removed = registry.subscribers.remove(&id).is_some();
        if removed {
            tracing::debug!(
                subscriber = id,
                subscribers = registry.subscribers.len(),
                "event stream unsubscribed"
            );
        }
        removed
    }

    /// Deliver `event` to every subscriber and return how many accepted it.
    pub fn publish(&self, event: BroadcastEvent) -> usize {
        let mut registry = self.registry();
        let before = registry.subscribers.len();
        registry
            .subscribers
            .retain(|_, tx| tx.send(event.clone()).is_ok());
        let delivered = registry.subscribers.len();

        if delivered < before {
            tracing::debug!(dropped = before - delivered, "removed closed subscribers");
        }
        tracing::debug!(delivered, ?event, "event published");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry().subscribers.len()
    }
}

/// Receiving half of one subscriber. Unregisters itself on drop.
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::UnboundedReceiver<BroadcastEvent>,
    broadcaster: RatingBroadcaster,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub async fn recv(&mut self) -> Option<BroadcastEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<BroadcastEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Stream for Subscription {
    type Item = BroadcastEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.broadcaster.unsubscribe(self.id);
    }
}
