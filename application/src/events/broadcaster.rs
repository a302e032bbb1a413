//! Event broadcaster
//!
//! Every subscriber owns a bounded channel. Publishing walks the subscriber
//! list under one lock, so all subscribers observe events in publish order.
//! A subscriber that cannot take an event within the delivery timeout, or
//! whose receiver is gone, is dropped; the publisher never waits longer
//! than the timeout per subscriber.

use crate::config::BroadcastSettings;
use roundtable_domain::ConversationEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tracing::{debug, warn};

pub type SubscriptionId = u64;

struct Subscriber {
    id: SubscriptionId,
    conversation_id: Option<String>,
    sender: mpsc::Sender<ConversationEvent>,
}

impl Subscriber {
    fn wants(&self, event: &ConversationEvent) -> bool {
        self.conversation_id
            .as_deref()
            .is_none_or(|id| id == event.conversation_id())
    }
}

/// Receiving side of a subscription.
///
/// Dropping it unsubscribes lazily: the next publish notices the closed
/// channel and removes the entry.
pub struct Subscription {
    id: SubscriptionId,
    receiver: mpsc::Receiver<ConversationEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Next event, or `None` once the subscription was removed.
    pub async fn recv(&mut self) -> Option<ConversationEvent> {
        self.receiver.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<ConversationEvent> {
        self.receiver.try_recv().ok()
    }
}

pub struct EventBroadcaster {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
    settings: BroadcastSettings,
}

impl EventBroadcaster {
    pub fn new(settings: BroadcastSettings) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            settings,
        }
    }

    /// Receive events of every conversation.
    pub async fn subscribe(&self) -> Subscription {
        self.register(None).await
    }

    /// Receive events of one conversation only.
    pub async fn subscribe_to(&self, conversation_id: impl Into<String>) -> Subscription {
        self.register(Some(conversation_id.into())).await
    }

    /// Returns whether the subscription was still registered.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().await;
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    /// Deliver `event` to every interested subscriber.
    ///
    /// Returns how many subscribers received it.
    pub async fn publish(&self, event: ConversationEvent) -> usize {
        let mut subscribers = self.subscribers.lock().await;
        let mut delivered = 0;
        let mut dropped = Vec::new();

        for subscriber in subscribers.iter().filter(|s| s.wants(&event)) {
            match subscriber
                .sender
                .send_timeout(event.clone(), self.settings.delivery_timeout)
                .await
            {
                Ok(()) => delivered += 1,
                Err(SendTimeoutError::Timeout(_)) => {
                    warn!(
                        "Dropping subscriber {} after a {} event timed out",
                        subscriber.id,
                        event.kind()
                    );
                    dropped.push(subscriber.id);
                }
                Err(SendTimeoutError::Closed(_)) => {
                    debug!("Subscriber {} went away", subscriber.id);
                    dropped.push(subscriber.id);
                }
            }
        }

        if !dropped.is_empty() {
            subscribers.retain(|s| !dropped.contains(&s.id));
        }
        delivered
    }

    async fn register(&self, conversation_id: Option<String>) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.settings.buffer);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().await.push(Subscriber {
            id,
            conversation_id,
            sender,
        });
        debug!("Subscriber {} registered", id);
        Subscription { id, receiver }
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(BroadcastSettings::default())
    }
}
