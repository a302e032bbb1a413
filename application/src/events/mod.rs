//! Fan-out of conversation events to live observers.

pub mod broadcaster;

pub use broadcaster::{EventBroadcaster, Subscription, SubscriptionId};
