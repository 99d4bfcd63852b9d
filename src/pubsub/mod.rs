//! Abstraction layer for the Pub/Sub collaborators.
//!
//! The drain loop only sees the [`MessageSource`] and [`MessageSink`]
//! traits; `api` holds the REST-backed clients, `mock` the scripted doubles
//! used by tests.

pub mod api;
pub mod auth;
pub mod message;
pub mod mock;

pub use api::{subscription_path, topic_path, PublisherClient, PubsubApi, SubscriberClient};
pub use message::{OutboundMessage, ReceivedMessage};
pub use mock::{MockMessageSink, MockMessageSource};

use async_trait::async_trait;

use crate::error::Result;

/// Pull side of the messaging system, bound to one subscription.
///
/// Messages left unacknowledged stay pending and become visible again after
/// the subscription's lease timeout; every consumer must tolerate
/// redelivery.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Pull up to `max_messages` pending messages. An empty result is valid
    /// and signals that nothing is currently deliverable.
    async fn pull(&self, max_messages: usize) -> Result<Vec<ReceivedMessage>>;

    /// Commit removal of the given messages from the subscription.
    async fn acknowledge(&self, ack_ids: &[String]) -> Result<()>;
}

/// Publish side of the messaging system, bound to one topic.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Deliver the messages to the target topic in a single call.
    async fn publish(&self, messages: &[OutboundMessage]) -> Result<()>;
}
