//! Scripted in-memory implementations of [`MessageSource`] and
//! [`MessageSink`] for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::pubsub::message::{OutboundMessage, ReceivedMessage};
use crate::pubsub::{MessageSink, MessageSource};

/// Message source backed by a queue of scripted pull results. Once the
/// script is exhausted, further pulls see a drained subscription (empty
/// batches), which is the steady state of a real one.
#[derive(Clone, Default)]
pub struct MockMessageSource {
    pull_results: Arc<Mutex<Vec<Result<Vec<ReceivedMessage>>>>>,
    ack_results: Arc<Mutex<Vec<Result<()>>>>,
    ack_calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockMessageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful pull returning `messages`.
    pub fn add_pull(&self, messages: Vec<ReceivedMessage>) {
        self.pull_results.lock().unwrap().push(Ok(messages));
    }

    /// Queue a failing pull.
    pub fn add_pull_error(&self, message: &str) {
        self.pull_results
            .lock()
            .unwrap()
            .push(Err(Error::Source(message.to_string())));
    }

    /// Queue a failing acknowledge. Unscripted acknowledges succeed.
    pub fn add_ack_error(&self, message: &str) {
        self.ack_results
            .lock()
            .unwrap()
            .push(Err(Error::Source(message.to_string())));
    }

    /// Every acknowledge attempt, in call order.
    pub fn ack_calls(&self) -> Vec<Vec<String>> {
        self.ack_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSource for MockMessageSource {
    async fn pull(&self, _max_messages: usize) -> Result<Vec<ReceivedMessage>> {
        let mut results = self.pull_results.lock().unwrap();
        if results.is_empty() {
            Ok(Vec::new())
        } else {
            results.remove(0)
        }
    }

    async fn acknowledge(&self, ack_ids: &[String]) -> Result<()> {
        self.ack_calls.lock().unwrap().push(ack_ids.to_vec());
        let mut results = self.ack_results.lock().unwrap();
        if results.is_empty() {
            Ok(())
        } else {
            results.remove(0)
        }
    }
}

/// Message sink that records published batches and can be scripted to fail.
#[derive(Clone, Default)]
pub struct MockMessageSink {
    publish_results: Arc<Mutex<Vec<Result<()>>>>,
    published: Arc<Mutex<Vec<Vec<OutboundMessage>>>>,
}

impl MockMessageSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a failing publish. Unscripted publishes succeed.
    pub fn add_publish_error(&self, message: &str) {
        self.publish_results
            .lock()
            .unwrap()
            .push(Err(Error::Sink(message.to_string())));
    }

    /// Every published batch, in call order. Batches are recorded even
    /// when the scripted result is a failure, mirroring a request that
    /// was sent but rejected.
    pub fn published(&self) -> Vec<Vec<OutboundMessage>> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSink for MockMessageSink {
    async fn publish(&self, messages: &[OutboundMessage]) -> Result<()> {
        self.published.lock().unwrap().push(messages.to_vec());
        let mut results = self.publish_results.lock().unwrap();
        if results.is_empty() {
            Ok(())
        } else {
            results.remove(0)
        }
    }
}

/// Build a message with the given ack id and attributes and an empty
/// payload. Tests that care about payload contents use
/// [`message_with_payload`].
pub fn message_with_attributes(ack_id: &str, attributes: &[(&str, &str)]) -> ReceivedMessage {
    message_with_payload(ack_id, attributes, b"")
}

/// Build a message with the given ack id, attributes and raw payload.
pub fn message_with_payload(
    ack_id: &str,
    attributes: &[(&str, &str)],
    data: &[u8],
) -> ReceivedMessage {
    let attributes: HashMap<String, String> = attributes
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ReceivedMessage::new(
        ack_id.to_string(),
        format!("id-{ack_id}"),
        data.to_vec(),
        attributes,
    )
}
