//! Message types shared by the subscriber and publisher sides.
//!
//! A pulled message keeps its payload bytes and attribute map exactly as
//! delivered; the decoded envelope is a read-only view used for filtering
//! and logging. Republishing copies bytes and attributes verbatim.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

/// Attribute key carrying the connection (data provider) identifier.
pub const ATTR_DATA_PROVIDER_ID: &str = "data_provider_id";
/// Attribute key carrying the Gundi object identifier.
pub const ATTR_GUNDI_ID: &str = "gundi_id";
/// Attribute key carrying the source (device) identifier.
pub const ATTR_SOURCE_ID: &str = "source_id";

/// A message pulled from the source subscription.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    /// Acknowledgement handle, opaque to everything but the subscriber.
    pub ack_id: String,
    /// Server-assigned message identifier.
    pub message_id: String,
    /// Payload bytes, never mutated.
    pub data: Vec<u8>,
    /// String attributes, never mutated.
    pub attributes: HashMap<String, String>,
    envelope: EventEnvelope,
}

impl ReceivedMessage {
    /// Build a message from wire fields, decoding the payload view once.
    pub fn new(
        ack_id: String,
        message_id: String,
        data: Vec<u8>,
        attributes: HashMap<String, String>,
    ) -> Self {
        let envelope = EventEnvelope::decode(&data);
        Self {
            ack_id,
            message_id,
            data,
            attributes,
            envelope,
        }
    }

    pub fn connection_id(&self) -> Option<&str> {
        self.attributes.get(ATTR_DATA_PROVIDER_ID).map(String::as_str)
    }

    pub fn gundi_id(&self) -> Option<&str> {
        self.attributes.get(ATTR_GUNDI_ID).map(String::as_str)
    }

    /// Source identifier: the attribute when present, else the payload's
    /// external source id.
    pub fn source_id(&self) -> Option<&str> {
        self.attributes
            .get(ATTR_SOURCE_ID)
            .map(String::as_str)
            .or_else(|| self.envelope.external_source_id())
    }

    pub fn system_event_id(&self) -> Option<&str> {
        self.envelope.event_id.as_deref()
    }

    pub fn event_type(&self) -> Option<&str> {
        self.envelope.event_type.as_deref()
    }

    /// Verbatim copy for republishing to the target topic.
    pub fn to_outbound(&self) -> OutboundMessage {
        OutboundMessage {
            data: self.data.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

/// A message headed for the target topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub data: Vec<u8>,
    pub attributes: HashMap<String, String>,
}

/// Decoded view over the payload JSON, read for filtering and logging only.
///
/// A payload that is not a JSON object decodes to an empty view; the
/// classifier then treats the event fields as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    payload: Option<EventPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EventPayload {
    #[serde(default)]
    external_source_id: Option<String>,
}

impl EventEnvelope {
    fn decode(data: &[u8]) -> Self {
        match serde_json::from_slice(data) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!("Payload is not a JSON event envelope: {err}");
                Self::default()
            }
        }
    }

    fn external_source_id(&self) -> Option<&str> {
        self.payload
            .as_ref()
            .and_then(|p| p.external_source_id.as_deref())
    }
}
