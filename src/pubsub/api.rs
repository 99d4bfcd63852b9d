//! REST clients for the Pub/Sub v1 API.
//!
//! Speaks the JSON surface directly: `:pull` and `:acknowledge` on the
//! source subscription, `:publish` on the target topic. Payload bytes are
//! base64-encoded on the wire and decoded back before the rest of the
//! program sees them.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::pubsub::auth::{Credentials, EMULATOR_ENV};
use crate::pubsub::message::{OutboundMessage, ReceivedMessage};
use crate::pubsub::{MessageSink, MessageSource};

const PUBSUB_BASE_URL: &str = "https://pubsub.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Fully qualified subscription path.
pub fn subscription_path(project: &str, subscription: &str) -> String {
    format!("projects/{project}/subscriptions/{subscription}")
}

/// Fully qualified topic path.
pub fn topic_path(project: &str, topic: &str) -> String {
    format!("projects/{project}/topics/{topic}")
}

/// Shared low-level client: one HTTP connection pool plus the bearer token
/// for this session attempt. Cheap to clone.
#[derive(Clone)]
pub struct PubsubApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl PubsubApi {
    /// Build a client against the real service, or against the emulator
    /// when `PUBSUB_EMULATOR_HOST` is set. Credentials are resolved once;
    /// a token expiring mid-session surfaces as a request error and heals
    /// through the session restart, which constructs a fresh client.
    pub async fn connect() -> Result<Self> {
        let base_url = match std::env::var(EMULATOR_ENV) {
            Ok(host) if !host.trim().is_empty() => format!("http://{}", host.trim()),
            _ => PUBSUB_BASE_URL.to_string(),
        };
        let token = Credentials::from_env().access_token().await?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;
        debug!("Pub/Sub client ready against {base_url}");
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> reqwest::Result<Response> {
        let mut request = self
            .client
            .post(format!("{}/v1/{}", self.base_url, path))
            .json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request.send().await
    }
}

/// Describe a non-success response, keeping the API's own error text.
async fn api_error(operation: &str, response: Response) -> String {
    let status = response.status();
    let detail = response.text().await.unwrap_or_default();
    match status {
        StatusCode::TOO_MANY_REQUESTS => format!("{operation} rate limited: {detail}"),
        StatusCode::UNAUTHORIZED => {
            format!("{operation} unauthorized (expired token?): {detail}")
        }
        _ => format!("{operation} failed with {status}: {detail}"),
    }
}

/// Pull side bound to one subscription.
pub struct SubscriberClient {
    api: PubsubApi,
    subscription: String,
}

impl SubscriberClient {
    pub fn new(api: PubsubApi, subscription: String) -> Self {
        Self { api, subscription }
    }
}

#[async_trait]
impl MessageSource for SubscriberClient {
    async fn pull(&self, max_messages: usize) -> Result<Vec<ReceivedMessage>> {
        let response = self
            .api
            .post(
                &format!("{}:pull", self.subscription),
                &PullRequest { max_messages },
            )
            .await
            .map_err(|e| Error::Source(format!("Pull request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Source(api_error("Pull", response).await));
        }
        let body: PullResponse = response
            .json()
            .await
            .map_err(|e| Error::Source(format!("Failed to parse pull response: {e}")))?;
        body.received_messages
            .into_iter()
            .map(ReceivedWire::into_message)
            .collect()
    }

    async fn acknowledge(&self, ack_ids: &[String]) -> Result<()> {
        let response = self
            .api
            .post(
                &format!("{}:acknowledge", self.subscription),
                &AcknowledgeRequest { ack_ids },
            )
            .await
            .map_err(|e| Error::Source(format!("Acknowledge request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Source(api_error("Acknowledge", response).await));
        }
        debug!("Acknowledged {} messages on {}", ack_ids.len(), self.subscription);
        Ok(())
    }
}

/// Publish side bound to one topic.
pub struct PublisherClient {
    api: PubsubApi,
    topic: String,
}

impl PublisherClient {
    pub fn new(api: PubsubApi, topic: String) -> Self {
        Self { api, topic }
    }
}

#[async_trait]
impl MessageSink for PublisherClient {
    async fn publish(&self, messages: &[OutboundMessage]) -> Result<()> {
        let request = PublishRequest {
            messages: messages
                .iter()
                .map(|m| MessageOut {
                    data: BASE64.encode(&m.data),
                    attributes: m.attributes.clone(),
                })
                .collect(),
        };
        let response = self
            .api
            .post(&format!("{}:publish", self.topic), &request)
            .await
            .map_err(|e| Error::Sink(format!("Publish request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Sink(api_error("Publish", response).await));
        }
        let body: PublishResponse = response
            .json()
            .await
            .map_err(|e| Error::Sink(format!("Failed to parse publish response: {e}")))?;
        debug!(
            "Published {} messages to {}",
            body.message_ids.len(),
            self.topic
        );
        Ok(())
    }
}

// Wire shapes. The API omits empty repeated fields, hence the defaults.

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PullRequest {
    max_messages: usize,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PullResponse {
    #[serde(default)]
    received_messages: Vec<ReceivedWire>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceivedWire {
    ack_id: String,
    message: MessageWire,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageWire {
    #[serde(default)]
    data: String,
    #[serde(default)]
    attributes: HashMap<String, String>,
    #[serde(default)]
    message_id: String,
}

impl ReceivedWire {
    fn into_message(self) -> Result<ReceivedMessage> {
        let data = BASE64.decode(self.message.data.as_bytes()).map_err(|e| {
            Error::Source(format!(
                "Invalid base64 payload in message {}: {e}",
                self.message.message_id
            ))
        })?;
        Ok(ReceivedMessage::new(
            self.ack_id,
            self.message.message_id,
            data,
            self.message.attributes,
        ))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AcknowledgeRequest<'a> {
    ack_ids: &'a [String],
}

#[derive(Serialize)]
struct PublishRequest {
    messages: Vec<MessageOut>,
}

#[derive(Serialize)]
struct MessageOut {
    data: String,
    attributes: HashMap<String, String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}
