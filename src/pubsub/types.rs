//! Wire types and resource names for the Pub/Sub REST API.
//!
//! Request and response bodies use JSON with camelCase field names, matching
//! the published API:
//!
//! - `PUT /v1/projects/{project}/subscriptions/{subscription}` - Create a subscription
//! - `GET /v1/projects/{project}/subscriptions/{subscription}` - Get subscription details
//! - `POST /v1/projects/{project}/subscriptions/{subscription}:pull` - Pull messages
//! - `POST /v1/projects/{project}/subscriptions/{subscription}:acknowledge` - Acknowledge messages

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed subscription label used by this tool.
pub const SUBSCRIPTION_LABEL: &str = "tail-pubsub";

/// Format a topic resource name.
pub fn topic_name(project: &str, topic: &str) -> String {
    format!("projects/{}/topics/{}", project, topic)
}

/// Format the tailer's subscription resource name for a project.
pub fn subscription_name(project: &str) -> String {
    format!("projects/{}/subscriptions/{}", project, SUBSCRIPTION_LABEL)
}

/// A Pub/Sub subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Subscription name (projects/{project}/subscriptions/{subscription}).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Topic name (projects/{project}/topics/{topic}).
    pub topic: String,
    /// Acknowledgment deadline in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack_deadline_seconds: Option<i32>,
    /// Labels for the subscription.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

impl Subscription {
    /// A subscription request body bound to the given topic.
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self {
            name: None,
            topic: topic.into(),
            ack_deadline_seconds: None,
            labels: None,
        }
    }
}

/// A Pub/Sub message as received over the wire.
///
/// `data` is kept as the raw base64 string rather than decoded through serde,
/// so a malformed payload fails only its own message and never the whole
/// pull response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubsubMessage {
    /// Message data (base64-encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Message attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, String>>,
    /// Message ID (set by server).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Publish timestamp (set by server).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<String>,
    /// Ordering key for ordered delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering_key: Option<String>,
}

/// Request for pulling messages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    /// Whether to return immediately if no messages are available.
    pub return_immediately: bool,
    /// Maximum number of messages to return.
    pub max_messages: i32,
}

/// Response for pulling messages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullResponse {
    /// Received messages.
    pub received_messages: Option<Vec<ReceivedMessage>>,
}

impl PullResponse {
    /// Consume the response, yielding its messages (empty when absent).
    pub fn into_messages(self) -> Vec<ReceivedMessage> {
        self.received_messages.unwrap_or_default()
    }
}

/// A received message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedMessage {
    /// Acknowledgment ID.
    pub ack_id: String,
    /// The message.
    pub message: PubsubMessage,
    /// Delivery attempt counter.
    pub delivery_attempt: Option<i32>,
}

/// Request for acknowledging messages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeRequest {
    /// Acknowledgment IDs.
    pub ack_ids: Vec<String>,
}

/// Error response format for Google Cloud APIs.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail information.
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    /// HTTP status code.
    pub code: u16,
    /// Error message.
    pub message: String,
    /// Error status string.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_names() {
        assert_eq!(topic_name("demo", "events"), "projects/demo/topics/events");
        assert_eq!(
            subscription_name("demo"),
            "projects/demo/subscriptions/tail-pubsub"
        );
    }

    #[test]
    fn test_pull_request_serializes_camel_case() {
        let request = PullRequest {
            return_immediately: true,
            max_messages: 2,
        };
        let json = serde_json::to_value(&request).expect("serialize pull request");
        assert_eq!(
            json,
            serde_json::json!({"returnImmediately": true, "maxMessages": 2})
        );
    }

    #[test]
    fn test_pull_response_with_messages() {
        let json = r#"{
            "receivedMessages": [
                {"ackId": "ack-1", "message": {"data": "aGVsbG8=", "messageId": "1"}},
                {"ackId": "ack-2", "message": {"data": "d29ybGQ="}, "deliveryAttempt": 3}
            ]
        }"#;
        let response: PullResponse = serde_json::from_str(json).expect("parse pull response");
        let messages = response.into_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].ack_id, "ack-1");
        assert_eq!(messages[0].message.data.as_deref(), Some("aGVsbG8="));
        assert_eq!(messages[1].delivery_attempt, Some(3));
    }

    #[test]
    fn test_empty_pull_response() {
        let response: PullResponse = serde_json::from_str("{}").expect("parse empty response");
        assert!(response.into_messages().is_empty());
    }

    #[test]
    fn test_error_envelope_parses() {
        let json = r#"{"error": {"code": 409, "message": "Subscription already exists", "status": "ALREADY_EXISTS"}}"#;
        let response: ErrorResponse = serde_json::from_str(json).expect("parse error envelope");
        assert_eq!(response.error.code, 409);
        assert_eq!(response.error.status, "ALREADY_EXISTS");
    }

    #[test]
    fn test_subscription_body_omits_unset_fields() {
        let subscription = Subscription::for_topic("projects/demo/topics/events");
        let json = serde_json::to_value(&subscription).expect("serialize subscription");
        assert_eq!(json, serde_json::json!({"topic": "projects/demo/topics/events"}));
    }
}
