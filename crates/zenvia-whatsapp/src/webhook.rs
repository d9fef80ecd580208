//! Webhook envelope model
//!
//! Zenvia posts one JSON notification per webhook call. The envelope
//! carries routing metadata (`type`, `direction`, subscription info) and,
//! for message notifications, a `message` event with the conversation
//! peers and the message content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Notification type of inbound user messages.
pub const NOTIFICATION_MESSAGE: &str = "MESSAGE";
/// Direction value of traffic flowing from the user to the channel.
pub const DIRECTION_IN: &str = "IN";

/// Conversation peer reference.
///
/// The provider renders peers either as a bare id string or as a keyed
/// descriptor; both shapes decode to the same thing and [`Peer::id`]
/// reads the id regardless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Peer {
    /// Bare id, e.g. `"from": "5511999999999"`.
    Id(String),
    /// Keyed descriptor carrying at least an `id` field.
    Descriptor(serde_json::Map<String, Value>),
}

impl Peer {
    /// The peer id regardless of shape; empty when absent.
    pub fn id(&self) -> String {
        match self {
            Peer::Id(id) => id.clone(),
            Peer::Descriptor(map) => match map.get("id") {
                Some(Value::String(id)) => id.clone(),
                Some(Value::Number(id)) => id.to_string(),
                _ => String::new(),
            },
        }
    }
}

/// One entry of the `contents` sequence of a message event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Reply token of interactive button and list responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// Remaining content fields (`fileUrl`, `fileMimeType`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ContentItem {
    pub fn is_text(&self) -> bool {
        self.content_type == "text"
    }
}

/// Shared-contact payload of a contact event.
///
/// `user_id` is required; the other fields default to empty strings
/// when the sender's address book entry omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactPayload {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub user_id: String,
    #[serde(default)]
    pub vcard: String,
}

/// Pin-drop payload of a location event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPayload {
    pub latitude: f64,
    pub longitude: f64,
}

/// Message event inside a webhook envelope.
///
/// Exactly one of the media/structured fields is populated per event;
/// plain text arrives through `contents`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Peer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Peer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<Peer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<ContentItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_note: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationPayload>,
}

impl MessageEvent {
    /// Sender id, or empty when the event names no sender.
    pub fn sender_id(&self) -> String {
        self.from.as_ref().map(Peer::id).unwrap_or_default()
    }

    /// Recipient id (the `to` peer), or empty when absent.
    pub fn recipient_id(&self) -> String {
        self.to.as_ref().map(Peer::id).unwrap_or_default()
    }

    /// Chat id media replies are addressed to, falling back to `to`.
    pub fn chat_id(&self) -> String {
        self.chat
            .as_ref()
            .or(self.to.as_ref())
            .map(Peer::id)
            .unwrap_or_default()
    }

    pub fn direction_in(&self) -> bool {
        self.direction.as_deref() == Some(DIRECTION_IN)
    }

    pub fn first_content(&self) -> Option<&ContentItem> {
        self.contents.first()
    }
}

/// Top-level webhook notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<String>,
    #[serde(rename = "subscriptionId", default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageEvent>,
}

impl WebhookEnvelope {
    /// Decode a webhook body.
    ///
    /// Interactive replies (button and list selections) arrive with a
    /// `payload` token instead of typed text; when the first content item
    /// has a payload and no text, the payload doubles as the text so
    /// replies read like ordinary messages downstream.
    pub fn decode(body: &str) -> Result<Self> {
        let mut envelope: WebhookEnvelope = serde_json::from_str(body)?;
        if let Some(event) = envelope.message.as_mut()
            && let Some(first) = event.contents.first_mut()
            && first.text.is_none()
            && let Some(payload) = first.payload.clone()
        {
            first.text = Some(payload);
        }
        Ok(envelope)
    }

    /// Whether this is a `MESSAGE` notification.
    pub fn is_message(&self) -> bool {
        self.notification_type.as_deref() == Some(NOTIFICATION_MESSAGE)
    }

    /// Whether the envelope itself flows inbound.
    pub fn direction_in(&self) -> bool {
        self.direction.as_deref() == Some(DIRECTION_IN)
    }
}
