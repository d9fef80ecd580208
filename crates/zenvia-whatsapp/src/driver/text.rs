//! Plain text driver

use async_trait::async_trait;

use super::Driver;
use crate::attachment::AttachmentResolver;
use crate::config::ZenviaConfig;
use crate::error::Result;
use crate::message::IncomingMessage;
use crate::webhook::{ContentItem, MessageEvent, WebhookEnvelope};

/// Claims inbound `MESSAGE` notifications whose first content item is
/// typed text.
///
/// The claim is the strictest of all drivers: both the envelope and the
/// event must flow inbound, and the event must name a sender. Interactive
/// replies also land here because decoding copies their payload token
/// into the text slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDriver;

#[async_trait]
impl Driver for TextDriver {
    fn name(&self) -> &'static str {
        "text"
    }

    fn matches_request(&self, envelope: &WebhookEnvelope, event: &MessageEvent) -> bool {
        envelope.is_message()
            && envelope.direction_in()
            && event.first_content().is_some_and(ContentItem::is_text)
            && event.from.is_some()
            && event.direction_in()
    }

    async fn messages(
        &self,
        event: &MessageEvent,
        _resolver: &AttachmentResolver,
    ) -> Result<Vec<IncomingMessage>> {
        let text = event
            .first_content()
            .and_then(|content| content.text.clone())
            .unwrap_or_default();

        Ok(vec![IncomingMessage::new(
            text,
            event.sender_id(),
            event.recipient_id(),
            event.clone(),
        )])
    }

    fn is_configured(&self, config: &ZenviaConfig) -> bool {
        config.is_configured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;
    use serde_json::json;
    use std::sync::Arc;

    fn resolver() -> AttachmentResolver {
        AttachmentResolver::new(
            Arc::new(ZenviaConfig::new("secret")),
            Arc::new(MockHttpClient::new()),
        )
    }

    fn envelope(body: serde_json::Value) -> WebhookEnvelope {
        WebhookEnvelope::decode(&body.to_string()).unwrap()
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "type": "MESSAGE",
            "direction": "IN",
            "message": {
                "from": "5511999999999",
                "to": "bot-1",
                "direction": "IN",
                "contents": [{"type": "text", "text": "hello there"}]
            }
        })
    }

    fn claims(envelope: &WebhookEnvelope) -> bool {
        TextDriver.matches_request(envelope, envelope.message.as_ref().unwrap())
    }

    #[test]
    fn claims_inbound_text_message() {
        assert!(claims(&envelope(valid_body())));
    }

    #[test]
    fn rejects_non_message_notification() {
        let mut body = valid_body();
        body["type"] = json!("MESSAGE_STATUS");
        assert!(!claims(&envelope(body)));
    }

    #[test]
    fn rejects_outbound_envelope() {
        let mut body = valid_body();
        body["direction"] = json!("OUT");
        assert!(!claims(&envelope(body)));
    }

    #[test]
    fn rejects_outbound_event() {
        let mut body = valid_body();
        body["message"]["direction"] = json!("OUT");
        assert!(!claims(&envelope(body)));
    }

    #[test]
    fn rejects_missing_sender() {
        let mut body = valid_body();
        body["message"].as_object_mut().unwrap().remove("from");
        assert!(!claims(&envelope(body)));
    }

    #[test]
    fn rejects_non_text_first_content() {
        let mut body = valid_body();
        body["message"]["contents"] = json!([{"type": "file", "fileUrl": "https://x/f.pdf"}]);
        assert!(!claims(&envelope(body)));
    }

    #[test]
    fn rejects_empty_contents() {
        let mut body = valid_body();
        body["message"]["contents"] = json!([]);
        assert!(!claims(&envelope(body)));
    }

    #[tokio::test]
    async fn builds_message_from_first_content() {
        let envelope = envelope(valid_body());
        let event = envelope.message.as_ref().unwrap();

        let messages = TextDriver.messages(event, &resolver()).await.unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hello there");
        assert_eq!(messages[0].sender, "5511999999999");
        assert_eq!(messages[0].recipient, "bot-1");
        assert_eq!(&messages[0].event, event);
    }

    #[tokio::test]
    async fn interactive_reply_token_becomes_text() {
        let envelope = envelope(json!({
            "type": "MESSAGE",
            "direction": "IN",
            "message": {
                "from": "5511999999999",
                "direction": "IN",
                "contents": [{"type": "text", "payload": "btn-confirm"}]
            }
        }));
        let event = envelope.message.as_ref().unwrap();

        assert!(claims(&envelope));
        let messages = TextDriver.messages(event, &resolver()).await.unwrap();
        assert_eq!(messages[0].text, "btn-confirm");
    }

    #[test]
    fn configured_when_token_present() {
        assert!(TextDriver.is_configured(&ZenviaConfig::new("secret")));
        assert!(!TextDriver.is_configured(&ZenviaConfig::new("")));
    }
}
