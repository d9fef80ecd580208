//! Photo driver

use async_trait::async_trait;
use serde_json::Value;

use super::Driver;
use crate::attachment::AttachmentResolver;
use crate::error::Result;
use crate::message::{Image, IncomingMessage};
use crate::webhook::{MessageEvent, WebhookEnvelope};

/// Claims events carrying a `photo` payload.
///
/// Photos arrive as a run of size candidates ordered small to large;
/// only the last (largest) candidate is resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoDriver;

#[async_trait]
impl Driver for PhotoDriver {
    fn name(&self) -> &'static str {
        "photo"
    }

    fn matches_request(&self, _envelope: &WebhookEnvelope, event: &MessageEvent) -> bool {
        event.from.is_some() && event.photo.is_some()
    }

    async fn messages(
        &self,
        event: &MessageEvent,
        resolver: &AttachmentResolver,
    ) -> Result<Vec<IncomingMessage>> {
        let candidate = event
            .photo
            .as_ref()
            .and_then(|sizes| sizes.last())
            .unwrap_or(&Value::Null);
        let resolved = resolver.resolve(candidate).await?;
        let image = Image::new(resolved.url).with_metadata(resolved.metadata);

        let message = IncomingMessage::new(
            Image::PATTERN,
            event.sender_id(),
            event.chat_id(),
            event.clone(),
        )
        .with_images(vec![image]);
        Ok(vec![message])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZenviaConfig;
    use crate::http::{HttpResponse, MockHttpClient};
    use serde_json::json;
    use std::sync::Arc;

    fn resolver_with(http: &MockHttpClient) -> AttachmentResolver {
        let config = ZenviaConfig::new("secret").with_file_base("http://localhost:9000/files");
        AttachmentResolver::new(Arc::new(config), Arc::new(http.clone()))
    }

    fn event(value: serde_json::Value) -> MessageEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn claims_photo_events_only_with_sender() {
        let claims = |value| PhotoDriver.matches_request(&WebhookEnvelope::default(), &event(value));
        assert!(claims(json!({"from": {"id": "u"}, "photo": [{"file_id": "p"}]})));
        assert!(!claims(json!({"photo": [{"file_id": "p"}]})));
        assert!(!claims(json!({"from": {"id": "u"}})));
    }

    #[tokio::test]
    async fn resolves_largest_size_candidate() {
        let http = MockHttpClient::from_responses(vec![HttpResponse::new(
            200,
            json!({"ok": true, "result": {"file_path": "media/large.jpg"}}).to_string(),
        )]);
        let event = event(json!({
            "from": {"id": "user-1"},
            "chat": {"id": "chat-7"},
            "photo": [
                {"file_id": "pic-s", "width": 90},
                {"file_id": "pic-m", "width": 320},
                {"file_id": "pic-l", "width": 800}
            ]
        }));

        let messages = PhotoDriver
            .messages(&event, &resolver_with(&http))
            .await
            .unwrap();

        let requests = http.requests().await;
        assert_eq!(
            requests[0].url_params,
            vec![("file_id".to_string(), "pic-l".to_string())]
        );

        let message = &messages[0];
        assert_eq!(message.text, Image::PATTERN);
        assert_eq!(message.images.len(), 1);
        assert_eq!(message.images[0].url, "http://localhost:9000/files/media/large.jpg");
        assert_eq!(message.images[0].metadata, json!({"file_id": "pic-l", "width": 800}));
    }
}
