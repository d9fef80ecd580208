//! Document file driver

use async_trait::async_trait;
use serde_json::Value;

use super::Driver;
use crate::attachment::AttachmentResolver;
use crate::error::Result;
use crate::message::{FileAttachment, IncomingMessage};
use crate::webhook::{MessageEvent, WebhookEnvelope};

/// Claims events carrying a `document` payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDriver;

#[async_trait]
impl Driver for FileDriver {
    fn name(&self) -> &'static str {
        "file"
    }

    fn matches_request(&self, _envelope: &WebhookEnvelope, event: &MessageEvent) -> bool {
        event.from.is_some() && event.document.is_some()
    }

    async fn messages(
        &self,
        event: &MessageEvent,
        resolver: &AttachmentResolver,
    ) -> Result<Vec<IncomingMessage>> {
        let payload = event.document.as_ref().unwrap_or(&Value::Null);
        let resolved = resolver.resolve(payload).await?;
        let file = FileAttachment::new(resolved.url).with_metadata(resolved.metadata);

        let message = IncomingMessage::new(
            FileAttachment::PATTERN,
            event.sender_id(),
            event.chat_id(),
            event.clone(),
        )
        .with_files(vec![file]);
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
    fn claims_document_events_only_with_sender() {
        let claims = |value| FileDriver.matches_request(&WebhookEnvelope::default(), &event(value));
        assert!(claims(json!({"from": {"id": "u"}, "document": {"file_id": "d"}})));
        assert!(!claims(json!({"document": {"file_id": "d"}})));
        assert!(!claims(json!({"from": {"id": "u"}})));
    }

    #[tokio::test]
    async fn resolves_document_into_file_message() {
        let http = MockHttpClient::from_responses(vec![HttpResponse::new(
            200,
            json!({"ok": true, "result": {"file_path": "docs/report.pdf"}}).to_string(),
        )]);
        let event = event(json!({
            "from": {"id": "user-1"},
            "chat": {"id": "chat-7"},
            "document": {"file_id": "doc-1", "file_name": "report.pdf"}
        }));

        let messages = FileDriver
            .messages(&event, &resolver_with(&http))
            .await
            .unwrap();

        let message = &messages[0];
        assert_eq!(message.text, FileAttachment::PATTERN);
        assert_eq!(message.files.len(), 1);
        assert_eq!(message.files[0].url, "http://localhost:9000/files/docs/report.pdf");
        assert_eq!(
            message.files[0].metadata,
            json!({"file_id": "doc-1", "file_name": "report.pdf"})
        );
    }
}
