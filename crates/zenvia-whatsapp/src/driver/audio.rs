//! Audio and voice-note driver

use async_trait::async_trait;
use serde_json::Value;

use super::Driver;
use crate::attachment::AttachmentResolver;
use crate::error::Result;
use crate::message::{Audio, IncomingMessage};
use crate::webhook::{MessageEvent, WebhookEnvelope};

/// Claims events carrying an `audio` or `voice` payload.
///
/// Voice notes win when both payloads are present. The claim looks only
/// at the event shape, never at the envelope routing fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioDriver;

#[async_trait]
impl Driver for AudioDriver {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn matches_request(&self, _envelope: &WebhookEnvelope, event: &MessageEvent) -> bool {
        event.from.is_some() && (event.audio.is_some() || event.voice.is_some())
    }

    async fn messages(
        &self,
        event: &MessageEvent,
        resolver: &AttachmentResolver,
    ) -> Result<Vec<IncomingMessage>> {
        let payload = event
            .voice
            .as_ref()
            .or(event.audio.as_ref())
            .unwrap_or(&Value::Null);
        let resolved = resolver.resolve(payload).await?;
        let audio = Audio::new(resolved.url).with_metadata(resolved.metadata);

        let message = IncomingMessage::new(
            Audio::PATTERN,
            event.sender_id(),
            event.chat_id(),
            event.clone(),
        )
        .with_audio(vec![audio]);
        Ok(vec![message])
    }
}
