//! Video and video-note driver

use async_trait::async_trait;
use serde_json::Value;

use super::Driver;
use crate::attachment::AttachmentResolver;
use crate::error::Result;
use crate::message::{IncomingMessage, Video};
use crate::webhook::{MessageEvent, WebhookEnvelope};

/// Claims events carrying a `video` or `video_note` payload.
///
/// The regular video payload wins when both are present.
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoDriver;

#[async_trait]
impl Driver for VideoDriver {
    fn name(&self) -> &'static str {
        "video"
    }

    fn matches_request(&self, _envelope: &WebhookEnvelope, event: &MessageEvent) -> bool {
        event.from.is_some() && (event.video.is_some() || event.video_note.is_some())
    }

    async fn messages(
        &self,
        event: &MessageEvent,
        resolver: &AttachmentResolver,
    ) -> Result<Vec<IncomingMessage>> {
        let payload = event
            .video
            .as_ref()
            .or(event.video_note.as_ref())
            .unwrap_or(&Value::Null);
        let resolved = resolver.resolve(payload).await?;
        let video = Video::new(resolved.url).with_metadata(resolved.metadata);

        let message = IncomingMessage::new(
            Video::PATTERN,
            event.sender_id(),
            event.chat_id(),
            event.clone(),
        )
        .with_videos(vec![video]);
        Ok(vec![message])
    }
}
