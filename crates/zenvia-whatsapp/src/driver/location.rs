//! Shared-location driver

use async_trait::async_trait;

use super::Driver;
use crate::attachment::AttachmentResolver;
use crate::error::Result;
use crate::message::{IncomingMessage, Location};
use crate::webhook::{MessageEvent, WebhookEnvelope};

/// Claims events carrying a `location` payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationDriver;

#[async_trait]
impl Driver for LocationDriver {
    fn name(&self) -> &'static str {
        "location"
    }

    fn matches_request(&self, _envelope: &WebhookEnvelope, event: &MessageEvent) -> bool {
        event.from.is_some() && event.location.is_some()
    }

    async fn messages(
        &self,
        event: &MessageEvent,
        _resolver: &AttachmentResolver,
    ) -> Result<Vec<IncomingMessage>> {
        let Some(payload) = event.location.as_ref() else {
            return Ok(Vec::new());
        };
        let location = Location::new(payload.latitude, payload.longitude);

        let message = IncomingMessage::new(
            Location::PATTERN,
            event.sender_id(),
            event.chat_id(),
            event.clone(),
        )
        .with_location(location);
        Ok(vec![message])
    }
}
