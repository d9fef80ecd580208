//! Shared-contact driver

use async_trait::async_trait;

use super::Driver;
use crate::attachment::AttachmentResolver;
use crate::error::Result;
use crate::message::{Contact, IncomingMessage};
use crate::webhook::{MessageEvent, WebhookEnvelope};

/// Claims events carrying a `contact` payload. No lookup call is
/// needed; the card is copied straight off the event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactDriver;

#[async_trait]
impl Driver for ContactDriver {
    fn name(&self) -> &'static str {
        "contact"
    }

    fn matches_request(&self, _envelope: &WebhookEnvelope, event: &MessageEvent) -> bool {
        event.from.is_some() && event.contact.is_some()
    }

    async fn messages(
        &self,
        event: &MessageEvent,
        _resolver: &AttachmentResolver,
    ) -> Result<Vec<IncomingMessage>> {
        let Some(payload) = event.contact.as_ref() else {
            return Ok(Vec::new());
        };
        let contact = Contact::new(
            &payload.phone_number,
            &payload.first_name,
            &payload.last_name,
            &payload.user_id,
        )
        .with_vcard(&payload.vcard);

        let message = IncomingMessage::new(
            Contact::PATTERN,
            event.sender_id(),
            event.chat_id(),
            event.clone(),
        )
        .with_contact(contact);
        Ok(vec![message])
    }
}
