//! Webhook driver variants
//!
//! Every inbound notification is offered to a fixed, ordered set of
//! drivers; the first driver whose claim predicate accepts the event
//! builds the normalized messages. Order is part of the contract: text
//! claims before any media driver, and photo/video claim last, so an
//! event carrying several markers always lands in the same driver.
//!
//! # Example
//!
//! ```ignore
//! use zenvia_whatsapp::driver::DriverRegistry;
//!
//! let registry = DriverRegistry::standard();
//! let messages = registry.dispatch(&envelope, &resolver).await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::attachment::AttachmentResolver;
use crate::config::ZenviaConfig;
use crate::delivery::{DeliveryEngine, Sleeper};
use crate::error::{Result, ZenviaError};
use crate::http::{HttpClient, HttpResponse, ReqwestHttpClient};
use crate::message::{Answer, IncomingMessage, Outgoing, User};
use crate::outbound;
use crate::webhook::{MessageEvent, WebhookEnvelope};

mod audio;
mod contact;
mod file;
mod location;
mod photo;
mod text;
mod video;

pub use audio::AudioDriver;
pub use contact::ContactDriver;
pub use file::FileDriver;
pub use location::LocationDriver;
pub use photo::PhotoDriver;
pub use text::TextDriver;
pub use video::VideoDriver;

/// One webhook event classifier.
///
/// `matches_request` must be cheap and side-effect free; `messages` is
/// only invoked after a claim and may call the attachment resolver.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this driver claims the event.
    fn matches_request(&self, envelope: &WebhookEnvelope, event: &MessageEvent) -> bool;

    /// Build the normalized messages for a claimed event.
    async fn messages(
        &self,
        event: &MessageEvent,
        resolver: &AttachmentResolver,
    ) -> Result<Vec<IncomingMessage>>;

    /// Whether the claim corresponds to an out-of-band event the host
    /// hooks into. No variant reports one.
    fn has_matching_event(&self) -> bool {
        false
    }

    /// Whether this driver considers the channel usable for outbound
    /// calls. Only the text driver reports readiness.
    fn is_configured(&self, _config: &ZenviaConfig) -> bool {
        false
    }
}

/// Ordered driver collection with first-match-wins dispatch.
pub struct DriverRegistry {
    drivers: Vec<Box<dyn Driver>>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            drivers: Vec::new(),
        }
    }

    /// Registry with the standard driver order: text, audio, file,
    /// location, contact, photo, video.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(TextDriver);
        registry.register(AudioDriver);
        registry.register(FileDriver);
        registry.register(LocationDriver);
        registry.register(ContactDriver);
        registry.register(PhotoDriver);
        registry.register(VideoDriver);
        registry
    }

    /// Append a driver to the match order.
    pub fn register<D: Driver + 'static>(&mut self, driver: D) {
        info!(driver = driver.name(), "registering webhook driver");
        self.drivers.push(Box::new(driver));
    }

    /// Names of the registered drivers, in match order.
    pub fn driver_names(&self) -> Vec<&'static str> {
        self.drivers.iter().map(|driver| driver.name()).collect()
    }

    /// Offer an envelope to the drivers in order; the first claimant
    /// builds the messages.
    ///
    /// Dispatch has no side effects of its own, so offering the same
    /// envelope twice yields identical messages.
    pub async fn dispatch(
        &self,
        envelope: &WebhookEnvelope,
        resolver: &AttachmentResolver,
    ) -> Result<Vec<IncomingMessage>> {
        let Some(event) = envelope.message.as_ref() else {
            warn!("webhook envelope carries no message event");
            return Err(ZenviaError::NoDriverMatched);
        };

        for driver in &self.drivers {
            if driver.matches_request(envelope, event) {
                debug!(driver = driver.name(), "webhook event claimed");
                return driver.messages(event, resolver).await;
            }
        }

        warn!(
            notification_type = envelope.notification_type.as_deref().unwrap_or(""),
            "no driver matched the webhook event"
        );
        Err(ZenviaError::NoDriverMatched)
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The channel adapter a host application holds.
///
/// Ties configuration, HTTP transport, the driver chain, the attachment
/// resolver, and the delivery engine together behind the handful of
/// calls a bot host makes: decode a webhook, normalize it, build a
/// reply payload, send it.
///
/// # Example
///
/// ```ignore
/// use zenvia_whatsapp::{ZenviaConfig, ZenviaDriver};
///
/// let driver = ZenviaDriver::new(ZenviaConfig::new("api-token"));
/// let envelope = driver.decode_webhook(raw_body)?;
/// let messages = driver.incoming(&envelope).await?;
/// ```
pub struct ZenviaDriver {
    config: Arc<ZenviaConfig>,
    registry: DriverRegistry,
    resolver: AttachmentResolver,
    engine: DeliveryEngine,
}

impl ZenviaDriver {
    /// Create a driver with the default HTTP transport.
    pub fn new(config: ZenviaConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    /// Create a driver with just an API token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(ZenviaConfig::new(token))
    }

    /// Create a driver over an injected HTTP transport.
    pub fn with_http_client(config: ZenviaConfig, http: Arc<dyn HttpClient>) -> Self {
        let config = Arc::new(config);
        let resolver = AttachmentResolver::new(Arc::clone(&config), Arc::clone(&http));
        let engine = DeliveryEngine::new(Arc::clone(&config), http);
        Self {
            config,
            registry: DriverRegistry::standard(),
            resolver,
            engine,
        }
    }

    /// Replace the sleeper used between delivery attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.engine = self.engine.with_sleeper(sleeper);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &ZenviaConfig {
        &self.config
    }

    /// Whether the channel holds the credentials outbound calls need.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Match order of the registered webhook drivers.
    pub fn driver_names(&self) -> Vec<&'static str> {
        self.registry.driver_names()
    }

    /// Decode a raw webhook body into an envelope.
    pub fn decode_webhook(&self, body: &str) -> Result<WebhookEnvelope> {
        WebhookEnvelope::decode(body)
    }

    /// Normalize an envelope through the driver chain.
    pub async fn incoming(&self, envelope: &WebhookEnvelope) -> Result<Vec<IncomingMessage>> {
        self.registry.dispatch(envelope, &self.resolver).await
    }

    /// Build the wire payload answering `matching`, without sending it.
    pub fn build_payload(
        &self,
        outgoing: &Outgoing,
        matching: &IncomingMessage,
        extra: Value,
    ) -> Value {
        outbound::build_payload(&self.config, outgoing, matching, extra)
    }

    /// POST a built payload to the messages endpoint.
    ///
    /// With `throw_http_exceptions` set, delivery goes through the
    /// retry engine and failures surface as [`ZenviaError::Delivery`];
    /// without it the raw response is returned unclassified.
    pub async fn send_payload(
        &self,
        payload: &Value,
        cancel: Option<&CancellationToken>,
    ) -> Result<HttpResponse> {
        let url = self.config.api_url("messages");
        if self.config.throw_http_exceptions {
            self.engine.send(&url, &[], payload, true, cancel).await
        } else {
            self.engine.post_once(&url, &[], payload, true).await
        }
    }

    /// Low-level escape hatch: POST arbitrary parameters to an API
    /// endpoint, addressed at the conversation of `matching`.
    pub async fn send_request(
        &self,
        endpoint: &str,
        params: Value,
        matching: &IncomingMessage,
        cancel: Option<&CancellationToken>,
    ) -> Result<HttpResponse> {
        let mut merged = json!({ "chat_id": matching.recipient });
        outbound::deep_merge(&mut merged, params);

        let url = self.config.api_url(endpoint);
        if self.config.throw_http_exceptions {
            self.engine.send(&url, &[], &merged, false, cancel).await
        } else {
            self.engine.post_once(&url, &[], &merged, false).await
        }
    }

    /// Answer view of a normalized message, as conversations consume it.
    pub fn conversation_answer(&self, message: &IncomingMessage) -> Answer {
        Answer {
            text: message.text.clone(),
            message: message.clone(),
        }
    }

    /// User record for the sender of a normalized message.
    pub fn user(&self, message: &IncomingMessage) -> User {
        User::new(&message.sender)
    }
}
