//! Zenvia WhatsApp - messaging channel adapter
//!
//! This crate connects a bot host to the Zenvia WhatsApp API: it decodes
//! inbound webhook notifications into normalized messages and builds and
//! delivers outbound replies.
//!
//! # Architecture
//!
//! - Inbound: a raw webhook body decodes into a [`WebhookEnvelope`]; an
//!   ordered chain of drivers (text first, then audio, file, location,
//!   contact, photo, video) claims the event and produces
//!   [`IncomingMessage`] values, resolving media file references to
//!   download URLs along the way.
//! - Outbound: an [`Outgoing`] reply plus the inbound message it answers
//!   become a JSON payload (text, quick-reply buttons, list picker,
//!   file, or location content); the delivery engine POSTs it with
//!   bounded retry, server-directed backoff, and token-redacted
//!   failure diagnostics.
//!
//! [`ZenviaDriver`] ties the pieces together behind the calls a host
//! makes; every seam (HTTP transport, backoff sleep) is a trait, so the
//! whole flow is testable without a network.

pub mod attachment;
pub mod config;
pub mod delivery;
pub mod driver;
pub mod error;
pub mod http;
pub mod message;
pub mod outbound;
pub mod webhook;

// Re-export commonly used types
pub use attachment::{AttachmentResolver, ResolvedAttachment};
pub use config::{ZENVIA_API_BASE, ZenviaConfig};
pub use delivery::{DeliveryEngine, MockSleeper, Sleeper, TokioSleeper};
pub use driver::{
    AudioDriver, ContactDriver, Driver, DriverRegistry, FileDriver, LocationDriver, PhotoDriver,
    TextDriver, VideoDriver, ZenviaDriver,
};
pub use error::{DeliveryError, Result, ZenviaError};
pub use http::{HttpClient, HttpResponse, MockHttpClient, ReqwestHttpClient};
pub use message::{
    Answer, Attachment, Audio, Button, Contact, FileAttachment, Image, IncomingMessage, Location,
    Outgoing, OutgoingMessage, Question, User, Video,
};
pub use outbound::build_payload;
pub use webhook::{
    ContactPayload, ContentItem, LocationPayload, MessageEvent, Peer, WebhookEnvelope,
};
