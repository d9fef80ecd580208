//! Error types for the Zenvia WhatsApp channel

use thiserror::Error;

/// Channel error types
#[derive(Error, Debug)]
pub enum ZenviaError {
    /// No registered driver recognized the webhook event.
    #[error("no driver matched the webhook event")]
    NoDriverMatched,

    /// The file lookup endpoint rejected an attachment resolution request.
    #[error("error retrieving file url: {0}")]
    AttachmentFetch(String),

    /// Delivery gave up after exhausting its retry budget.
    #[error(transparent)]
    Delivery(Box<DeliveryError>),

    /// Delivery was cancelled while waiting to retry.
    #[error("delivery cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Diagnostic snapshot of a failed delivery attempt.
///
/// Carries the pieces of the final rejected response alongside the request
/// that produced it. Every field is already redacted: the literal API token
/// never appears in the error text.
#[derive(Error, Debug)]
#[error("{diagnostic}")]
pub struct DeliveryError {
    /// HTTP status of the final attempt.
    pub status: u16,
    /// Provider description, or `"No description"` when absent.
    pub description: String,
    /// Provider error code, or `"No error code"` when absent.
    pub error_code: String,
    /// Provider parameter details, or `"No parameters"` when absent.
    pub parameters: String,
    /// Request URL the delivery was posted to.
    pub url: String,
    /// Full multi-line report of the request and response.
    pub diagnostic: String,
}

impl DeliveryError {
    /// Whether the final response looked transient (rate limit or server
    /// fault) rather than a permanent rejection of the payload.
    pub fn is_retryable(&self) -> bool {
        self.status == 429 || (500..600).contains(&self.status)
    }
}

/// Result type alias for channel operations
pub type Result<T> = std::result::Result<T, ZenviaError>;
