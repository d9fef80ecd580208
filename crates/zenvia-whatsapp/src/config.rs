//! Configuration for the Zenvia WhatsApp channel

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Production base URL of the Zenvia WhatsApp channel API.
pub const ZENVIA_API_BASE: &str = "https://api.zenvia.com/v2/channels/whatsapp";

/// Zenvia WhatsApp channel configuration
///
/// Only `token` is required. Retrying is opt-in: with
/// `retry_http_exceptions` at zero a failed delivery is reported
/// immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZenviaConfig {
    /// API token sent as the `X-API-TOKEN` header on outbound calls
    pub token: String,
    /// Base URL for the message API
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Base URL that resolved media download paths are joined onto
    #[serde(default = "default_file_base")]
    pub file_base: String,
    /// Surface delivery failures as errors instead of raw responses
    #[serde(default)]
    pub throw_http_exceptions: bool,
    /// Retry budget for failed deliveries (0 disables retrying)
    #[serde(default)]
    pub retry_http_exceptions: u32,
    /// Linear backoff multiplier, in seconds per attempt (default: 2)
    #[serde(default = "default_retry_multiplier")]
    pub retry_http_exceptions_multiplier: f64,
    /// Parameters merged into every outbound payload
    #[serde(default = "default_additional_params")]
    pub default_additional_parameters: Value,
}

fn default_api_base() -> String {
    ZENVIA_API_BASE.to_string()
}

fn default_file_base() -> String {
    ZENVIA_API_BASE.to_string()
}

fn default_retry_multiplier() -> f64 {
    2.0
}

fn default_additional_params() -> Value {
    Value::Object(serde_json::Map::new())
}

impl ZenviaConfig {
    /// Create a new config with just the API token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: default_api_base(),
            file_base: default_file_base(),
            throw_http_exceptions: false,
            retry_http_exceptions: 0,
            retry_http_exceptions_multiplier: default_retry_multiplier(),
            default_additional_parameters: default_additional_params(),
        }
    }

    /// Point the message API at a different base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Point media downloads at a different base URL
    pub fn with_file_base(mut self, file_base: impl Into<String>) -> Self {
        self.file_base = file_base.into();
        self
    }

    /// Surface delivery failures as errors instead of raw responses
    pub fn with_throw_http_exceptions(mut self, throw: bool) -> Self {
        self.throw_http_exceptions = throw;
        self
    }

    /// Set the retry budget for failed deliveries
    pub fn with_retry_http_exceptions(mut self, retries: u32) -> Self {
        self.retry_http_exceptions = retries;
        self
    }

    /// Set the linear backoff multiplier (seconds per attempt)
    pub fn with_retry_multiplier(mut self, multiplier: f64) -> Self {
        self.retry_http_exceptions_multiplier = multiplier;
        self
    }

    /// Set parameters merged into every outbound payload
    pub fn with_default_additional_parameters(mut self, parameters: Value) -> Self {
        self.default_additional_parameters = parameters;
        self
    }

    /// Whether the channel has a usable API token
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty()
    }

    /// API URL for the given endpoint, e.g. `messages` or `getFile`
    pub fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_base, endpoint)
    }

    /// Download URL for a resolved media path
    pub fn file_url(&self, file_path: &str) -> String {
        format!("{}/{}", self.file_base, file_path)
    }
}
