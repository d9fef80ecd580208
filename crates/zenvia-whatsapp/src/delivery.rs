//! Outbound delivery engine
//!
//! Posts payloads to the message API and classifies the answer. A
//! delivery succeeds only when the HTTP status is 200 *and* the JSON
//! body carries `"ok": true`; anything else consumes the retry budget
//! before surfacing as a [`DeliveryError`] with a redacted diagnostic.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ZenviaConfig;
use crate::error::{DeliveryError, Result, ZenviaError};
use crate::http::{HttpClient, HttpResponse};

/// Replacement the API token is masked with in delivery diagnostics.
const TOKEN_PLACEHOLDER: &str = "ZENVIA-WHATSAPP-TOKEN-HIDDEN";

/// Injected sleep, so backoff can be observed in tests instead of slept.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested delays instead of sleeping.
#[derive(Debug, Clone, Default)]
pub struct MockSleeper {
    slept: Arc<tokio::sync::Mutex<Vec<Duration>>>,
}

impl MockSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order.
    pub async fn slept(&self) -> Vec<Duration> {
        self.slept.lock().await.clone()
    }
}

#[async_trait]
impl Sleeper for MockSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().await.push(duration);
    }
}

/// Posts payloads with bounded retry and server-directed backoff.
pub struct DeliveryEngine {
    config: Arc<ZenviaConfig>,
    http: Arc<dyn HttpClient>,
    sleeper: Arc<dyn Sleeper>,
}

impl DeliveryEngine {
    pub fn new(config: Arc<ZenviaConfig>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the sleeper used between attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        vec![
            ("X-API-TOKEN".to_string(), self.config.token.clone()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]
    }

    /// Fire a single authenticated POST without classifying the answer.
    ///
    /// This is the passthrough path: the caller receives whatever the
    /// API answered, status and all.
    pub async fn post_once(
        &self,
        url: &str,
        url_params: &[(String, String)],
        body: &Value,
        as_json: bool,
    ) -> Result<HttpResponse> {
        self.http
            .post(url, url_params, body, &self.auth_headers(), as_json)
            .await
    }

    /// Deliver `body`, retrying failures within the configured budget.
    ///
    /// On a failed response the engine waits before the next attempt: a
    /// 429 answer carrying a numeric `retry_after` dictates the wait in
    /// seconds exactly, otherwise the wait grows linearly with the
    /// attempt count (`attempt x multiplier` seconds). Cancellation is
    /// honored between attempts and while waiting.
    pub async fn send(
        &self,
        url: &str,
        url_params: &[(String, String)],
        body: &Value,
        as_json: bool,
        cancel: Option<&CancellationToken>,
    ) -> Result<HttpResponse> {
        let headers = self.auth_headers();
        let retry_budget = self.config.retry_http_exceptions;
        let mut attempt: u32 = 0;

        loop {
            if let Some(token) = cancel
                && token.is_cancelled()
            {
                return Err(ZenviaError::Cancelled);
            }

            let response = self
                .http
                .post(url, url_params, body, &headers, as_json)
                .await?;
            let data = response.json();

            if response.is_ok() && data["ok"].as_bool() == Some(true) {
                debug!(status = response.status, "delivery accepted");
                return Ok(response);
            }

            if retry_budget > 0 && attempt <= retry_budget {
                attempt += 1;
                let delay = self.retry_delay(attempt, &response, &data);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis(),
                    status = response.status,
                    "Retrying delivery after failed attempt"
                );
                self.wait(delay, cancel).await?;
                continue;
            }

            return Err(self.delivery_error(&response, &data, url, url_params, body, &headers));
        }
    }

    /// Delay before the given (1-based) retry.
    ///
    /// A 429 `retry_after` is obeyed only when a `Duration` can hold it;
    /// negative, non-finite, or oversized values fall back to the linear
    /// backoff, which itself clamps to zero rather than fail.
    fn retry_delay(&self, attempt: u32, response: &HttpResponse, data: &Value) -> Duration {
        if response.status == 429
            && let Some(seconds) = numeric_field(&data["retry_after"])
            && let Ok(delay) = Duration::try_from_secs_f64(seconds)
        {
            return delay;
        }
        Duration::try_from_secs_f64(
            f64::from(attempt) * self.config.retry_http_exceptions_multiplier,
        )
        .unwrap_or(Duration::ZERO)
    }

    async fn wait(&self, delay: Duration, cancel: Option<&CancellationToken>) -> Result<()> {
        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => Err(ZenviaError::Cancelled),
                    _ = self.sleeper.sleep(delay) => Ok(()),
                }
            }
            None => {
                self.sleeper.sleep(delay).await;
                Ok(())
            }
        }
    }

    fn delivery_error(
        &self,
        response: &HttpResponse,
        data: &Value,
        url: &str,
        url_params: &[(String, String)],
        body: &Value,
        headers: &[(String, String)],
    ) -> ZenviaError {
        let description = display_field(&data["description"], "No description");
        let error_code = display_field(&data["error_code"], "No error code");
        let parameters = display_field(&data["parameters"], "No parameters");

        let diagnostic = format!(
            "Status Code: {}\n\
             Description: {}\n\
             Error Code: {}\n\
             Parameters: {}\n\
             URL: {}\n\
             URL Parameters: {:?}\n\
             Post Parameters: {}\n\
             Headers: {:?}\n",
            response.status, description, error_code, parameters, url, url_params, body, headers
        );

        let token = &self.config.token;
        ZenviaError::Delivery(Box::new(DeliveryError {
            status: response.status,
            description: redact(&description, token),
            error_code: redact(&error_code, token),
            parameters: redact(&parameters, token),
            url: redact(url, token),
            diagnostic: redact(&diagnostic, token),
        }))
    }
}

/// Numeric field value, accepting both JSON numbers and numeric strings.
fn numeric_field(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Render a body field for diagnostics: strings bare, other values as
/// JSON text, absent values as the given fallback.
fn display_field(value: &Value, fallback: &str) -> String {
    match value {
        Value::Null => fallback.to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Mask every occurrence of the API token.
fn redact(text: &str, token: &str) -> String {
    if token.is_empty() {
        return text.to_string();
    }
    text.replace(token, TOKEN_PLACEHOLDER)
}
