//! HTTP transport seam for the Zenvia API
//!
//! All outbound traffic goes through the [`HttpClient`] trait so that
//! delivery and attachment resolution can be driven against scripted
//! responses in tests. [`ReqwestHttpClient`] is the production
//! implementation; [`MockHttpClient`] replays queued responses and
//! records every request it sees.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::Result;

/// Default timeout for Zenvia API calls (seconds)
const API_TIMEOUT_SECS: u64 = 30;

/// Minimal view of an HTTP response: status code plus raw body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the response carries the 200 status the API uses for success.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Decode the body as JSON, yielding `Value::Null` for invalid JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

/// Abstraction over the two calls the channel makes: posting payloads
/// and fetching file metadata.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POST `body` to `url`. With `as_json` the body is sent as a JSON
    /// document, otherwise as form fields.
    async fn post(
        &self,
        url: &str,
        url_params: &[(String, String)],
        body: &Value,
        headers: &[(String, String)],
        as_json: bool,
    ) -> Result<HttpResponse>;

    /// GET `url` with the given query parameters.
    async fn get(&self, url: &str, url_params: &[(String, String)]) -> Result<HttpResponse>;
}

/// Production HTTP client backed by `reqwest`
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post(
        &self,
        url: &str,
        url_params: &[(String, String)],
        body: &Value,
        headers: &[(String, String)],
        as_json: bool,
    ) -> Result<HttpResponse> {
        let mut request = self
            .client
            .post(url)
            .timeout(Duration::from_secs(API_TIMEOUT_SECS));
        if !url_params.is_empty() {
            request = request.query(url_params);
        }
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = if as_json {
            request.json(body)
        } else {
            request.form(&form_fields(body))
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }

    async fn get(&self, url: &str, url_params: &[(String, String)]) -> Result<HttpResponse> {
        let mut request = self
            .client
            .get(url)
            .timeout(Duration::from_secs(API_TIMEOUT_SECS));
        if !url_params.is_empty() {
            request = request.query(url_params);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// Flatten a JSON object into form fields. Strings are rendered bare,
/// nulls as empty strings, everything else as its JSON text.
fn form_fields(body: &Value) -> Vec<(String, String)> {
    let Some(map) = body.as_object() else {
        return Vec::new();
    };
    map.iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}

/// Method of a request captured by [`MockHttpClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A request captured by [`MockHttpClient`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub url_params: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub as_json: bool,
}

/// Scripted HTTP client driven by queued responses.
///
/// Responses are replayed in push order; once the queue is empty every
/// further call answers `200 {"ok":true}`.
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    script: Arc<Mutex<VecDeque<HttpResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_responses(responses: Vec<HttpResponse>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::default(),
        }
    }

    pub async fn push_response(&self, response: HttpResponse) {
        self.script.lock().await.push_back(response);
    }

    /// Every request seen so far, in call order.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_response(&self) -> HttpResponse {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| HttpResponse::new(200, r#"{"ok":true}"#))
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post(
        &self,
        url: &str,
        url_params: &[(String, String)],
        body: &Value,
        headers: &[(String, String)],
        as_json: bool,
    ) -> Result<HttpResponse> {
        self.requests.lock().await.push(RecordedRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            url_params: url_params.to_vec(),
            body: Some(body.clone()),
            headers: headers.to_vec(),
            as_json,
        });
        Ok(self.next_response().await)
    }

    async fn get(&self, url: &str, url_params: &[(String, String)]) -> Result<HttpResponse> {
        self.requests.lock().await.push(RecordedRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            url_params: url_params.to_vec(),
            body: None,
            headers: Vec::new(),
            as_json: false,
        });
        Ok(self.next_response().await)
    }
}
