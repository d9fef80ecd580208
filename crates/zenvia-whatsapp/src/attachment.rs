//! Attachment resolution
//!
//! Media events reference their upload by `file_id` instead of carrying
//! a URL. The resolver exchanges that reference for a download URL via
//! the `getFile` lookup endpoint and pairs the URL with the payload it
//! came from, so handlers keep access to the provider metadata.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::ZenviaConfig;
use crate::error::{Result, ZenviaError};
use crate::http::HttpClient;

/// A resolved media reference: download URL plus the original payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAttachment {
    pub url: String,
    pub metadata: Value,
}

/// Exchanges `file_id` references for download URLs.
pub struct AttachmentResolver {
    config: Arc<ZenviaConfig>,
    http: Arc<dyn HttpClient>,
}

impl AttachmentResolver {
    pub fn new(config: Arc<ZenviaConfig>, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    /// Resolve a media payload carrying a `file_id`.
    ///
    /// Performs a single lookup call. A non-200 answer surfaces
    /// immediately as [`ZenviaError::AttachmentFetch`]; resolution is
    /// never retried.
    pub async fn resolve(&self, payload: &Value) -> Result<ResolvedAttachment> {
        let file_id = match payload.get("file_id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => String::new(),
        };
        debug!(%file_id, "resolving media file reference");

        let response = self
            .http
            .get(
                &self.config.api_url("getFile"),
                &[("file_id".to_string(), file_id)],
            )
            .await?;
        let data = response.json();

        if !response.is_ok() {
            let description = data["description"].as_str().unwrap_or_default().to_string();
            return Err(ZenviaError::AttachmentFetch(description));
        }

        let file_path = data["result"]["file_path"].as_str().unwrap_or_default();
        Ok(ResolvedAttachment {
            url: self.config.file_url(file_path),
            metadata: payload.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, HttpResponse, MockHttpClient};
    use serde_json::json;

    fn resolver(http: &MockHttpClient) -> AttachmentResolver {
        let config = ZenviaConfig::new("secret-token").with_api_base("http://localhost:9000");
        AttachmentResolver::new(Arc::new(config), Arc::new(http.clone()))
    }

    #[tokio::test]
    async fn resolves_file_id_to_download_url() {
        let http = MockHttpClient::from_responses(vec![HttpResponse::new(
            200,
            json!({"ok": true, "result": {"file_path": "media/voice-1.ogg"}}).to_string(),
        )]);
        let payload = json!({"file_id": "abc123", "duration": 4});

        let resolved = resolver(&http).resolve(&payload).await.unwrap();

        assert_eq!(
            resolved.url,
            "https://api.zenvia.com/v2/channels/whatsapp/media/voice-1.ogg"
        );
        assert_eq!(resolved.metadata, payload);

        let requests = http.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].url, "http://localhost:9000/getFile");
        assert_eq!(
            requests[0].url_params,
            vec![("file_id".to_string(), "abc123".to_string())]
        );
    }

    #[tokio::test]
    async fn lookup_failure_carries_provider_description() {
        let http = MockHttpClient::from_responses(vec![HttpResponse::new(
            404,
            json!({"ok": false, "description": "file not found"}).to_string(),
        )]);

        let err = resolver(&http)
            .resolve(&json!({"file_id": "gone"}))
            .await
            .unwrap_err();

        match err {
            ZenviaError::AttachmentFetch(description) => {
                assert_eq!(description, "file not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(http.requests().await.len(), 1, "lookup is never retried");
    }

    #[tokio::test]
    async fn lookup_failure_without_description_still_fails() {
        let http = MockHttpClient::from_responses(vec![HttpResponse::new(500, "oops")]);

        let err = resolver(&http)
            .resolve(&json!({"file_id": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ZenviaError::AttachmentFetch(d) if d.is_empty()));
    }

    #[tokio::test]
    async fn numeric_file_ids_are_rendered() {
        let http = MockHttpClient::new();
        resolver(&http).resolve(&json!({"file_id": 42})).await.unwrap();

        let requests = http.requests().await;
        assert_eq!(
            requests[0].url_params,
            vec![("file_id".to_string(), "42".to_string())]
        );
    }
}
