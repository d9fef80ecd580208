//! Integration tests for outbound delivery over the real transport
//!
//! These run the reqwest-backed client against a local wiremock server,
//! so header handling, JSON vs form encoding, and the retry flow are
//! exercised end to end.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zenvia_whatsapp::{
    FileAttachment, IncomingMessage, MessageEvent, MockSleeper, Outgoing, ZenviaConfig,
    ZenviaDriver, ZenviaError,
};

fn config_for(server: &MockServer) -> ZenviaConfig {
    ZenviaConfig::new("secret")
        .with_api_base(server.uri())
        .with_file_base("http://files.local")
}

fn reply_target() -> IncomingMessage {
    IncomingMessage::new("ping", "5511999999999", "zenvia-bot", MessageEvent::default())
}

#[tokio::test]
async fn posts_json_payload_with_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("X-API-TOKEN", "secret"))
        .and(body_json(json!({
            "from": "zenvia-bot",
            "to": "5511999999999",
            "contents": [{"type": "text", "text": "pong"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let driver = ZenviaDriver::new(config_for(&server));
    let payload = driver.build_payload(&Outgoing::from("pong"), &reply_target(), json!({}));
    let response = driver.send_payload(&payload, None).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.json()["ok"], json!(true));
}

#[tokio::test]
async fn sends_low_level_requests_form_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/typing"))
        .and(header("X-API-TOKEN", "secret"))
        .and(body_string("action=start&chat_id=zenvia-bot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let driver = ZenviaDriver::new(config_for(&server));
    let response = driver
        .send_request("typing", json!({"action": "start"}), &reply_target(), None)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn resolves_file_references_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getFile"))
        .and(query_param("file_id", "doc-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true, "result": {"file_path": "media/report.pdf"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let driver = ZenviaDriver::new(config_for(&server));
    let body = json!({
        "type": "MESSAGE",
        "direction": "IN",
        "message": {
            "from": {"id": "user-1"},
            "chat": {"id": "chat-1"},
            "document": {"file_id": "doc-1", "file_name": "report.pdf"}
        }
    })
    .to_string();

    let envelope = driver.decode_webhook(&body).unwrap();
    let messages = driver.incoming(&envelope).await.unwrap();

    assert_eq!(messages[0].text, FileAttachment::PATTERN);
    assert_eq!(messages[0].files[0].url, "http://files.local/media/report.pdf");
}

#[tokio::test]
async fn retries_until_the_server_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"description": "try later"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let sleeper = MockSleeper::new();
    let config = config_for(&server)
        .with_throw_http_exceptions(true)
        .with_retry_http_exceptions(2);
    let driver = ZenviaDriver::new(config).with_sleeper(Arc::new(sleeper.clone()));

    let payload = driver.build_payload(&Outgoing::from("pong"), &reply_target(), json!({}));
    let response = driver.send_payload(&payload, None).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(sleeper.slept().await, vec![Duration::from_secs(2)]);
}

#[tokio::test]
async fn failed_delivery_surfaces_redacted_diagnostic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"description": "token secret rejected", "error_code": 403})),
        )
        .mount(&server)
        .await;

    let config = config_for(&server).with_throw_http_exceptions(true);
    let driver = ZenviaDriver::new(config);

    let payload = driver.build_payload(&Outgoing::from("pong"), &reply_target(), json!({}));
    let err = driver.send_payload(&payload, None).await.unwrap_err();

    let ZenviaError::Delivery(delivery) = err else {
        panic!("expected delivery error");
    };
    assert_eq!(delivery.status, 403);
    assert!(!delivery.diagnostic.contains("secret"));
    assert!(delivery.diagnostic.contains("ZENVIA-WHATSAPP-TOKEN-HIDDEN"));
    assert!(delivery.diagnostic.contains("Status Code: 403"));
}
