//! LINE push delivery against a mocked Messaging API.

use alerter::{LineAlerter, NotificationSink, deliver};
use configuration::LineConfig;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> LineConfig {
    LineConfig {
        endpoint: format!("{}/v2/bot/message/push", server.uri()),
        channel_token: "secret-token".to_string(),
        user_id: "U42".to_string(),
    }
}

#[tokio::test]
async fn pushes_text_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/bot/message/push"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_partial_json(serde_json::json!({
            "to": "U42",
            "messages": [{ "type": "text", "text": "📅 radar" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let alerter = LineAlerter::new(&config(&server)).unwrap();
    alerter.send("📅 radar").await.unwrap();
}

#[tokio::test]
async fn oversized_report_spans_several_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    // Six full-size chunks: five in the first request, one in the second.
    let line = format!("{}\n", "x".repeat(4999));
    let report = line.repeat(6);

    let alerter = LineAlerter::new(&config(&server)).unwrap();
    alerter.send(&report).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let first: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(first["messages"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn api_errors_are_reported_but_not_raised_by_deliver() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"message":"Authentication failed"}"#))
        .mount(&server)
        .await;

    let alerter = LineAlerter::new(&config(&server)).unwrap();
    let err = alerter.send("hello").await.unwrap_err();
    assert!(err.to_string().contains("401"));

    assert!(!deliver(&alerter, "hello").await);
}
