//! Test utilities for integration tests
#![allow(dead_code)]
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use triage::api::AppState;
use triage::api::app;
use triage::core::{AppConfig, GeneratorKind};
use triage::email::Corpus;
use triage::responder::{SharedGenerator, TemplateGenerator};

/// Config that does not depend on the environment of the test runner.
pub fn test_config() -> AppConfig {
    AppConfig {
        corpus_path: None,
        recency_window: Duration::from_secs(24 * 60 * 60),
        generation_timeout: Duration::from_secs(5),
        generator: GeneratorKind::Template,
        template_delay: Duration::ZERO,
        openai_api_hostname: String::from("http://localhost:1"),
        openai_api_key: String::from("test-api-key"),
        openai_model: String::from("gpt-4"),
    }
}

/// Creates a test application router over the sample inbox with an
/// instant template generator.
pub fn test_app() -> Router {
    test_app_with(Arc::new(TemplateGenerator::new(Duration::ZERO)))
}

/// Creates a test application router that drafts with `generator`.
pub fn test_app_with(generator: SharedGenerator) -> Router {
    let app_state = AppState::new(Corpus::seed(), generator, test_config());
    app(Arc::new(app_state))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Send `method` to `uri` with an optional JSON body and decode the JSON
/// response. Non JSON bodies come back as a string value.
pub async fn send(app: &Router, method: &str, uri: &str, json: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().uri(uri).method(method);
    let request = match json {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = body_to_string(response.into_body()).await;
    let value = serde_json::from_str(&body).unwrap_or(Value::String(body));
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

/// Poll the generation status for `id` until it leaves `pending`.
pub async fn wait_for_generation(app: &Router, id: &str) -> Value {
    let uri = format!("/api/emails/{}/generate", id);
    for _ in 0..200 {
        let (status, body) = get(app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        if body["status"] != "pending" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("generation for email {} never finished", id);
}
