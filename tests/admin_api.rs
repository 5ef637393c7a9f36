//! Admin API tests, driven through the router with `tower::ServiceExt`.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use llm_relay::config::RelayConfig;
use llm_relay::HttpServer;

mod common;

const ADMIN_KEY: &str = "test-admin-key-0123";

fn admin_config(mut config: RelayConfig) -> RelayConfig {
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.to_string();
    config
}

async fn call(router: &Router, method: Method, path: &str, key: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(key) = key {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", key));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_admin_routes_absent_when_disabled() {
    let router = HttpServer::new(RelayConfig::default()).router();
    let (status, _) = call(&router, Method::GET, "/admin/status", Some(ADMIN_KEY), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_requires_bearer_key() {
    let router = HttpServer::new(admin_config(RelayConfig::default())).router();

    let (status, _) = call(&router, Method::GET, "/admin/status", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&router, Method::GET, "/admin/status", Some("wrong"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&router, Method::GET, "/admin/status", Some(ADMIN_KEY), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "operational");
    assert_eq!(body["registry"], "static");
    assert_eq!(body["failure_threshold"], 5);
    assert_eq!(body["failure_window_secs"], 300);
}

#[tokio::test]
async fn test_backends_are_listed_masked_in_priority_order() {
    let addr: std::net::SocketAddr = "127.0.0.1:9".parse().unwrap();
    let mut low = common::backend("secondary", addr, 20);
    low.credential = Some("hf_secondary_secret_9999".into());
    let mut high = common::backend("primary", addr, 10);
    high.credential = Some("hf_primary_secret_1234".into());
    let mut off = common::backend("retired", addr, 1);
    off.enabled = false;

    let config = admin_config(common::fast_config(vec![low, high, off]));
    let router = HttpServer::new(config).router();

    let (status, body) = call(&router, Method::GET, "/admin/backends", Some(ADMIN_KEY), None).await;
    assert_eq!(status, StatusCode::OK);

    let backends = body.as_array().unwrap();
    assert_eq!(backends.len(), 2);
    assert_eq!(backends[0]["name"], "primary");
    assert_eq!(backends[0]["credential"], "hf_p...1234");
    assert_eq!(backends[0]["credential_valid"], true);
    assert_eq!(backends[0]["disabled"], false);
    assert_eq!(backends[1]["name"], "secondary");
    assert!(!body.to_string().contains("hf_primary_secret_1234"));
}

#[tokio::test]
async fn test_admin_generate_exposes_diagnostics() {
    let a = common::start_programmable_backend(|request: common::MockRequest| async move {
        if request.method == "HEAD" {
            (200, String::new())
        } else {
            (503, "overloaded".to_string())
        }
    })
    .await;
    let b = common::start_mock_backend(r#"[{"generated_text":"hello"}]"#).await;

    let mut config = admin_config(common::fast_config(vec![common::backend("A", a, 1), common::backend("B", b, 2)]));
    config.resilience.max_attempts = 2;
    let router = HttpServer::new(config).router();

    let (status, body) = call(
        &router,
        Method::POST,
        "/admin/generate",
        Some(ADMIN_KEY),
        Some(json!({ "prompt": "Hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "hello");
    assert_eq!(body["backend"], "B");

    let failed = body["failed_attempts"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["model"], "A");
    assert_eq!(failed[0]["outcome"], "http_error");
    assert_eq!(failed[0]["response"], "overloaded");

    let attempts = body["diagnostics"]["attempts"].as_array().unwrap();
    assert_eq!(attempts[0]["tries"], 2);
    assert_eq!(attempts[1]["outcome"], "success");

    let trace = body["trace"].as_str().unwrap();
    assert!(trace.contains("[1] A"));
    assert!(trace.contains("key hf_t...al_A"));
    assert!(!body.to_string().contains("hf_test_credential_A"));
}

#[tokio::test]
async fn test_admin_generate_failure_is_503_with_kind() {
    let router = HttpServer::new(admin_config(common::fast_config(Vec::new()))).router();

    let (status, body) = call(
        &router,
        Method::POST,
        "/admin/generate",
        Some(ADMIN_KEY),
        Some(json!({ "prompt": "Hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "no_backends");
    assert!(body["diagnostics"]["attempts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reproduce_masks_unless_revealed() {
    let addr: std::net::SocketAddr = "127.0.0.1:9".parse().unwrap();
    let config = admin_config(common::fast_config(vec![common::backend("A", addr, 1)]));
    let router = HttpServer::new(config).router();

    let (status, body) = call(
        &router,
        Method::POST,
        "/admin/reproduce",
        Some(ADMIN_KEY),
        Some(json!({ "backend": "A", "prompt": "it's a test" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let command = body["command"].as_str().unwrap();
    assert!(command.starts_with("curl"));
    assert!(command.contains("/models/A"));
    assert!(!command.contains("hf_test_credential_A"));

    let (_, body) = call(
        &router,
        Method::POST,
        "/admin/reproduce",
        Some(ADMIN_KEY),
        Some(json!({ "backend": "A", "prompt": "hi", "reveal": true })),
    )
    .await;
    assert!(body["command"].as_str().unwrap().contains("hf_test_credential_A"));

    let (status, _) = call(
        &router,
        Method::POST,
        "/admin/reproduce",
        Some(ADMIN_KEY),
        Some(json!({ "backend": "missing", "prompt": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
