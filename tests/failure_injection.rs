//! Failure injection tests: misbehaving handlers and hostile bodies.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use origin_gate::config::GatewayConfig;
use origin_gate::routing::{HandlerError, HandlerRequest, RequestRouter};

mod common;
use common::{bearer, get, post, TestGateway, ORIGIN};

/// Routes that fail in every way a handler can, plus a recorder.
fn hostile_routes(calls: Arc<AtomicUsize>, max_body: usize) -> RequestRouter {
    RequestRouter::new(max_body)
        .register(Method::POST, "/record", move |req: HandlerRequest| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<Response, HandlerError>(Json(req.body).into_response()) }
        })
        .register(Method::GET, "/error", |_req: HandlerRequest| async {
            Err::<Response, _>(HandlerError::new("model crashed"))
        })
        .register(Method::GET, "/panic", |_req: HandlerRequest| async {
            if true {
                panic!("index out of range");
            }
            Ok::<Response, HandlerError>(StatusCode::OK.into_response())
        })
}

fn gateway(calls: Arc<AtomicUsize>) -> TestGateway {
    let config = GatewayConfig::default();
    let routes = hostile_routes(calls, config.security.max_body_size);
    TestGateway::with_routes(config, routes)
}

#[tokio::test]
async fn test_unauthenticated_request_never_reaches_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gw = gateway(calls.clone());

    let res = gw.send(post("/record", &[("origin", ORIGIN)], "{}")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = gw
        .send(post("/record", &[("authorization", "Bearer forged"), ("origin", ORIGIN)], "{}"))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_json_never_reaches_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gw = gateway(calls.clone());
    let auth = bearer(&gw.token_for(Some(ORIGIN)));
    let headers = [("authorization", auth.as_str()), ("origin", ORIGIN)];

    let res = gw.send(post("/record", &headers, "[1, 2")).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let res = gw.send(post("/record", &headers, "")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, serde_json::json!({}));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_oversized_body_is_refused() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut config = GatewayConfig::default();
    config.security.max_body_size = 64;
    let gw = TestGateway::with_routes(config, hostile_routes(calls.clone(), 64));
    let auth = bearer(&gw.token_for(Some(ORIGIN)));

    let body = format!("{{\"prompt\":\"{}\"}}", "x".repeat(256));
    let length = body.len().to_string();
    let res = gw
        .send(post(
            "/record",
            &[
                ("authorization", auth.as_str()),
                ("origin", ORIGIN),
                ("content-length", length.as_str()),
            ],
            &body,
        ))
        .await;

    assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_handler_error_is_500_with_message() {
    let gw = gateway(Arc::new(AtomicUsize::new(0)));
    let auth = bearer(&gw.token_for(Some(ORIGIN)));

    let res = gw
        .send(get("/error", &[("authorization", auth.as_str()), ("origin", ORIGIN)]))
        .await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["error"], "Internal Server Error");
    assert_eq!(res.message(), "model crashed");
}

#[tokio::test]
async fn test_handler_panic_does_not_take_down_the_gateway() {
    let gw = gateway(Arc::new(AtomicUsize::new(0)));
    let auth = bearer(&gw.token_for(Some(ORIGIN)));
    let headers = [("authorization", auth.as_str()), ("origin", ORIGIN)];

    let res = gw.send(get("/panic", &headers)).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.message(), "index out of range");

    // Still serving.
    let res = gw.send(post("/record", &headers, r#"{"ok":true}"#)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["ok"], true);
}

#[tokio::test]
async fn test_many_origins_concurrently() {
    let mut config = GatewayConfig::default();
    config.security.allowed_origins = vec!["https://localhost:*".to_string()];
    let gw = Arc::new(TestGateway::with_config(config));

    let mut tasks = Vec::new();
    for port in 5000..5050 {
        let gw = Arc::clone(&gw);
        tasks.push(tokio::spawn(async move {
            let origin = format!("https://localhost:{port}");
            let auth = bearer(&gw.token_for(Some(origin.as_str())));
            gw.send(get("/health", &[("authorization", auth.as_str()), ("origin", origin.as_str())]))
                .await
                .status
        }));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }
    assert_eq!(gw.gateway.sessions.len(), 50);
}
