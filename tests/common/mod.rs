//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use origin_gate::config::GatewayConfig;
use origin_gate::handlers::{default_routes, Engines};
use origin_gate::http::HttpServer;
use origin_gate::lifecycle::Gateway;
use origin_gate::routing::RequestRouter;
use origin_gate::session::MockClock;

pub const ORIGIN: &str = "https://localhost:5173";
pub const EVIL_ORIGIN: &str = "https://evil.example";

/// A gateway wired to a controllable clock, served without a socket.
pub struct TestGateway {
    pub gateway: Gateway,
    pub clock: MockClock,
    pub app: Router,
}

impl TestGateway {
    /// Default config, default feature routes.
    pub fn new() -> Self {
        Self::with_config(GatewayConfig::default())
    }

    pub fn with_config(config: GatewayConfig) -> Self {
        let routes = default_routes(&Engines::default(), config.security.max_body_size);
        Self::with_routes(config, routes)
    }

    pub fn with_routes(config: GatewayConfig, routes: RequestRouter) -> Self {
        let clock = MockClock::new();
        let gateway = Gateway::new(&config, Arc::new(clock.clone()));
        let app = HttpServer::new(config, &gateway, routes).router();
        Self { gateway, clock, app }
    }

    /// Issue a token the way the host shell would.
    pub fn token_for(&self, origin: Option<&str>) -> String {
        self.gateway.issuer.issue(origin).unwrap().into_string()
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let res = self.app.clone().oneshot(request).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, headers, body }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn request(method: &str, path: &str, headers: &[(&str, &str)], body: &str) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(path: &str, headers: &[(&str, &str)]) -> Request<Body> {
    request("GET", path, headers, "")
}

pub fn post(path: &str, headers: &[(&str, &str)], body: &str) -> Request<Body> {
    request("POST", path, headers, body)
}
