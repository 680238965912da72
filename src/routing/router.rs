//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store the ordered route table
//! - Look up the first route matching method and path
//! - Buffer and parse JSON bodies for POST/PUT before a handler runs
//! - Turn handler errors and panics into 500 responses
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in registration order (acceptable for typical route counts)
//! - Explicit `Routed::Unmatched` rather than a silent default

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::Value;

use crate::auth::AuthContext;
use crate::http::response::error_response;
use crate::routing::matcher::{AndMatcher, Matcher, MethodMatcher, PathMatcher};

/// What a handler receives: the request head, the parsed body and the
/// authenticated origin.
///
/// `body` is the parsed JSON for POST/PUT (`{}` when the body was empty) and
/// `Value::Null` for every other method.
#[derive(Debug)]
pub struct HandlerRequest {
    pub parts: Parts,
    pub body: Value,
    pub auth: AuthContext,
}

/// A handler failure. Surfaced to the caller as a 500 carrying the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type HandlerFuture = BoxFuture<'static, Result<Response, HandlerError>>;

/// A feature endpoint behind the trust boundary.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: HandlerRequest) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(HandlerRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
{
    fn call(&self, request: HandlerRequest) -> HandlerFuture {
        Box::pin(self(request))
    }
}

/// Outcome of routing one request.
pub enum Routed {
    /// A route matched; this is its response (possibly a 400 or 500).
    Handled(Response),
    /// No route matched. The caller decides what a miss looks like.
    Unmatched,
}

impl Routed {
    pub fn is_handled(&self) -> bool {
        matches!(self, Routed::Handled(_))
    }
}

struct Route {
    method: MethodMatcher,
    pattern: String,
    matcher: AndMatcher,
    handler: Arc<dyn Handler>,
}

/// Ordered, static table of `(method, path pattern) -> handler`.
pub struct RequestRouter {
    routes: Vec<Route>,
    max_body_bytes: usize,
}

impl RequestRouter {
    /// Create an empty router that buffers at most `max_body_bytes` per body.
    pub fn new(max_body_bytes: usize) -> Self {
        Self {
            routes: Vec::new(),
            max_body_bytes,
        }
    }

    /// Append a route. Earlier registrations win over later ones.
    pub fn register<H: Handler>(
        mut self,
        method: impl Into<MethodMatcher>,
        pattern: &str,
        handler: H,
    ) -> Self {
        let method = method.into();
        let matcher = AndMatcher::new(vec![
            Box::new(method.clone()),
            Box::new(PathMatcher::new(pattern)),
        ]);
        self.routes.push(Route {
            method,
            pattern: pattern.to_string(),
            matcher,
            handler: Arc::new(handler),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Human-readable route table, in match order.
    pub fn describe(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|r| match &r.method {
                MethodMatcher::Any => format!("* {}", r.pattern),
                MethodMatcher::Exact(m) => format!("{} {}", m, r.pattern),
            })
            .collect()
    }

    fn find(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matcher.matches(method, path))
    }

    /// Dispatch an authenticated request.
    pub async fn route(&self, request: Request<Body>, auth: AuthContext) -> Routed {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let Some(route) = self.find(&method, &path) else {
            tracing::debug!(method = %method, path = %path, "No route matched");
            return Routed::Unmatched;
        };

        let (parts, body) = request.into_parts();
        let body = if method == Method::POST || method == Method::PUT {
            match read_json(body, self.max_body_bytes).await {
                Ok(value) => value,
                Err(response) => return Routed::Handled(response),
            }
        } else {
            Value::Null
        };

        let handler = Arc::clone(&route.handler);
        let request = HandlerRequest { parts, body, auth };

        // Polling inside catch_unwind covers panics raised both before and
        // after the handler's first await.
        let outcome = AssertUnwindSafe(async move { handler.call(request).await })
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!(method = %method, path = %path, error = %e, "Handler failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, e.0)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(method = %method, path = %path, panic = %message, "Handler panicked");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        Routed::Handled(response)
    }
}

async fn read_json(body: Body, limit: usize) -> Result<Value, Response> {
    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read request body");
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
            ));
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        error_response(StatusCode::BAD_REQUEST, "Invalid JSON in request body")
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Handler panicked".to_string()
    }
}
