//! Feature endpoints served behind the trust boundary.
//!
//! # Routes
//! - `GET /health`
//! - `POST /api/v1/inference`
//! - `POST /api/v1/rag`
//! - `POST /api/v1/escalate`
//!
//! Every route is authenticated; there is no public path.

pub mod engine;
pub mod escalate;
pub mod health;
pub mod inference;
pub mod rag;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::response::error_response;
use crate::routing::RequestRouter;
use engine::{InferenceEngine, RetrievalEngine, UnavailableEngine};

/// The engines the feature handlers call into.
#[derive(Clone)]
pub struct Engines {
    pub inference: Arc<dyn InferenceEngine>,
    pub retrieval: Arc<dyn RetrievalEngine>,
}

impl Default for Engines {
    fn default() -> Self {
        Self {
            inference: Arc::new(UnavailableEngine),
            retrieval: Arc::new(UnavailableEngine),
        }
    }
}

/// Decode a request body. A field of the wrong type is a 400 carrying the
/// decoder's message.
pub(crate) fn decode_body<T: DeserializeOwned>(body: Value) -> Result<T, Response> {
    serde_json::from_value(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        error_response(StatusCode::BAD_REQUEST, format!("Invalid request body: {e}"))
    })
}

/// A non-empty string field, or `None` for anything else.
pub(crate) fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// The gateway's route table.
pub fn default_routes(engines: &Engines, max_body_bytes: usize) -> RequestRouter {
    RequestRouter::new(max_body_bytes)
        .register(Method::GET, "/health", health::health)
        .register(
            Method::POST,
            "/api/v1/inference",
            inference::InferenceHandler::new(Arc::clone(&engines.inference)),
        )
        .register(
            Method::POST,
            "/api/v1/rag",
            rag::RagHandler::new(Arc::clone(&engines.retrieval)),
        )
        .register(Method::POST, "/api/v1/escalate", escalate::escalate)
}
