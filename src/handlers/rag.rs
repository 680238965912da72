//! `POST /api/v1/rag`.

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::handlers::engine::RetrievalEngine;
use crate::handlers::{decode_body, non_empty_str};
use crate::http::response::error_response;
use crate::routing::{Handler, HandlerError, HandlerFuture, HandlerRequest};

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchRequest {
    query: Option<Value>,
    top_k: Option<usize>,
}

pub struct RagHandler {
    engine: Arc<dyn RetrievalEngine>,
}

impl RagHandler {
    pub fn new(engine: Arc<dyn RetrievalEngine>) -> Self {
        Self { engine }
    }
}

impl Handler for RagHandler {
    fn call(&self, request: HandlerRequest) -> HandlerFuture {
        let engine = Arc::clone(&self.engine);
        Box::pin(async move { search(engine.as_ref(), request.body).await })
    }
}

async fn search(engine: &dyn RetrievalEngine, body: Value) -> Result<Response, HandlerError> {
    let start = Instant::now();

    let request: SearchRequest = match decode_body(body) {
        Ok(request) => request,
        Err(rejection) => return Ok(rejection),
    };
    let Some(query) = non_empty_str(request.query.as_ref()).map(str::to_string) else {
        return Ok(error_response(StatusCode::BAD_REQUEST, "Missing or invalid query"));
    };
    let top_k = request.top_k.filter(|k| *k > 0).unwrap_or(DEFAULT_TOP_K);

    let mut results = engine.search(query.clone(), top_k).await?;
    results.truncate(top_k);

    Ok(Json(json!({
        "results": results,
        "query": query,
        "top_k": top_k,
        "latency_ms": start.elapsed().as_millis() as u64,
    }))
    .into_response())
}
