//! `GET /health`.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::http::response::now_rfc3339;
use crate::routing::{HandlerError, HandlerRequest};

pub const SERVICE_NAME: &str = "origin-gate";

pub async fn health(_request: HandlerRequest) -> Result<Response, HandlerError> {
    Ok(Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": now_rfc3339(),
    }))
    .into_response())
}
