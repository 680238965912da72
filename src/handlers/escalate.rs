//! `POST /api/v1/escalate`.
//!
//! Cloud escalation is gated on explicit user consent. The escalation
//! itself is not wired to any provider, so a consenting request gets 501.

use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;
use serde_json::Value;

use crate::handlers::{decode_body, non_empty_str};
use crate::http::response::error_response;
use crate::routing::{HandlerError, HandlerRequest};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EscalationRequest {
    prompt: Option<Value>,
    context: Option<Value>,
    user_consent: bool,
}

pub async fn escalate(request: HandlerRequest) -> Result<Response, HandlerError> {
    let body: EscalationRequest = match decode_body(request.body) {
        Ok(body) => body,
        Err(rejection) => return Ok(rejection),
    };

    if non_empty_str(body.prompt.as_ref()).is_none() {
        return Ok(error_response(StatusCode::BAD_REQUEST, "Missing or invalid prompt"));
    }

    if !body.user_consent {
        tracing::info!(origin = %request.auth.origin, "Escalation refused without user consent");
        return Ok(error_response(
            StatusCode::FORBIDDEN,
            "User consent required for cloud escalation",
        ));
    }

    tracing::info!(
        origin = %request.auth.origin,
        has_context = body.context.is_some(),
        "Escalation requested"
    );
    Ok(error_response(
        StatusCode::NOT_IMPLEMENTED,
        "Cloud escalation is not yet implemented",
    ))
}
