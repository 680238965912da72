//! CORS and security response headers.
//!
//! # Responsibilities
//! - Answer CORS preflight requests
//! - Scope `Access-Control-Allow-Origin` to the authenticated origin
//! - Let allow-listed browsers read rejection bodies
//!
//! # Design Decisions
//! - Never emit a wildcard allow-origin
//! - Preflight only names an origin that passes the allow-list
//! - Opaque origins (`file://...`) are announced as `null`, which is what
//!   browsers send for them

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;

use crate::security::origin::{normalize_origin, OriginMatcher};

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// Add CORS headers allowing `origin` to read the response.
pub fn apply_cors(headers: &mut HeaderMap, origin: &str) {
    let announced = if origin.starts_with("file:") { "null" } else { origin };
    if let Ok(value) = HeaderValue::from_str(announced) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
    }
}

/// Build the response to an `OPTIONS` preflight.
///
/// No authentication happens here; the response grants nothing unless the
/// request's `Origin` is on the allow-list.
pub fn preflight_response(
    request_headers: &HeaderMap,
    matcher: &OriginMatcher,
    origin_header: &HeaderName,
) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    let allow_headers = format!("Content-Type, Authorization, Origin, {}", origin_header.as_str());
    if let Ok(value) = HeaderValue::from_str(&allow_headers) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, value);
    }

    if let Some(origin) = allowed_browser_origin(request_headers, matcher) {
        apply_cors(headers, &origin);
    }

    response
}

/// The request's `Origin` header, normalized, if it is on the allow-list.
///
/// Used where there is no authenticated origin to scope CORS to: preflights
/// and rejections.
pub fn allowed_browser_origin(request_headers: &HeaderMap, matcher: &OriginMatcher) -> Option<String> {
    let origin = request_headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .and_then(normalize_origin)?;

    if matcher.validate(&origin) {
        Some(origin)
    } else {
        tracing::debug!(origin = %origin, "No CORS grant for disallowed origin");
        None
    }
}
