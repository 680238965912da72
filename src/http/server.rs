//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router around a single gateway handler
//! - Wire up middleware (tracing, request ID, limits, timeout, headers)
//! - Serve over TLS only, with graceful shutdown
//! - Run every request through authentication, then routing
//! - Observability (metrics, request logging)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::Response,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::AuthenticationPipeline;
use crate::config::GatewayConfig;
use crate::http::response::error_response;
use crate::lifecycle::Gateway;
use crate::observability::metrics;
use crate::routing::{RequestRouter, Routed};
use crate::security::headers::{allowed_browser_origin, apply_cors, preflight_response};
use crate::security::OriginMatcher;

/// Application state injected into the gateway handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AuthenticationPipeline>,
    pub matcher: Arc<OriginMatcher>,
    pub router: Arc<RequestRouter>,
    pub disclose_rejection_reason: bool,
}

/// HTTPS server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server over the given trust boundary and routes.
    pub fn new(config: GatewayConfig, gateway: &Gateway, routes: RequestRouter) -> Self {
        tracing::info!(routes = ?routes.describe(), "Route table ready");

        let state = AppState {
            pipeline: Arc::clone(&gateway.pipeline),
            matcher: Arc::clone(&gateway.matcher),
            router: Arc::new(routes),
            disclose_rejection_reason: config.security.disclose_rejection_reason,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .fallback(gateway_handler)
            .with_state(state)
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            ))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve HTTPS until the shutdown signal fires, then drain in-flight
    /// requests for at most the request timeout.
    pub async fn run(
        self,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .listener
            .bind_address
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let handle = Handle::new();
        let drain = Duration::from_secs(self.config.timeouts.request_secs);
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!(drain_secs = drain.as_secs(), "HTTP server draining");
            shutdown_handle.graceful_shutdown(Some(drain));
        });

        tracing::info!(address = %addr, "HTTPS server starting");

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Single entry point for every request.
/// Authenticates, then hands the request to the route table.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // Preflights carry no credentials; they get CORS headers or nothing.
    if method == Method::OPTIONS {
        let response = preflight_response(
            request.headers(),
            &state.matcher,
            &state.pipeline.policy().origin_header,
        );
        metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
        return response;
    }

    // 1. Trust boundary
    let auth = match state.pipeline.authenticate(request.headers()) {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                reason = e.reason(),
                "Request rejected"
            );
            metrics::record_auth_rejection(e.reason());
            let mut response = e.to_response(state.disclose_rejection_reason);
            if let Some(origin) = allowed_browser_origin(request.headers(), &state.matcher) {
                apply_cors(response.headers_mut(), &origin);
            }
            metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
            return response;
        }
    };

    // 2. Route
    let origin = auth.origin.clone();
    let mut response = match state.router.route(request, auth).await {
        Routed::Handled(response) => response,
        Routed::Unmatched => {
            error_response(StatusCode::NOT_FOUND, format!("Route not found: {path}"))
        }
    };

    // 3. Scope CORS to the authenticated origin
    apply_cors(response.headers_mut(), &origin);

    let status = response.status();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        origin = %origin,
        status = status.as_u16(),
        duration_ms = start_time.elapsed().as_millis() as u64,
        "Request completed"
    );
    metrics::record_request(method.as_str(), status.as_u16(), start_time);

    response
}
