//! `POST /api/v1/inference`.

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::handlers::engine::{InferenceEngine, InferenceOptions};
use crate::handlers::{decode_body, non_empty_str};
use crate::http::response::error_response;
use crate::routing::{Handler, HandlerError, HandlerFuture, HandlerRequest};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InferenceRequest {
    prompt: Option<Value>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    top_p: Option<f32>,
    top_k: Option<u32>,
}

impl InferenceRequest {
    fn options(&self) -> InferenceOptions {
        let defaults = InferenceOptions::default();
        InferenceOptions {
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            top_p: self.top_p.unwrap_or(defaults.top_p),
            top_k: self.top_k.unwrap_or(defaults.top_k),
        }
    }
}

pub struct InferenceHandler {
    engine: Arc<dyn InferenceEngine>,
}

impl InferenceHandler {
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        Self { engine }
    }
}

impl Handler for InferenceHandler {
    fn call(&self, request: HandlerRequest) -> HandlerFuture {
        let engine = Arc::clone(&self.engine);
        Box::pin(async move { infer(engine.as_ref(), request.body).await })
    }
}

async fn infer(engine: &dyn InferenceEngine, body: Value) -> Result<Response, HandlerError> {
    let start = Instant::now();

    let request: InferenceRequest = match decode_body(body) {
        Ok(request) => request,
        Err(rejection) => return Ok(rejection),
    };
    let Some(prompt) = non_empty_str(request.prompt.as_ref()).map(str::to_string) else {
        return Ok(error_response(StatusCode::BAD_REQUEST, "Missing or invalid prompt"));
    };

    let options = request.options();
    tracing::debug!(max_tokens = options.max_tokens, "Running inference");
    let output = engine.infer(prompt, options).await?;

    Ok(Json(json!({
        "text": output.text,
        "tokens": output.tokens,
        "latency_ms": start.elapsed().as_millis() as u64,
        "confidence": output.confidence,
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::engine::{EngineError, InferenceOutput, UnavailableEngine};
    use crate::handlers::tests::{read_json, request};
    use futures_util::future::BoxFuture;
    use std::sync::Mutex;

    /// Echoes the prompt and remembers the options it was given.
    #[derive(Default)]
    struct EchoEngine {
        seen: Mutex<Option<InferenceOptions>>,
    }

    impl InferenceEngine for EchoEngine {
        fn infer(
            &self,
            prompt: String,
            options: InferenceOptions,
        ) -> BoxFuture<'_, Result<InferenceOutput, EngineError>> {
            *self.seen.lock().unwrap() = Some(options);
            Box::pin(async move {
                Ok(InferenceOutput {
                    text: format!("echo: {prompt}"),
                    tokens: 2,
                    confidence: 0.5,
                })
            })
        }
    }

    #[tokio::test]
    async fn test_inference_applies_defaults() {
        let engine = Arc::new(EchoEngine::default());
        let handler = InferenceHandler::new(engine.clone());

        let res = handler.call(request(json!({"prompt": "hello"}))).await.unwrap();
        let (status, body) = read_json(res).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "echo: hello");
        assert_eq!(body["tokens"], 2);
        assert!(body["latency_ms"].is_u64());
        assert_eq!(*engine.seen.lock().unwrap(), Some(InferenceOptions::default()));
    }

    #[tokio::test]
    async fn test_inference_passes_overrides() {
        let engine = Arc::new(EchoEngine::default());
        let handler = InferenceHandler::new(engine.clone());

        handler
            .call(request(json!({"prompt": "hi", "max_tokens": 16, "top_k": 3})))
            .await
            .unwrap();
        let seen = engine.seen.lock().unwrap().unwrap();
        assert_eq!(seen.max_tokens, 16);
        assert_eq!(seen.top_k, 3);
        assert_eq!(seen.top_p, 0.9);
    }

    #[tokio::test]
    async fn test_missing_prompt_is_bad_request() {
        let handler = InferenceHandler::new(Arc::new(EchoEngine::default()));
        for body in [json!({}), json!({"prompt": ""}), json!({"prompt": 7})] {
            let res = handler.call(request(body)).await.unwrap();
            let (status, body) = read_json(res).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Missing or invalid prompt");
        }
    }

    #[tokio::test]
    async fn test_mistyped_option_names_the_field() {
        let engine = Arc::new(EchoEngine::default());
        let handler = InferenceHandler::new(engine.clone());

        let res = handler
            .call(request(json!({"prompt": "hi", "max_tokens": "x"})))
            .await
            .unwrap();
        let (status, body) = read_json(res).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("Invalid request body:"), "{message}");
        assert!(engine.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_engine_is_handler_error() {
        let handler = InferenceHandler::new(Arc::new(UnavailableEngine));
        let err = handler.call(request(json!({"prompt": "hi"}))).await.unwrap_err();
        assert_eq!(err.0, "inference engine is not available");
    }
}
