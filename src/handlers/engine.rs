//! Engine seams for the feature handlers.
//!
//! Model execution and document retrieval live outside the gateway. The
//! handlers only see these traits; the binary wires in whichever engines
//! are available and falls back to [`UnavailableEngine`].

use futures_util::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use crate::routing::HandlerError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{0} engine is not available")]
    Unavailable(&'static str),
    #[error("{0}")]
    Failed(String),
}

impl From<EngineError> for HandlerError {
    fn from(e: EngineError) -> Self {
        HandlerError::new(e.to_string())
    }
}

/// Sampling parameters for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InferenceOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.7,
            top_p: 0.9,
            top_k: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceOutput {
    pub text: String,
    pub tokens: u32,
    pub confidence: f32,
}

/// One retrieved passage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalHit {
    pub text: String,
    pub source: String,
    pub score: f32,
    pub metadata: Value,
}

pub trait InferenceEngine: Send + Sync + 'static {
    fn infer(
        &self,
        prompt: String,
        options: InferenceOptions,
    ) -> BoxFuture<'_, Result<InferenceOutput, EngineError>>;
}

pub trait RetrievalEngine: Send + Sync + 'static {
    fn search(&self, query: String, top_k: usize) -> BoxFuture<'_, Result<Vec<RetrievalHit>, EngineError>>;
}

/// Stand-in for an engine that is not loaded. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableEngine;

impl InferenceEngine for UnavailableEngine {
    fn infer(
        &self,
        _prompt: String,
        _options: InferenceOptions,
    ) -> BoxFuture<'_, Result<InferenceOutput, EngineError>> {
        Box::pin(async { Err(EngineError::Unavailable("inference")) })
    }
}

impl RetrievalEngine for UnavailableEngine {
    fn search(&self, _query: String, _top_k: usize) -> BoxFuture<'_, Result<Vec<RetrievalHit>, EngineError>> {
        Box::pin(async { Err(EngineError::Unavailable("retrieval")) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_engine_fails() {
        let err = UnavailableEngine
            .infer("hi".into(), InferenceOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "inference engine is not available");

        let err = UnavailableEngine.search("q".into(), 5).await.unwrap_err();
        assert_eq!(HandlerError::from(err).0, "retrieval engine is not available");
    }
}
