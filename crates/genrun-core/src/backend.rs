//! Language-model backend seam for the `AI` command.
//!
//! The concrete client (an Ollama server, a hosted API, a test double) is
//! an external collaborator: the core only defines the request shape and
//! the [`AiBackend`] trait. [`NoBackend`] is the default wiring and reports
//! every request as unconfigured, which surfaces as a normal execution
//! error under the fail-fast contract.

use async_trait::async_trait;
use thiserror::Error;

/// Default model used when the global store carries no `AI_MODEL`.
pub const DEFAULT_MODEL: &str = "llama3.2:latest";

/// Default sampling temperature when `AI_TEMPERATURE` is unset.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// A single generation request, already interpolated.
#[derive(Debug, Clone)]
pub struct AiRequest {
    pub prompt: String,
    pub model: String,
    pub system: Option<String>,
    pub temperature: f64,
}

#[derive(Error, Debug)]
#[error("{0}")]
pub struct AiBackendError(pub String);

#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Generates a completion for the request, returning the response text.
    async fn generate(&self, request: &AiRequest) -> Result<String, AiBackendError>;
}

/// Backend used when no AI collaborator has been wired in.
pub struct NoBackend;

#[async_trait]
impl AiBackend for NoBackend {
    async fn generate(&self, request: &AiRequest) -> Result<String, AiBackendError> {
        Err(AiBackendError(format!(
            "no AI backend configured (model {} requested)",
            request.model
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_backend_errors() {
        let backend = NoBackend;
        let request = AiRequest {
            prompt: "hello".to_string(),
            model: DEFAULT_MODEL.to_string(),
            system: None,
            temperature: DEFAULT_TEMPERATURE,
        };
        let err = backend.generate(&request).await.unwrap_err();
        assert!(err.to_string().contains("no AI backend configured"));
    }
}
