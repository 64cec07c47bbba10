use async_trait::async_trait;
use reqwest::Response;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when calling a text-generation API
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("{provider} API returned {status}: {message}")]
    ApiError {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The response did not carry generated text where expected
    #[error("Invalid response from {0}")]
    InvalidResponse(&'static str),
}

/// Which text-generation service ranks the problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    Gemini,
    #[serde(alias = "chat")]
    OpenAi,
}

impl ModelProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvider::Gemini => "gemini",
            ModelProvider::OpenAi => "openai",
        }
    }
}

/// A text-generation service: one prompt in, one block of text out
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Exactly one outbound call; no retry, no streaming
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;

    /// Provider and model, e.g. `gemini/gemini-pro`
    fn name(&self) -> String;
}

/// Turn a non-2xx upstream response into an `ApiError`
///
/// Both providers wrap failures as `{"error": {"message": ...}}`.
pub(crate) async fn api_error(provider: &'static str, response: Response) -> ModelError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| status.to_string());

    tracing::error!("{} API request failed: {} - {}", provider, status, body);

    ModelError::ApiError {
        provider,
        status: status.as_u16(),
        message,
    }
}
