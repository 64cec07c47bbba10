use crate::services::model::{api_error, ModelClient, ModelError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

const PROVIDER: &str = "Gemini";

/// Client for the Gemini `generateContent` API
pub struct GeminiClient {
    endpoint: String,
    api_key: String,
    model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].text`, when present and non-empty
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.is_empty())
    }
}

impl GeminiClient {
    pub fn new(endpoint: String, api_key: String, model: String) -> Result<Self, ModelError> {
        let client = Client::builder()
            .user_agent(concat!("matchmaking-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            endpoint,
            api_key,
            model,
            client,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::debug!("Calling Gemini model {} ({} prompt chars)", self.model, prompt.len());

        let response = self
            .client
            .post(self.url())
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            return Err(api_error(PROVIDER, response).await);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;

        parsed
            .into_text()
            .ok_or(ModelError::InvalidResponse(PROVIDER))
    }

    fn name(&self) -> String {
        format!("gemini/{}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<String> {
        serde_json::from_str::<GenerateResponse>(json).unwrap().into_text()
    }

    #[test]
    fn test_extracts_first_candidate_text() {
        let text = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"1. No electricity access"}],"role":"model"}},
                              {"content":{"parts":[{"text":"ignored"}]}}]}"#,
        );
        assert_eq!(text.as_deref(), Some("1. No electricity access"));
    }

    #[test]
    fn test_missing_text_is_rejected() {
        assert_eq!(parse(r#"{}"#), None);
        assert_eq!(parse(r#"{"candidates":[]}"#), None);
        assert_eq!(parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#), None);
        assert_eq!(parse(r#"{"candidates":[{"content":{"parts":[]}}]}"#), None);
        assert_eq!(parse(r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#), None);
    }

    #[test]
    fn test_request_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: "rank these" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"contents": [{"parts": [{"text": "rank these"}]}]})
        );
    }

    #[test]
    fn test_url() {
        let client = GeminiClient::new(
            format!("{}/", DEFAULT_GEMINI_ENDPOINT),
            "key".to_string(),
            DEFAULT_GEMINI_MODEL.to_string(),
        )
        .unwrap();

        assert_eq!(
            client.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
        assert_eq!(client.name(), "gemini/gemini-pro");
    }
}
