use crate::services::model::{api_error, ModelClient, ModelError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
/// Fixed sampling temperature for ranking requests
pub const TEMPERATURE: f32 = 0.4;

pub const SYSTEM_PROMPT: &str =
    "You are a matchmaking assistant between startups and real-world problems.";

const PROVIDER: &str = "OpenAI";

/// Client for the OpenAI chat completions API
pub struct OpenAiClient {
    endpoint: String,
    api_key: String,
    model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

impl ChatResponse {
    /// `choices[0].message.content`
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()?
            .message?
            .content
            .filter(|c| !c.is_empty())
    }
}

impl OpenAiClient {
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

    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));

        tracing::debug!("Calling OpenAI model {} ({} prompt chars)", self.model, prompt.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            return Err(api_error(PROVIDER, response).await);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;

        parsed
            .into_text()
            .ok_or(ModelError::InvalidResponse(PROVIDER))
    }

    fn name(&self) -> String {
        format!("openai/{}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiClient {
        OpenAiClient::new(
            DEFAULT_OPENAI_ENDPOINT.to_string(),
            "sk-test".to_string(),
            DEFAULT_OPENAI_MODEL.to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_request_shape() {
        let client = client();
        let body = serde_json::to_value(client.request("rank these")).unwrap();

        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "rank these");
        assert!((body["temperature"].as_f64().unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_extracts_first_choice() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"id":"chatcmpl-1","choices":[{"index":0,"message":{"role":"assistant","content":"1. Water"}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("1. Water"));
    }

    #[test]
    fn test_missing_content_is_rejected() {
        for json in [
            r#"{}"#,
            r#"{"choices":[]}"#,
            r#"{"choices":[{"index":0}]}"#,
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        ] {
            let parsed: ChatResponse = serde_json::from_str(json).unwrap();
            assert_eq!(parsed.into_text(), None, "{}", json);
        }
    }
}
