use crate::models::ProblemRecord;
use crate::services::problems::{DataSourceError, ProblemSource, PROBLEM_COLUMNS};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when interacting with Supabase
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// PostgREST error body; displays as the store's own message
    #[error("{message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Supabase REST client for the problems table
///
/// Talks to the PostgREST endpoint under `/rest/v1` using the service role key
/// for both the `apikey` header and the bearer credential.
pub struct SupabaseClient {
    base_url: String,
    service_key: String,
    table: String,
    client: Client,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        service_key: String,
        table: String,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder()
            .user_agent(concat!("matchmaking-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url,
            service_key,
            table,
            client,
        })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.table)
        )
    }

    async fn select(&self, columns: &str, limit: usize) -> Result<Response, SupabaseError> {
        let url = format!(
            "{}?select={}&limit={}",
            self.table_url(),
            urlencoding::encode(columns),
            limit
        );

        tracing::debug!("Querying Supabase: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Supabase query on {} failed: {} - {}", self.table, status, body);
            return Err(SupabaseError::ApiError {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        Ok(response)
    }

    /// Fetch up to `limit` problems in whatever order the store returns them
    pub async fn get_problems(&self, limit: usize) -> Result<Vec<ProblemRecord>, SupabaseError> {
        let response = self.select(PROBLEM_COLUMNS, limit).await?;

        let json: Value = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;

        let rows = json
            .as_array()
            .ok_or_else(|| SupabaseError::InvalidResponse("Expected an array of rows".into()))?;

        let problems = rows
            .iter()
            .map(|row| serde_json::from_value(row.clone()))
            .collect::<Result<Vec<ProblemRecord>, _>>()
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse problem: {}", e)))?;

        tracing::debug!("Fetched {} problems from Supabase", problems.len());

        Ok(problems)
    }

    /// Health check against the problems table
    pub async fn ping(&self) -> Result<bool, SupabaseError> {
        self.select("id", 1).await.map(|_| true)
    }
}

/// Pull `message` out of a PostgREST error body
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl ProblemSource for SupabaseClient {
    async fn fetch_problems(&self, limit: usize) -> Result<Vec<ProblemRecord>, DataSourceError> {
        Ok(self.get_problems(limit).await?)
    }

    async fn health_check(&self) -> Result<bool, DataSourceError> {
        Ok(self.ping().await?)
    }

    fn name(&self) -> &str {
        "supabase"
    }
}
