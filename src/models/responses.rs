use serde::{Deserialize, Serialize};

/// Successful match response: the model's ranked list, verbatim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub result: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub problem_source: String,
    pub model: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_omits_missing_details() {
        let json = serde_json::to_value(ErrorResponse::new("Method not allowed")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "Method not allowed"}));

        let json = serde_json::to_value(ErrorResponse::with_details("Internal error", "boom")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "Internal error", "details": "boom"}));
    }
}
