use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to match a startup idea against stored problems
///
/// Only `description` is read; any other field in the body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub description: Option<String>,
}

impl MatchRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
        }
    }

    /// The description, if a non-empty one was supplied
    ///
    /// Whitespace is kept verbatim; only an absent or empty string counts as missing.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}
