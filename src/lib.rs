//! Matchmaking API - matches startup ideas against real-world problems
//!
//! This library fetches a fixed batch of problem records, renders them into a
//! ranking prompt, and delegates the ranking to an external text-generation
//! service (Gemini or an OpenAI-compatible chat API).

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{build_prompt, MatchError, Matchmaker};
pub use crate::models::{ErrorResponse, MatchRequest, MatchResponse, ProblemId, ProblemRecord};
pub use crate::services::{ModelClient, ProblemSource};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let prompt = build_prompt("idea", &[ProblemRecord::new(1, "t", "d", "l")]);
        assert!(prompt.contains("Problem 1:"));
    }
}
