use crate::core::prompt::build_prompt;
use crate::services::{DataSourceError, ModelClient, ModelError, ProblemSource, DEFAULT_PROBLEM_LIMIT};
use std::sync::Arc;
use thiserror::Error;

/// Failure anywhere after validation; displays as the underlying message
#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    #[error(transparent)]
    Upstream(#[from] ModelError),
}

/// Matching pipeline orchestrator
///
/// # Pipeline Stages
/// 1. Fetch a fixed batch of problems
/// 2. Render the ranking prompt
/// 3. Ask the model to rank them
///
/// The model call only starts once the fetch has completed. Any failure aborts
/// the request; nothing is retried and no partial result is used.
#[derive(Clone)]
pub struct Matchmaker {
    problems: Arc<dyn ProblemSource>,
    model: Arc<dyn ModelClient>,
    problem_limit: usize,
}

impl Matchmaker {
    pub fn new(problems: Arc<dyn ProblemSource>, model: Arc<dyn ModelClient>) -> Self {
        Self {
            problems,
            model,
            problem_limit: DEFAULT_PROBLEM_LIMIT,
        }
    }

    pub fn with_problem_limit(mut self, limit: usize) -> Self {
        self.problem_limit = limit;
        self
    }

    pub fn problem_source(&self) -> &dyn ProblemSource {
        self.problems.as_ref()
    }

    pub fn model(&self) -> &dyn ModelClient {
        self.model.as_ref()
    }

    /// Rank the stored problems against a startup description
    ///
    /// Returns the model's ranked list verbatim.
    pub async fn rank(&self, description: &str) -> Result<String, MatchError> {
        let problems = self.problems.fetch_problems(self.problem_limit).await?;

        tracing::debug!(
            "Fetched {} problems from {}",
            problems.len(),
            self.problems.name()
        );

        let prompt = build_prompt(description, &problems);

        let ranked = self.model.generate(&prompt).await?;

        tracing::info!(
            "Ranked {} problems with {} ({} chars)",
            problems.len(),
            self.model.name(),
            ranked.len()
        );

        Ok(ranked)
    }
}

impl std::fmt::Debug for Matchmaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matchmaker")
            .field("problems", &self.problems.name())
            .field("model", &self.model.name())
            .field("problem_limit", &self.problem_limit)
            .finish()
    }
}
