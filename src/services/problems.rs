use crate::models::ProblemRecord;
use crate::services::{PostgresError, SupabaseError};
use async_trait::async_trait;
use thiserror::Error;

/// Columns selected from the problems table
pub const PROBLEM_COLUMNS: &str = "id,title,description,location";

/// Default number of problems sent to the model per request
pub const DEFAULT_PROBLEM_LIMIT: usize = 20;

/// Failure reported by a problem store
///
/// Displays as the store's own message.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error(transparent)]
    Supabase(#[from] SupabaseError),

    #[error(transparent)]
    Postgres(#[from] PostgresError),
}

/// Read-only source of candidate problems
#[async_trait]
pub trait ProblemSource: Send + Sync {
    /// One read of at most `limit` problems, no filter, store order
    async fn fetch_problems(&self, limit: usize) -> Result<Vec<ProblemRecord>, DataSourceError>;

    async fn health_check(&self) -> Result<bool, DataSourceError>;

    /// Backend name for logging and health output
    fn name(&self) -> &str;
}
