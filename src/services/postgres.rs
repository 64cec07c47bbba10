use crate::models::{ProblemId, ProblemRecord};
use crate::services::problems::{DataSourceError, ProblemSource};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error(transparent)]
    SqlxError(#[from] sqlx::Error),

    /// Error reported by the server; displays as the server's own message
    #[error("{0}")]
    QueryError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// PostgreSQL client reading the problems table directly
///
/// Used when the service is deployed next to the database and reaches it with a
/// connection string instead of the Supabase REST gateway. Access is read-only.
pub struct PostgresClient {
    pool: PgPool,
    query: String,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        table: &str,
        max_connections: u32,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Self::with_pool(pool, table)
    }

    /// Wrap an existing pool
    pub fn with_pool(pool: PgPool, table: &str) -> Result<Self, PostgresError> {
        Ok(Self {
            pool,
            query: problems_query(table)?,
        })
    }

    /// Fetch up to `limit` problems
    ///
    /// No ORDER BY: rows come back in whatever order the planner produces.
    pub async fn get_problems(&self, limit: usize) -> Result<Vec<ProblemRecord>, PostgresError> {
        let rows = sqlx::query(&self.query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        let problems = rows
            .iter()
            .map(problem_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Fetched {} problems from PostgreSQL", problems.len());

        Ok(problems)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn problem_from_row(row: &PgRow) -> Result<ProblemRecord, sqlx::Error> {
    Ok(ProblemRecord {
        id: ProblemId::Text(row.try_get("id")?),
        title: row.try_get::<Option<String>, _>("title")?.unwrap_or_default(),
        description: row.try_get::<Option<String>, _>("description")?.unwrap_or_default(),
        location: row.try_get::<Option<String>, _>("location")?.unwrap_or_default(),
    })
}

fn query_error(err: sqlx::Error) -> PostgresError {
    match err {
        sqlx::Error::Database(db) => {
            tracing::error!("PostgreSQL query failed: {}", db);
            PostgresError::QueryError(db.message().to_string())
        }
        other => other.into(),
    }
}

/// Build the fixed select for `table`; the id is cast to text so any key type works
fn problems_query(table: &str) -> Result<String, PostgresError> {
    let valid = !table.is_empty()
        && table
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));

    if !valid {
        return Err(PostgresError::InvalidInput(format!(
            "invalid table name: {:?}",
            table
        )));
    }

    Ok(format!(
        "SELECT id::text AS id, title, description, location FROM {} LIMIT $1",
        table
    ))
}

#[async_trait]
impl ProblemSource for PostgresClient {
    async fn fetch_problems(&self, limit: usize) -> Result<Vec<ProblemRecord>, DataSourceError> {
        Ok(self.get_problems(limit).await?)
    }

    async fn health_check(&self) -> Result<bool, DataSourceError> {
        Ok(PostgresClient::health_check(self).await?)
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problems_query() {
        assert_eq!(
            problems_query("problems").unwrap(),
            "SELECT id::text AS id, title, description, location FROM problems LIMIT $1"
        );
        assert!(problems_query("public.problems").is_ok());
    }

    #[test]
    fn test_problems_query_rejects_injection() {
        assert!(problems_query("problems; DROP TABLE problems").is_err());
        assert!(problems_query("").is_err());
        assert!(problems_query("public.").is_err());
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = query_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, PostgresError::SqlxError(sqlx::Error::RowNotFound)));
    }
}
