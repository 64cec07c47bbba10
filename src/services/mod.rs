// Service exports
pub mod gemini;
pub mod model;
pub mod openai;
pub mod postgres;
pub mod problems;
pub mod supabase;

pub use gemini::GeminiClient;
pub use model::{ModelClient, ModelError, ModelProvider};
pub use openai::OpenAiClient;
pub use postgres::{PostgresClient, PostgresError};
pub use problems::{DataSourceError, ProblemSource, DEFAULT_PROBLEM_LIMIT, PROBLEM_COLUMNS};
pub use supabase::{SupabaseClient, SupabaseError};
