use crate::services::gemini::{DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};
use crate::services::openai::{DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL};
use crate::services::{ModelProvider, DEFAULT_PROBLEM_LIMIT};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub model: ModelSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }

/// Where problems are read from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemBackend {
    #[default]
    Supabase,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub backend: ProblemBackend,
    /// Supabase project URL, e.g. `https://xyz.supabase.co`
    pub supabase_url: Option<String>,
    /// Supabase service role key
    pub service_key: Option<String>,
    /// PostgreSQL connection string for the `postgres` backend
    pub postgres_url: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_problem_limit")]
    pub problem_limit: usize,
    pub max_connections: Option<u32>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: ProblemBackend::default(),
            supabase_url: None,
            service_key: None,
            postgres_url: None,
            table: default_table(),
            problem_limit: default_problem_limit(),
            max_connections: None,
        }
    }
}

fn default_table() -> String { "problems".to_string() }
fn default_problem_limit() -> usize { DEFAULT_PROBLEM_LIMIT }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelSettings {
    /// Explicit provider; inferred from whichever API key is present when unset
    pub provider: Option<ModelProvider>,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Override of the provider's base URL
    pub endpoint: Option<String>,
    /// Override of the provider's default model
    pub model: Option<String>,
}

impl ModelSettings {
    /// The provider to deploy: explicit, else OpenAI when only its key is set, else Gemini
    pub fn provider(&self) -> ModelProvider {
        match (self.provider, &self.gemini_api_key, &self.openai_api_key) {
            (Some(provider), _, _) => provider,
            (None, None, Some(_)) => ModelProvider::OpenAi,
            _ => ModelProvider::Gemini,
        }
    }

    /// API key of the selected provider
    pub fn api_key(&self) -> Option<&str> {
        let key = match self.provider() {
            ModelProvider::Gemini => &self.gemini_api_key,
            ModelProvider::OpenAi => &self.openai_api_key,
        };
        key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn endpoint(&self) -> &str {
        match (&self.endpoint, self.provider()) {
            (Some(endpoint), _) => endpoint,
            (None, ModelProvider::Gemini) => DEFAULT_GEMINI_ENDPOINT,
            (None, ModelProvider::OpenAi) => DEFAULT_OPENAI_ENDPOINT,
        }
    }

    pub fn model_name(&self) -> &str {
        match (&self.model, self.provider()) {
            (Some(model), _) => model,
            (None, ModelProvider::Gemini) => DEFAULT_GEMINI_MODEL,
            (None, ModelProvider::OpenAi) => DEFAULT_OPENAI_MODEL,
        }
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local configuration file (config/local.toml)
    /// 4. Environment variables (prefixed with MATCHMAKING__)
    /// 5. Well-known credentials (SUPABASE_URL, GEMINI_API_KEY, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MATCHMAKING__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        Self::from_config(substitute_env_vars(settings)?)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        Self::from_config(substitute_env_vars(settings)?)
    }

    /// Deserialize and validate an already-built configuration
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject configurations the service cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.database.backend {
            ProblemBackend::Supabase => {
                if is_blank(&self.database.supabase_url) {
                    return Err(missing("database.supabase_url (SUPABASE_URL)"));
                }
                if is_blank(&self.database.service_key) {
                    return Err(missing("database.service_key (SUPABASE_SERVICE_ROLE_KEY)"));
                }
            }
            ProblemBackend::Postgres => {
                if is_blank(&self.database.postgres_url) {
                    return Err(missing("database.postgres_url (DATABASE_URL)"));
                }
            }
        }

        if !(1..=DEFAULT_PROBLEM_LIMIT).contains(&self.database.problem_limit) {
            return Err(ConfigError::Message(format!(
                "database.problem_limit must be between 1 and {}",
                DEFAULT_PROBLEM_LIMIT
            )));
        }

        if self.model.api_key().is_none() {
            return Err(match self.model.provider() {
                ModelProvider::Gemini => missing("model.gemini_api_key (GEMINI_API_KEY)"),
                ModelProvider::OpenAi => missing("model.openai_api_key (OPENAI_API_KEY)"),
            });
        }

        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix("MATCHMAKING")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn missing(what: &str) -> ConfigError {
    ConfigError::Message(format!("missing required setting {}", what))
}

/// Apply the well-known deployment variables on top of the layered config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    const OVERRIDES: [(&str, &str); 5] = [
        ("SUPABASE_URL", "database.supabase_url"),
        ("SUPABASE_SERVICE_ROLE_KEY", "database.service_key"),
        ("DATABASE_URL", "database.postgres_url"),
        ("GEMINI_API_KEY", "model.gemini_api_key"),
        ("OPENAI_API_KEY", "model.openai_api_key"),
    ];

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in OVERRIDES {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
