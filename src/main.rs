use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use matchmaking_api::config::{ProblemBackend, Settings};
use matchmaking_api::core::Matchmaker;
use matchmaking_api::routes::{self, AppState};
use matchmaking_api::services::{
    GeminiClient, ModelClient, ModelProvider, OpenAiClient, PostgresClient, ProblemSource,
    SupabaseClient,
};
use std::io::{Error, ErrorKind};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn startup_error(what: &str, e: impl std::fmt::Display) -> Error {
    error!("{}: {}", what, e);
    Error::new(ErrorKind::Other, format!("{}: {}", what, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging; RUST_LOG wins over LOG_LEVEL
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting matchmaking service...");

    let settings = Settings::load().map_err(|e| startup_error("Failed to load configuration", e))?;

    info!("Configuration loaded successfully");

    let problems: Arc<dyn ProblemSource> = match settings.database.backend {
        ProblemBackend::Supabase => Arc::new(
            SupabaseClient::new(
                settings.database.supabase_url.clone().unwrap_or_default(),
                settings.database.service_key.clone().unwrap_or_default(),
                settings.database.table.clone(),
            )
            .map_err(|e| startup_error("Failed to create Supabase client", e))?,
        ),
        ProblemBackend::Postgres => {
            let max_connections = settings.database.max_connections.unwrap_or(10);
            let client = PostgresClient::new(
                settings.database.postgres_url.as_deref().unwrap_or_default(),
                &settings.database.table,
                max_connections,
            )
            .await
            .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

            info!("PostgreSQL pool ready (max: {} connections)", max_connections);
            Arc::new(client)
        }
    };

    info!("Problem source initialized: {}", problems.name());

    let model_settings = &settings.model;
    let api_key = model_settings.api_key().unwrap_or_default().to_string();

    let model: Arc<dyn ModelClient> = match model_settings.provider() {
        ModelProvider::Gemini => Arc::new(
            GeminiClient::new(
                model_settings.endpoint().to_string(),
                api_key,
                model_settings.model_name().to_string(),
            )
            .map_err(|e| startup_error("Failed to create Gemini client", e))?,
        ),
        ModelProvider::OpenAi => Arc::new(
            OpenAiClient::new(
                model_settings.endpoint().to_string(),
                api_key,
                model_settings.model_name().to_string(),
            )
            .map_err(|e| startup_error("Failed to create OpenAI client", e))?,
        ),
    };

    info!("Model client initialized: {}", model.name());

    let matchmaker = Matchmaker::new(problems, model)
        .with_problem_limit(settings.database.problem_limit);

    let app_state = AppState::new(matchmaker);

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
