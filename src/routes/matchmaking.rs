use crate::core::{MatchError, Matchmaker};
use crate::models::{ErrorResponse, HealthResponse, MatchRequest, MatchResponse};
use actix_web::{error, http::header, web, HttpRequest, HttpResponse, Responder};
use tracing::Instrument;
use validator::Validate;

pub const MISSING_DESCRIPTION: &str = "Missing startup description";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const INTERNAL_ERROR: &str = "Internal error";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matchmaker: Matchmaker,
}

impl AppState {
    pub fn new(matchmaker: Matchmaker) -> Self {
        Self { matchmaker }
    }
}

/// Configure the matchmaking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .service(
            web::resource("/matchmaking")
                .route(web::post().to(match_startup))
                .default_service(web::to(method_not_allowed)),
        )
        .route("/health", web::get().to(health_check));
}

/// JSON extractor settings: any unreadable body is a missing description
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Rejected body on {}: {}", req.path(), err);
    error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ErrorResponse::new(MISSING_DESCRIPTION)),
    )
    .into()
}

/// Any method other than POST on the matchmaking resource
async fn method_not_allowed(req: HttpRequest) -> impl Responder {
    tracing::info!("Rejected {} {}", req.method(), req.path());
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, "POST"))
        .json(ErrorResponse::new(METHOD_NOT_ALLOWED))
}

/// Match a startup idea against stored problems
///
/// POST /api/matchmaking
///
/// Request body:
/// ```json
/// {
///   "description": "We build solar micro-grids for rural villages"
/// }
/// ```
async fn match_startup(
    state: web::Data<AppState>,
    req: web::Json<MatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for matchmaking request: {}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new(MISSING_DESCRIPTION));
    }

    let description = req.description().unwrap_or_default();
    let request_id = uuid::Uuid::new_v4();

    async move {
        tracing::info!("Matching startup description ({} chars)", description.len());

        match state.matchmaker.rank(description).await {
            Ok(result) => HttpResponse::Ok().json(MatchResponse { result }),
            Err(e) => internal_error(&e),
        }
    }
    .instrument(tracing::info_span!("matchmaking", %request_id))
    .await
}

/// Every failure after validation becomes the same 500 envelope
fn internal_error(err: &MatchError) -> HttpResponse {
    match err {
        MatchError::DataSource(e) => tracing::error!("Failed to fetch problems: {}", e),
        MatchError::Upstream(e) => tracing::error!("Model call failed: {}", e),
    }

    HttpResponse::InternalServerError().json(ErrorResponse::with_details(
        INTERNAL_ERROR,
        err.to_string(),
    ))
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let source = state.matchmaker.problem_source();

    let healthy = match source.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Problem source {} is unreachable: {}", source.name(), e);
            false
        }
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        problem_source: source.name().to_string(),
        model: state.matchmaker.model().name(),
        timestamp: chrono::Utc::now(),
    })
}
