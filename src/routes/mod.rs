// Route exports
pub mod matchmaking;

use actix_web::web;

pub use matchmaking::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(matchmaking::json_config())
            .configure(matchmaking::configure),
    );
}
