pub mod chat_handler;
pub mod health_handler;
pub mod question_handler;
pub mod spa;

use actix_web::web;

use crate::errors::AppError;

pub use chat_handler::chat;
pub use health_handler::{health_check, ping};
pub use question_handler::generate_questions;

/// Largest JSON body accepted by the API.
pub const JSON_BODY_LIMIT: usize = 256 * 1024;

/// Maps body extraction failures to the API's 400 error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, req| {
            log::warn!("Rejected JSON body for {}: {}", req.path(), err);
            AppError::ValidationError(err.to_string()).into()
        })
}

/// Registers every `/api` route. Unmatched `/api/*` paths get a JSON 404.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(generate_questions)
        .service(chat)
        .service(health_check)
        .service(ping)
        .service(web::scope("/api").default_service(web::to(spa::api_not_found)));
}
