use actix_web::{post, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::get_request_id,
    models::dto::{request::ChatRequest, response::ChatResponse},
};

/// Tutor chat. Provider trouble degrades to a static reply, never an error.
#[post("/api/chat")]
pub async fn chat(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, AppError> {
    let request_id = get_request_id(&req);
    let request = body.into_inner();
    request.validate()?;

    let reply = state
        .tutor_service
        .reply(&request.message, &request.history)
        .await;

    if reply.degraded {
        log::warn!("[{}] Served degraded tutor reply", request_id);
    } else {
        log::info!(
            "[{}] Tutor replied with {} char(s) ({} history turn(s))",
            request_id,
            reply.turn.text.chars().count(),
            request.history.len()
        );
    }

    Ok(HttpResponse::Ok().json(ChatResponse::from(reply.turn)))
}
