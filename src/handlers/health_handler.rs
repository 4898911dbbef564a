use actix_web::{get, web, HttpResponse};

use crate::{app_state::AppState, models::dto::response::HealthResponse};

#[get("/api/health")]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        port: state.config.web_server_port,
    })
}

#[get("/api/ping")]
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}
