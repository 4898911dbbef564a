use actix_web::{post, web, HttpRequest, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::get_request_id,
    models::{
        domain::QuestionRequest,
        dto::{request::GenerateQuestionsRequest, response::QuestionsResponse},
    },
};

#[post("/api/generate-questions")]
pub async fn generate_questions(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<GenerateQuestionsRequest>,
) -> Result<HttpResponse, AppError> {
    let request_id = get_request_id(&req);
    let request = QuestionRequest::try_from(body.into_inner())?;

    log::info!(
        "[{}] Generating {} {} question(s) for {} {} ({})",
        request_id,
        request.count,
        request.topic_or_mixed(),
        request.test_type,
        request.subject,
        if state.question_service.has_provider() { "model" } else { "offline" }
    );

    let (questions, source) = state
        .question_service
        .generate(&request)
        .await
        .inspect_err(|err| log::error!("[{}] Question generation failed: {}", request_id, err))?;

    Ok(HttpResponse::Ok().json(QuestionsResponse::new(&request, questions, source)))
}
