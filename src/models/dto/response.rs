use serde::Serialize;

use crate::models::domain::question::QuestionRecord;
use crate::models::domain::{ChatTurn, Question, QuestionRequest, QuestionSource, TestType};

#[derive(Debug, Clone, Serialize)]
pub struct QuestionDto {
    pub id: usize,
    #[serde(flatten)]
    pub question: QuestionRecord,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsResponse {
    pub questions: Vec<QuestionDto>,
    pub test_type: TestType,
    pub subject: String,
    pub topic: String,
    pub requested: usize,
    pub source: QuestionSource,
}

impl QuestionsResponse {
    pub fn new(request: &QuestionRequest, questions: Vec<Question>, source: QuestionSource) -> Self {
        let questions = questions
            .into_iter()
            .enumerate()
            .map(|(i, question)| QuestionDto {
                id: i + 1,
                question: question.into(),
            })
            .collect();

        Self {
            questions,
            test_type: request.test_type,
            subject: request.subject.clone(),
            topic: request.topic_or_mixed().to_string(),
            requested: request.count,
            source,
        }
    }
}

/// `content` and `response` carry the same text; client revisions read one or the other.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub content: String,
    pub response: String,
    pub turn: ChatTurn,
}

impl From<ChatTurn> for ChatResponse {
    fn from(turn: ChatTurn) -> Self {
        Self {
            content: turn.text.clone(),
            response: turn.text.clone(),
            turn,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub status: &'static str,
    pub version: &'static str,
    pub port: u16,
}
