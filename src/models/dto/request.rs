use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::errors::AppError;
use crate::models::domain::question_request::DEFAULT_QUESTIONS;
use crate::models::domain::{ChatTurn, QuestionRequest, TestType};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    pub test_type: TestType,

    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub subject: String,

    #[validate(length(max = 200))]
    pub topic: Option<String>,

    // Clients send this as either a number or a numeric string.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub num_questions: Option<i64>,
}

impl TryFrom<GenerateQuestionsRequest> for QuestionRequest {
    type Error = AppError;

    fn try_from(dto: GenerateQuestionsRequest) -> Result<Self, Self::Error> {
        dto.validate()?;
        Ok(QuestionRequest::new(
            dto.test_type,
            &dto.subject,
            dto.topic.as_deref(),
            dto.num_questions.unwrap_or(DEFAULT_QUESTIONS as i64),
        ))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000), custom(function = "validate_not_blank"))]
    pub message: String,

    #[serde(default)]
    #[validate(nested)]
    pub history: Vec<ChatTurn>,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let invalid = || de::Error::custom("numQuestions must be an integer");
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .map(Some)
            .ok_or_else(invalid),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}
