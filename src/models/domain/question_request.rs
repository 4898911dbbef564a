use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 25;
pub const DEFAULT_QUESTIONS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum TestType {
    Sat,
    Act,
    Ap,
}

impl FromStr for TestType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "SAT" => Ok(TestType::Sat),
            "ACT" => Ok(TestType::Act),
            "AP" => Ok(TestType::Ap),
            other => Err(AppError::ValidationError(format!(
                "testType must be one of SAT, ACT, AP (got '{}')",
                other
            ))),
        }
    }
}

impl TryFrom<String> for TestType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TestType> for String {
    fn from(value: TestType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestType::Sat => "SAT",
            TestType::Act => "ACT",
            TestType::Ap => "AP",
        };
        write!(f, "{}", name)
    }
}

/// A validated request for a batch of practice questions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionRequest {
    pub test_type: TestType,
    pub subject: String,
    pub topic: Option<String>,
    pub count: usize,
}

impl QuestionRequest {
    pub fn new(test_type: TestType, subject: &str, topic: Option<&str>, count: i64) -> Self {
        Self {
            test_type,
            subject: subject.trim().to_string(),
            topic: topic
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            count: clamp_count(count),
        }
    }

    pub fn topic_or_mixed(&self) -> &str {
        self.topic.as_deref().unwrap_or("Mixed")
    }
}

pub fn clamp_count(count: i64) -> usize {
    count.clamp(MIN_QUESTIONS as i64, MAX_QUESTIONS as i64) as usize
}
