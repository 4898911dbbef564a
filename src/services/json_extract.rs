//! Best-effort recovery of a JSON value from free-form model output.
//!
//! Models wrap their answer in code fences, chat prose, or both. Everything
//! here is a boundary adapter: callers only see [`extract_json`] and
//! [`QuestionPacket`], so a stricter structured-output path can replace it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Longest excerpt of model output carried in an error.
pub const SNIPPET_LIMIT: usize = 160;

static FENCE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```[A-Za-z0-9_-]*").expect("FENCE_MARKER is a valid regex pattern")
});

static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r",(\s*[}\]])").expect("TRAILING_COMMA is a valid regex pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("model returned an empty response")]
    Empty,

    #[error("no JSON object or array found in: {0}")]
    NoJson(String),

    #[error("malformed JSON ({reason}) in: {snippet}")]
    Malformed { reason: String, snippet: String },

    #[error("unexpected JSON shape: {0}")]
    UnexpectedShape(String),
}

/// Extracts the JSON value embedded in `text`.
pub fn extract_json(text: &str) -> Result<Value, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let cleaned = strip_code_fences(trimmed);
    if !cleaned.contains(['{', '[']) {
        return Err(ParseError::NoJson(snippet(&cleaned)));
    }

    let candidates = candidate_spans(&cleaned);
    let mut last_error = None;

    for candidate in &candidates {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => return Ok(value),
            Err(err) => last_error = Some(err),
        }
    }

    for candidate in &candidates {
        let repaired = repair(candidate);
        if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
            log::debug!("Recovered model JSON after repair pass");
            return Ok(value);
        }
    }

    Err(ParseError::Malformed {
        reason: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no parseable span".to_string()),
        snippet: snippet(&cleaned),
    })
}

/// Removes fence markers but keeps what they enclose.
pub fn strip_code_fences(text: &str) -> String {
    FENCE_MARKER.replace_all(text, "").trim().to_string()
}

/// Truncates model output to a bounded, char-boundary-safe excerpt.
pub fn snippet(text: &str) -> String {
    let flattened: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= SNIPPET_LIMIT {
        return flattened;
    }
    let mut cut: String = flattened.chars().take(SNIPPET_LIMIT).collect();
    cut.push('…');
    cut
}

fn candidate_spans(text: &str) -> Vec<String> {
    let mut spans = vec![text.to_string()];

    let object = outer_span(text, '{', '}');
    let array = outer_span(text, '[', ']');

    // A bare array should be tried before the objects nested inside it.
    let ordered = if text.starts_with('[') {
        [array, object]
    } else {
        [object, array]
    };

    for span in ordered.into_iter().flatten() {
        if !spans.iter().any(|s| s == span) {
            spans.push(span.to_string());
        }
    }
    spans
}

fn outer_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn repair(candidate: &str) -> String {
    let quotes_fixed = candidate
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    TRAILING_COMMA.replace_all(&quotes_fixed, "$1").into_owned()
}

/// Accepted top-level shapes of a question packet.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuestionPacket {
    Wrapped { questions: Vec<Value> },
    Bare(Vec<Value>),
}

impl QuestionPacket {
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        let kind = match &value {
            Value::Object(map) => format!("object with keys {:?}", map.keys().take(5).collect::<Vec<_>>()),
            Value::Array(_) => "array".to_string(),
            other => json_kind(other).to_string(),
        };
        serde_json::from_value(value).map_err(|_| ParseError::UnexpectedShape(kind))
    }

    /// Raw, still-untyped question records in model order.
    pub fn into_records(self) -> Vec<Value> {
        match self {
            QuestionPacket::Wrapped { questions } => questions,
            QuestionPacket::Bare(questions) => questions,
        }
    }
}

/// Full text-to-records path used by the question service.
pub fn extract_records(text: &str) -> Result<Vec<Value>, ParseError> {
    let value = extract_json(text)?;
    Ok(QuestionPacket::from_value(value)?.into_records())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
