#[cfg(test)]
pub mod fixtures {
    use serde_json::{json, Value};

    /// A raw question record in the shape the QA prompt asks for.
    pub fn raw_question(text: &str, answer: &str, answer_index: i64) -> Value {
        json!({
            "question": text,
            "choices": ["first", "second", "third", "fourth"],
            "answer": answer,
            "answerIndex": answer_index,
            "difficulty": "Medium",
            "explanation": "Work through the definition. Eliminate the distractors. The remaining choice is correct."
        })
    }

    /// Serializes records as a `{"questions": [...]}` packet.
    pub fn packet_text(records: &[Value]) -> String {
        json!({ "questions": records }).to_string()
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::services::json_extract::extract_records;
    use crate::services::normalizer::normalize_question;

    #[test]
    fn test_fixture_packet_round_trips_through_extractor() {
        let text = packet_text(&[raw_question("A?", "B", 1), raw_question("B?", "C", 2)]);
        let records = extract_records(&text).expect("fixture packet should parse");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_fixture_question_normalizes_cleanly() {
        let q = normalize_question(&raw_question("A?", "D", 3), "Math").expect("valid fixture");
        assert_eq!(q.correct_index(), 3);
        assert_eq!(q.choices[3], "fourth");
    }
}
