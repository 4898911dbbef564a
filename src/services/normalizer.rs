//! Turns untyped question records from a model into canonical [`Question`]s.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::domain::question::CHOICE_COUNT;
use crate::models::domain::{AnswerLetter, Difficulty, Question};

pub const MIN_EXPLANATION_SENTENCES: usize = 3;
pub const MAX_EXPLANATION_SENTENCES: usize = 5;

const TEXT_KEYS: &[&str] = &["question", "text", "stem", "prompt"];
const CHOICE_KEYS: &[&str] = &["choices", "options"];
const EXPLANATION_KEYS: &[&str] = &["explanation", "rationale"];
const ANSWER_KEYS: &[&str] = &[
    "answerIndex",
    "answer_index",
    "correctIndex",
    "correct_index",
    "correct_answer",
    "correctAnswer",
    "answer",
    "correctLetter",
    "correct_letter",
];

const FILLER_SENTENCES: [&str; 2] = [
    "This conclusion follows from the core definition and the usual worked examples.",
    "It matches what the exam expects for this kind of question.",
];

static CHOICE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(?([A-Da-d])[\).:]\s+").expect("CHOICE_LABEL is a valid regex pattern")
});

static LETTER_ANSWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?i:option|choice|answer)\s*:?\s*)?\(?([A-Da-d])\)?(?:[\).:\s]|$)")
        .expect("LETTER_ANSWER is a valid regex pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("question record is not a JSON object")]
    NotAnObject,

    #[error("question record has no question text")]
    MissingText,
}

/// Normalizes one raw record. `subject` only seeds the default explanation.
pub fn normalize_question(raw: &Value, subject: &str) -> Result<Question, NormalizeError> {
    let record = raw.as_object().ok_or(NormalizeError::NotAnObject)?;

    let text = first_string(record, TEXT_KEYS)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(NormalizeError::MissingText)?;

    let choices = normalize_choices(first_value(record, CHOICE_KEYS));
    let answer = resolve_answer(record, &choices);
    let difficulty = record
        .get("difficulty")
        .and_then(Value::as_str)
        .map(Difficulty::normalize)
        .unwrap_or_default();
    let explanation = enforce_explanation_length(
        first_string(record, EXPLANATION_KEYS).unwrap_or_default(),
        subject,
    );

    Ok(Question {
        text,
        choices,
        answer,
        explanation,
        difficulty,
    })
}

/// Normalizes a whole packet, dropping records that cannot be salvaged.
pub fn normalize_all(records: &[Value], subject: &str) -> Vec<Question> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| match normalize_question(raw, subject) {
            Ok(question) => Some(question),
            Err(err) => {
                log::warn!("Dropping question record {}: {}", i + 1, err);
                None
            }
        })
        .collect()
}

fn first_value<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| record.get(*key).filter(|v| !v.is_null()))
}

fn first_string<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| record.get(*key).and_then(Value::as_str))
}

fn normalize_choices(raw: Option<&Value>) -> [String; CHOICE_COUNT] {
    let collected: Vec<String> = match raw {
        Some(Value::Array(items)) => items.iter().map(|v| choice_text(v).trim().to_string()).collect(),
        Some(Value::Object(map)) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            entries
                .into_iter()
                .map(|(_, v)| choice_text(v).trim().to_string())
                .collect()
        }
        _ => Vec::new(),
    };
    let labelled = has_label_sequence(&collected);

    std::array::from_fn(|i| {
        collected
            .get(i)
            .map(|c| {
                if labelled {
                    CHOICE_LABEL.replace(c, "").trim().to_string()
                } else {
                    c.clone()
                }
            })
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| format!("Choice {}", i + 1))
    })
}

/// True when the kept choices are labelled `A`, `B`, `C`, `D` in order.
fn has_label_sequence(choices: &[String]) -> bool {
    !choices.is_empty()
        && choices.iter().take(CHOICE_COUNT).enumerate().all(|(i, choice)| {
            CHOICE_LABEL
                .captures(choice)
                .and_then(|caps| caps[1].chars().next())
                .and_then(AnswerLetter::from_char)
                .is_some_and(|letter| letter.index() == i)
        })
}

fn choice_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => first_string(map, &["text", "label", "value"])
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// Index beats letter when both are present; an out-of-range index counts as absent.
fn resolve_answer(record: &Map<String, Value>, choices: &[String; CHOICE_COUNT]) -> AnswerLetter {
    let mut index = None;
    let mut letter = None;
    let mut answer_text: Option<String> = None;

    for key in ANSWER_KEYS {
        let Some(value) = record.get(*key) else {
            continue;
        };
        match value {
            Value::Number(n) => {
                let parsed = n
                    .as_u64()
                    .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
                    .and_then(|i| AnswerLetter::from_index(i as usize));
                match parsed {
                    Some(parsed) => {
                        index.get_or_insert(parsed);
                    }
                    None => {
                        answer_text.get_or_insert_with(|| n.to_string());
                    }
                }
            }
            Value::String(s) => {
                let s = s.trim();
                if let Some(parsed) = s.parse::<usize>().ok().and_then(AnswerLetter::from_index) {
                    index.get_or_insert(parsed);
                } else if let Some(parsed) = parse_letter(s) {
                    letter.get_or_insert(parsed);
                } else if !s.is_empty() {
                    answer_text.get_or_insert_with(|| s.to_string());
                }
            }
            _ => {}
        }
    }

    index
        .or(letter)
        .or_else(|| {
            answer_text.and_then(|text| {
                choices
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(&text))
                    .and_then(AnswerLetter::from_index)
            })
        })
        .unwrap_or(AnswerLetter::A)
}

fn parse_letter(value: &str) -> Option<AnswerLetter> {
    let captures = LETTER_ANSWER.captures(value)?;
    let c = captures.get(1)?.as_str().chars().next()?;
    AnswerLetter::from_char(c)
}

/// Splits after `.`, `!` or `?` when followed by whitespace or end of text.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = chars.peek().map_or(true, |next| next.is_whitespace());
        if matches!(c, '.' | '!' | '?') && at_boundary {
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let mut sentence = trimmed.to_string();
    let core = trimmed.trim_end_matches(['"', '\'', ')', ']', '\u{201D}', '\u{2019}']);
    if !core.ends_with(['.', '!', '?']) {
        sentence.push('.');
    }
    sentences.push(sentence);
}

/// Clamps an explanation to 3–5 sentences without asking the model again.
pub fn enforce_explanation_length(explanation: &str, subject: &str) -> String {
    let mut sentences = split_sentences(explanation);

    if sentences.is_empty() {
        let subject = match subject.trim() {
            "" => "the subject",
            s => s,
        };
        return format!(
            "This answer follows standard principles in {}. The reasoning compares the definitions involved with the common outcomes. It lines up with typical examples used in exam preparation.",
            subject
        );
    }

    sentences.truncate(MAX_EXPLANATION_SENTENCES);
    let mut filler = FILLER_SENTENCES.iter();
    while sentences.len() < MIN_EXPLANATION_SENTENCES {
        match filler.next() {
            Some(sentence) => sentences.push(sentence.to_string()),
            None => break,
        }
    }
    sentences.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renormalize(question: &Question) -> Question {
        let value = serde_json::to_value(question).expect("question should serialize");
        normalize_question(&value, "Math").expect("normalized question should re-normalize")
    }

    #[test]
    fn well_formed_record_is_kept() {
        let raw = json!({
            "question": "If 3x + 7 = 22, what is x?",
            "choices": ["5", "7", "15", "29"],
            "answer": "A",
            "answerIndex": 0,
            "difficulty": "Easy",
            "explanation": "Subtract 7 from both sides. Divide by 3. So x is 5."
        });

        let q = normalize_question(&raw, "Math").expect("valid record");
        assert_eq!(q.text, "If 3x + 7 = 22, what is x?");
        assert_eq!(q.choices, ["5", "7", "15", "29"].map(String::from));
        assert_eq!(q.correct_index(), 0);
        assert_eq!(q.difficulty, Difficulty::Easy);
        assert_eq!(q.explanation, "Subtract 7 from both sides. Divide by 3. So x is 5.");
    }

    #[test]
    fn index_wins_over_conflicting_letter() {
        let raw = json!({"question": "Q?", "choices": ["a", "b", "c", "d"], "answer": "B", "answerIndex": 3});
        let q = normalize_question(&raw, "").expect("valid record");
        assert_eq!(q.correct_index(), 3);
        assert_eq!(q.correct_letter(), AnswerLetter::D);
    }

    #[test]
    fn invalid_letter_without_index_defaults_to_a() {
        let raw = json!({"question": "Q?", "choices": ["a", "b", "c", "d"], "answer": "E"});
        let q = normalize_question(&raw, "").expect("valid record");
        assert_eq!(q.correct_index(), 0);
        assert_eq!(q.correct_letter(), AnswerLetter::A);
    }

    #[test]
    fn out_of_range_index_falls_back_to_letter() {
        let raw = json!({"question": "Q?", "choices": ["a", "b", "c", "d"], "answer": "c", "answerIndex": 7});
        let q = normalize_question(&raw, "").expect("valid record");
        assert_eq!(q.correct_letter(), AnswerLetter::C);
    }

    #[test]
    fn legacy_numeric_correct_answer_is_an_index() {
        let raw = json!({"question": "Q?", "choices": ["a", "b", "c", "d"], "correct_answer": 2});
        assert_eq!(normalize_question(&raw, "").unwrap().correct_index(), 2);

        let raw = json!({"question": "Q?", "choices": ["a", "b", "c", "d"], "answerIndex": "1"});
        assert_eq!(normalize_question(&raw, "").unwrap().correct_index(), 1);
    }

    #[test]
    fn labelled_letter_answers_are_understood() {
        for (answer, expected) in [("B) 12", AnswerLetter::B), ("(d)", AnswerLetter::D), ("Option C", AnswerLetter::C)] {
            let raw = json!({"question": "Q?", "choices": ["a", "b", "c", "d"], "answer": answer});
            assert_eq!(normalize_question(&raw, "").unwrap().correct_letter(), expected, "{}", answer);
        }
    }

    #[test]
    fn answer_matching_choice_text_selects_it() {
        let raw = json!({"question": "Q?", "choices": ["red", "green", "blue", "grey"], "answer": "Blue"});
        assert_eq!(normalize_question(&raw, "").unwrap().correct_letter(), AnswerLetter::C);
    }

    #[test]
    fn numeric_answer_out_of_index_range_matches_choice_text() {
        for answer in [json!("45"), json!(45)] {
            let raw = json!({"question": "What is 9 * 5?", "choices": ["5", "7", "45", "29"], "answer": answer});
            let q = normalize_question(&raw, "Math").expect("valid record");
            assert_eq!(q.correct_letter(), AnswerLetter::C, "{}", answer);
        }

        let raw = json!({"question": "Q?", "choices": ["1", "2", "3", "12"], "answerIndex": 12, "answer": "12"});
        assert_eq!(normalize_question(&raw, "").unwrap().correct_index(), 3);
    }

    #[test]
    fn short_choice_lists_are_padded_and_long_ones_truncated() {
        let raw = json!({"question": "Q?", "choices": ["only one", ""]});
        let q = normalize_question(&raw, "").unwrap();
        assert_eq!(q.choices, ["only one", "Choice 2", "Choice 3", "Choice 4"].map(String::from));

        let raw = json!({"question": "Q?", "choices": ["a", "b", "c", "d", "e", "f"]});
        let q = normalize_question(&raw, "").unwrap();
        assert_eq!(q.choices, ["a", "b", "c", "d"].map(String::from));

        let raw = json!({"question": "Q?"});
        let q = normalize_question(&raw, "").unwrap();
        assert_eq!(q.choices[3], "Choice 4");
    }

    #[test]
    fn choice_labels_and_map_shapes_are_handled() {
        let raw = json!({"question": "Q?", "options": ["A) 2", "B. 4", "C: 6", "(D) 8"]});
        let q = normalize_question(&raw, "").unwrap();
        assert_eq!(q.choices, ["2", "4", "6", "8"].map(String::from));

        let raw = json!({"question": "Q?", "choices": {"B": "two", "A": "one", "D": "four", "C": "three"}});
        let q = normalize_question(&raw, "").unwrap();
        assert_eq!(q.choices, ["one", "two", "three", "four"].map(String::from));

        let raw = json!({"question": "Q?", "choices": ["B. F. Skinner", "C. G. Jung", "Freud", "Piaget"]});
        let q = normalize_question(&raw, "").unwrap();
        assert_eq!(q.choices[0], "B. F. Skinner");
        assert_eq!(q.choices[1], "C. G. Jung");

        let raw = json!({"question": "Q?", "choices": [{"text": "x"}, 3, true, null]});
        let q = normalize_question(&raw, "").unwrap();
        assert_eq!(q.choices, ["x", "3", "true", "Choice 4"].map(String::from));
    }

    #[test]
    fn unusable_records_are_rejected() {
        assert_eq!(normalize_question(&json!("text"), ""), Err(NormalizeError::NotAnObject));
        assert_eq!(
            normalize_question(&json!({"choices": ["a"]}), ""),
            Err(NormalizeError::MissingText)
        );
        assert_eq!(
            normalize_question(&json!({"question": "   "}), ""),
            Err(NormalizeError::MissingText)
        );
    }

    #[test]
    fn normalize_all_drops_invalid_records() {
        let records = vec![json!({"question": "A?"}), json!(42), json!({"question": "B?"})];
        let questions = normalize_all(&records, "Math");
        let texts: Vec<&str> = questions.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["A?", "B?"]);
    }

    #[test]
    fn long_explanations_are_truncated_to_five_sentences() {
        let text = "One. Two. Three. Four. Five. Six. Seven.";
        assert_eq!(enforce_explanation_length(text, ""), "One. Two. Three. Four. Five.");
    }

    #[test]
    fn short_explanations_are_padded_to_three_sentences() {
        let padded = enforce_explanation_length("Add the numbers", "Math");
        assert_eq!(split_sentences(&padded).len(), 3);
        assert!(padded.starts_with("Add the numbers."));

        let padded = enforce_explanation_length("First. Second!", "Math");
        assert_eq!(split_sentences(&padded).len(), 3);
    }

    #[test]
    fn empty_explanation_gets_subject_default() {
        let text = enforce_explanation_length("", "Chemistry");
        assert!(text.contains("Chemistry"));
        assert_eq!(split_sentences(&text).len(), 3);
    }

    #[test]
    fn decimals_do_not_split_sentences() {
        let sentences = split_sentences("The answer is 3.5 units. Check by substitution.");
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn normalization_is_idempotent() {
        let raws = [
            json!({"question": " Q1? ", "choices": ["A) a", "b"], "answer": "D", "explanation": "Short", "difficulty": "HARD"}),
            json!({"question": "Q2?", "choices": ["a", "b", "c", "d", "e"], "answerIndex": 2, "explanation": "One. Two. Three. Four. Five. Six."}),
            json!({"question": "Q3?", "answer": "E", "explanation": "He said \"stop.\" Then he left"}),
            json!({"question": "Q4?", "choices": ["A) B. x", "B) y", "C) z", "D) w"], "answer": "B"}),
            json!({"question": "Q5?", "choices": ["5", "7", "45", "29"], "answer": "45"}),
        ];

        for raw in raws {
            let once = normalize_question(&raw, "Math").expect("valid");
            let twice = renormalize(&once);
            assert_eq!(once, twice);
            assert_eq!(twice.choices.len(), CHOICE_COUNT);
            assert!(twice.correct_index() <= 3);
            assert_eq!(AnswerLetter::from_index(twice.correct_index()), Some(twice.correct_letter()));
        }
    }
}
