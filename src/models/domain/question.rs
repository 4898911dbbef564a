use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of answer choices every question carries.
pub const CHOICE_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Case-insensitive parse; anything unrecognised is `Medium`.
    pub fn normalize(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    pub const ALL: [AnswerLetter; CHOICE_COUNT] =
        [AnswerLetter::A, AnswerLetter::B, AnswerLetter::C, AnswerLetter::D];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            AnswerLetter::A => 0,
            AnswerLetter::B => 1,
            AnswerLetter::C => 2,
            AnswerLetter::D => 3,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(AnswerLetter::A),
            'B' => Some(AnswerLetter::B),
            'C' => Some(AnswerLetter::C),
            'D' => Some(AnswerLetter::D),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            AnswerLetter::A => "A",
            AnswerLetter::B => "B",
            AnswerLetter::C => "C",
            AnswerLetter::D => "D",
        };
        write!(f, "{}", letter)
    }
}

/// A fully normalized multiple-choice question.
///
/// The correct answer is held once, as a letter; the zero-based index is
/// derived from it, so the two can never disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "QuestionRecord")]
pub struct Question {
    pub text: String,
    pub choices: [String; CHOICE_COUNT],
    pub answer: AnswerLetter,
    pub explanation: String,
    pub difficulty: Difficulty,
}

impl Question {
    pub fn correct_index(&self) -> usize {
        self.answer.index()
    }

    pub fn correct_letter(&self) -> AnswerLetter {
        self.answer
    }

    pub fn correct_choice(&self) -> &str {
        &self.choices[self.correct_index()]
    }
}

/// Wire shape of a question. `correct_answer` mirrors `answerIndex` for
/// clients that still read the older field.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct QuestionRecord {
    pub question: String,
    pub choices: Vec<String>,
    pub answer: AnswerLetter,
    #[serde(rename = "answerIndex")]
    pub answer_index: usize,
    #[serde(default)]
    #[schemars(skip)]
    pub correct_answer: usize,
    pub explanation: String,
    pub difficulty: Difficulty,
}

impl From<Question> for QuestionRecord {
    fn from(question: Question) -> Self {
        let index = question.correct_index();
        QuestionRecord {
            question: question.text,
            choices: question.choices.to_vec(),
            answer: question.answer,
            answer_index: index,
            correct_answer: index,
            explanation: question.explanation,
            difficulty: question.difficulty,
        }
    }
}

/// Where a batch of questions came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    Model,
    Fallback,
}

/// Schema handed to providers that support structured output.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct QuestionPacketSchema {
    pub questions: Vec<QuestionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> Question {
        Question {
            text: "If 3x + 7 = 22, what is x?".to_string(),
            choices: [
                "5".to_string(),
                "7".to_string(),
                "15".to_string(),
                "29".to_string(),
            ],
            answer: AnswerLetter::A,
            explanation: "Subtract 7. Divide by 3. The result is 5.".to_string(),
            difficulty: Difficulty::Easy,
        }
    }

    #[test]
    fn answer_letter_and_index_agree() {
        for (i, letter) in AnswerLetter::ALL.iter().enumerate() {
            assert_eq!(letter.index(), i);
            assert_eq!(AnswerLetter::from_index(i), Some(*letter));
        }
        assert_eq!(AnswerLetter::from_index(4), None);
    }

    #[test]
    fn answer_letter_parses_lowercase_and_rejects_others() {
        assert_eq!(AnswerLetter::from_char('c'), Some(AnswerLetter::C));
        assert_eq!(AnswerLetter::from_char('E'), None);
    }

    #[test]
    fn difficulty_normalizes_case_and_unknowns() {
        assert_eq!(Difficulty::normalize(" HARD "), Difficulty::Hard);
        assert_eq!(Difficulty::normalize("easy"), Difficulty::Easy);
        assert_eq!(Difficulty::normalize("brutal"), Difficulty::Medium);
        assert_eq!(Difficulty::normalize(""), Difficulty::Medium);
    }

    #[test]
    fn question_serializes_both_answer_fields() {
        let mut question = sample_question();
        question.answer = AnswerLetter::C;

        let json = serde_json::to_value(&question).expect("question should serialize");
        assert_eq!(json["question"], "If 3x + 7 = 22, what is x?");
        assert_eq!(json["answer"], "C");
        assert_eq!(json["answerIndex"], 2);
        assert_eq!(json["correct_answer"], 2);
        assert_eq!(json["difficulty"], "Easy");
        assert_eq!(json["choices"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn correct_choice_follows_answer() {
        let question = sample_question();
        assert_eq!(question.correct_choice(), "5");
        assert_eq!(question.correct_letter().to_string(), "A");
    }

    #[test]
    fn packet_schema_mentions_required_fields() {
        let schema = schemars::schema_for!(QuestionPacketSchema);
        let json = serde_json::to_string(&schema).expect("schema should serialize");
        assert!(json.contains("questions"));
        assert!(json.contains("answerIndex"));
        assert!(json.contains("explanation"));
    }
}
