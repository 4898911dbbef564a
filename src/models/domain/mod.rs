pub mod chat_turn;
pub mod question;
pub mod question_request;
pub use chat_turn::{ChatRole, ChatTurn};
pub use question::{AnswerLetter, Difficulty, Question, QuestionSource};
pub use question_request::{QuestionRequest, TestType};
