//! Canned questions served when no question provider is configured.

use serde_json::{json, Value};

use crate::models::domain::{Question, QuestionRequest};
use crate::services::normalizer::normalize_all;

fn math_questions() -> Vec<Value> {
    vec![
        json!({
            "question": "If $3x + 7 = 22$, what is the value of $x$?",
            "choices": ["$x = 5$", "$x = 7$", "$x = 15$", "$x = 29$"],
            "answerIndex": 0,
            "difficulty": "Easy",
            "explanation": "Subtract 7 from both sides to get $3x = 15$. Divide both sides by 3. That gives $x = 5$, which is choice A."
        }),
        json!({
            "question": "What is the slope of the line passing through the points $(2, 5)$ and $(6, 13)$?",
            "choices": ["2", "4", "8", "$\\frac{1}{2}$"],
            "answerIndex": 0,
            "difficulty": "Medium",
            "explanation": "Slope is the change in $y$ divided by the change in $x$. Here that is $\\frac{13 - 5}{6 - 2}$. This simplifies to $\\frac{8}{4} = 2$."
        }),
        json!({
            "question": "If $f(x) = 2x^2 - 3x + 1$, what is $f(3)$?",
            "choices": ["10", "16", "18", "28"],
            "answerIndex": 0,
            "difficulty": "Medium",
            "explanation": "Substitute $x = 3$ into the function. This gives $2(9) - 9 + 1$. The result is $18 - 9 + 1 = 10$."
        }),
    ]
}

fn reading_questions() -> Vec<Value> {
    vec![
        json!({
            "question": "In context, the word 'deliberate' most nearly means:",
            "choices": ["intentional", "slow", "careful", "thoughtful"],
            "answerIndex": 0,
            "difficulty": "Medium",
            "explanation": "In most reading contexts 'deliberate' means intentional or purposeful. It describes something done on purpose rather than by accident. Choice A captures that meaning."
        }),
        json!({
            "question": "A passage describes rising flood risk and then evaluates three proposed responses. The primary purpose of the passage is to:",
            "choices": ["argue for a position", "describe a process", "analyze a problem", "compare two theories"],
            "answerIndex": 2,
            "difficulty": "Medium",
            "explanation": "The passage sets out a problem and weighs possible responses to it. It does not settle on one position or trace a single process. That makes analysis of a problem its main purpose."
        }),
    ]
}

fn science_questions() -> Vec<Value> {
    vec![json!({
        "question": "A graph shows enzyme activity rising as temperature increases from 20°C to 40°C, below the enzyme's optimum. What happens to enzyme activity over that range?",
        "choices": ["It decreases steadily", "It increases then decreases", "It remains constant", "It increases steadily"],
        "answerIndex": 3,
        "difficulty": "Medium",
        "explanation": "Enzyme activity generally increases with temperature up to an optimal point. The whole range here is below the optimum. So activity increases steadily, which is choice D."
    })]
}

fn writing_questions() -> Vec<Value> {
    vec![json!({
        "question": "Which of the following sentences contains a comma splice?",
        "choices": [
            "I went to the store, I bought milk.",
            "Although I was tired, I finished my homework.",
            "The dog barked loudly, and the neighbors complained.",
            "She studied hard; therefore, she passed the test."
        ],
        "answerIndex": 0,
        "difficulty": "Easy",
        "explanation": "A comma splice joins two independent clauses with only a comma. Choice A does exactly that. The other choices use a conjunction, a dependent clause, or a semicolon."
    })]
}

/// Raw records for a subject, matched on keywords in the subject name.
fn records_for(subject: &str) -> Vec<Value> {
    let subject = subject.to_lowercase();
    if subject.contains("math") || subject.contains("calc") || subject.contains("algebra") {
        math_questions()
    } else if subject.contains("reading") {
        reading_questions()
    } else if subject.contains("science") || subject.contains("bio") || subject.contains("chem") {
        science_questions()
    } else if subject.contains("writing") || subject.contains("english") || subject.contains("grammar") {
        writing_questions()
    } else {
        let mut mixed = math_questions();
        mixed.extend(reading_questions());
        mixed.extend(science_questions());
        mixed.extend(writing_questions());
        mixed
    }
}

/// Up to `request.count` distinct offline questions for the request's subject.
pub fn fallback_questions(request: &QuestionRequest) -> Vec<Question> {
    let mut questions = normalize_all(&records_for(&request.subject), &request.subject);
    questions.truncate(request.count);
    questions
}
