use crate::constants::prompts::{QA_MAX_TOKENS, QA_TOKENS_PER_QUESTION, SUBJECT_GUIDELINES};
use crate::models::domain::{QuestionRequest, TestType};

/// Longest stem echoed back in an avoid list.
const AVOID_STEM_CHARS: usize = 120;

/// Builds the user prompt for one generation call of `count` questions.
///
/// `avoid` holds stems collected by earlier calls for the same request.
pub fn build_question_prompt(request: &QuestionRequest, count: usize, avoid: &[String]) -> String {
    let topic_text = request
        .topic
        .as_deref()
        .map(|t| format!(" focusing specifically on {}", t))
        .unwrap_or_default();

    let mut prompt = format!(
        "Generate {count} high-quality multiple choice questions for {test} {subject}{topic_text}.

Requirements:
- Questions should be authentic and realistic for actual {test} {subject} exams.
- Each question has exactly 4 answer choices.
- Include a mix of difficulty levels (Easy, Medium, Hard).
- Each explanation is 3 to 5 sentences and teaches the concept.
- Test understanding, not memorization.
- Keep questions subject-appropriate (no writing questions for math).
- Return ONLY JSON of the form {{\"questions\": [...]}} with both \"answer\" and \"answerIndex\" per question.
- Use LaTeX for all math.

{guidelines}",
        count = count,
        test = request.test_type,
        subject = request.subject,
        topic_text = topic_text,
        guidelines = SUBJECT_GUIDELINES,
    );

    if let Some(focus) = subject_focus(request) {
        prompt.push_str("\n\nFocus for this request: ");
        prompt.push_str(focus);
    }

    if !avoid.is_empty() {
        prompt.push_str("\n\nDo not repeat or closely paraphrase these existing questions:\n");
        for stem in avoid {
            prompt.push_str("- ");
            prompt.push_str(&shorten(stem));
            prompt.push('\n');
        }
    }

    prompt
}

/// Output token budget for a call asking for `count` questions.
pub fn max_tokens_for(count: usize) -> u32 {
    (count as u32)
        .saturating_mul(QA_TOKENS_PER_QUESTION)
        .clamp(QA_TOKENS_PER_QUESTION, QA_MAX_TOKENS)
}

fn subject_focus(request: &QuestionRequest) -> Option<&'static str> {
    if request.test_type == TestType::Ap {
        return Some("college-level depth and complexity.");
    }
    let subject = request.subject.to_lowercase();
    if subject.contains("math") {
        Some("problem-solving, formulas, and mathematical reasoning.")
    } else if subject.contains("reading") {
        Some("passage comprehension, inference, and analysis.")
    } else if subject.contains("writing") || subject.contains("english") {
        Some("grammar, rhetoric, and language usage.")
    } else if subject.contains("science") {
        Some("data interpretation and scientific reasoning.")
    } else {
        None
    }
}

fn shorten(stem: &str) -> String {
    let flat = stem.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= AVOID_STEM_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(AVOID_STEM_CHARS).collect();
    cut.push('…');
    cut
}
