use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::domain::Question;

const SIGNATURE_WORDS: usize = 6;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "her", "was", "one",
    "our", "out", "has", "his", "how", "its", "who", "did", "yes", "let", "than", "that", "this",
    "with", "from", "they", "will", "what", "when", "which", "there", "their", "would", "about",
    "into", "does", "following", "value", "best", "most", "given",
];

static EQUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9()^.]+(?:\s*[-+*/^]\s*[A-Za-z0-9()^.]+)*\s*=\s*[A-Za-z0-9()^.]+(?:\s*[-+*/^]\s*[A-Za-z0-9()^.]+)*")
        .expect("EQUATION is a valid regex pattern")
});

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9']+").expect("WORD is a valid regex pattern"));

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DedupMode {
    Exact,
    #[default]
    NearDuplicate,
}

impl DedupMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "exact" => Some(DedupMode::Exact),
            "near" | "near_duplicate" | "near-duplicate" => Some(DedupMode::NearDuplicate),
            _ => None,
        }
    }
}

/// Lower-cased, trimmed question text.
pub fn exact_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Coarse fingerprint used for near-duplicate detection.
///
/// Stems with equations are keyed on every equation plus the significant
/// words after the last one, so `3x + 7 = 22` asked two ways collides while
/// `If x = 3, what is 2x + 1?` and `If x = 3, what is x^2?` do not.
pub fn signature(text: &str) -> String {
    let mut equations = Vec::new();
    let mut tail_start = 0;
    for m in EQUATION.find_iter(text) {
        equations.push(
            m.as_str()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .trim_end_matches('.')
                .to_lowercase(),
        );
        tail_start = m.end();
    }

    if equations.is_empty() {
        return format!("kw:{}", significant_words(text).join(" "));
    }

    let tail = significant_words(&text[tail_start..]);
    if tail.is_empty() {
        format!("eq:{}", equations.join("|"))
    } else {
        format!("eq:{};{}", equations.join("|"), tail.join(" "))
    }
}

/// The first few significant words, plus every token carrying a digit.
fn significant_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut words = Vec::new();
    let mut plain = 0;
    for token in WORD.find_iter(&lowered).map(|m| m.as_str()) {
        if token.chars().any(|c| c.is_ascii_digit()) {
            words.push(token.to_string());
        } else if plain < SIGNATURE_WORDS && token.chars().count() > 2 && !STOP_WORDS.contains(&token) {
            words.push(token.to_string());
            plain += 1;
        }
    }
    words
}

/// Drops repeated questions, keeping the first occurrence of each.
pub fn dedup_questions(questions: Vec<Question>, mode: DedupMode) -> Vec<Question> {
    let mut seen_exact = HashSet::new();
    let mut seen_signatures = HashSet::new();
    let before = questions.len();

    let kept: Vec<Question> = questions
        .into_iter()
        .filter(|q| {
            let exact = exact_key(&q.text);
            if exact.is_empty() || seen_exact.contains(&exact) {
                return false;
            }
            if mode == DedupMode::NearDuplicate {
                let sig = signature(&q.text);
                if sig != "kw:" && !seen_signatures.insert(sig) {
                    return false;
                }
            }
            seen_exact.insert(exact);
            true
        })
        .collect();

    if kept.len() < before {
        log::debug!("Removed {} duplicate question(s)", before - kept.len());
    }
    kept
}
