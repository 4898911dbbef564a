use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::constants::prompts::{
    CHAT_MAX_TOKENS, CHAT_TEMPERATURE, TUTOR_EMPTY_REPLY_MESSAGE, TUTOR_SYSTEM_PROMPT,
    TUTOR_UNAVAILABLE_MESSAGE,
};
use crate::models::domain::{ChatRole, ChatTurn};
use crate::services::json_extract::strip_code_fences;
use crate::services::llm_client::{CompletionProvider, CompletionRequest, PromptMessage};

/// Most recent history turns forwarded to the provider.
pub const HISTORY_WINDOW: usize = 12;

static MATH_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\$[\s\S]*?\$\$|\$[^$\s](?:[^$\n]*[^$\s])?\$").expect("MATH_SPAN is a valid regex pattern")
});
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*").expect("HEADING is a valid regex pattern"));
static BOLD_STARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("BOLD_STARS is a valid regex pattern"));
static BOLD_UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__([^_\n]+)__").expect("BOLD_UNDERSCORES is a valid regex pattern"));
static ITALIC_STARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\n]+)\*").expect("ITALIC_STARS is a valid regex pattern"));

#[derive(Debug, Clone)]
pub struct TutorReply {
    pub turn: ChatTurn,
    /// True when a static message was served instead of a model reply.
    pub degraded: bool,
}

impl TutorReply {
    fn degraded(message: &str) -> Self {
        Self {
            turn: ChatTurn::assistant(message),
            degraded: true,
        }
    }
}

pub struct TutorService {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl TutorService {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { provider }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Answers one student message. Never fails: provider trouble yields a
    /// static message marked as degraded.
    pub async fn reply(&self, message: &str, history: &[ChatTurn]) -> TutorReply {
        let Some(provider) = self.provider.as_deref() else {
            log::warn!("No chat provider configured; serving static tutor reply");
            return TutorReply::degraded(TUTOR_UNAVAILABLE_MESSAGE);
        };

        let request = CompletionRequest::new(build_messages(message, history))
            .with_temperature(CHAT_TEMPERATURE)
            .with_max_tokens(CHAT_MAX_TOKENS);

        match provider.complete(&request).await {
            Ok(raw) => {
                let text = to_plain_text(&raw);
                if text.is_empty() {
                    log::warn!("Tutor provider returned an empty reply");
                    return TutorReply::degraded(TUTOR_EMPTY_REPLY_MESSAGE);
                }
                TutorReply {
                    turn: ChatTurn::assistant(text),
                    degraded: false,
                }
            }
            Err(err) => {
                log::error!("Tutor reply failed: {}", err);
                TutorReply::degraded(TUTOR_UNAVAILABLE_MESSAGE)
            }
        }
    }
}

fn build_messages(message: &str, history: &[ChatTurn]) -> Vec<PromptMessage> {
    let turns: Vec<&ChatTurn> = history
        .iter()
        .filter(|turn| !turn.text.trim().is_empty())
        .collect();
    let recent = &turns[turns.len().saturating_sub(HISTORY_WINDOW)..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(PromptMessage::system(TUTOR_SYSTEM_PROMPT));
    messages.extend(recent.iter().map(|turn| match turn.role {
        ChatRole::User => PromptMessage::user(turn.text.clone()),
        ChatRole::Assistant => PromptMessage::assistant(turn.text.clone()),
    }));
    messages.push(PromptMessage::user(message.trim()));
    messages
}

/// Strips markdown from a tutor reply while leaving `$…$` math untouched.
pub fn to_plain_text(raw: &str) -> String {
    let unfenced = strip_code_fences(raw).replace('`', "");
    let unheaded = HEADING.replace_all(&unfenced, "");

    let mut out = String::with_capacity(unheaded.len());
    let mut last = 0;
    for span in MATH_SPAN.find_iter(&unheaded) {
        out.push_str(&strip_emphasis(&unheaded[last..span.start()]));
        out.push_str(span.as_str());
        last = span.end();
    }
    out.push_str(&strip_emphasis(&unheaded[last..]));
    out.trim().to_string()
}

fn keep_inner(caps: &Captures) -> String {
    caps[1].to_string()
}

fn strip_emphasis(text: &str) -> String {
    let text = BOLD_STARS.replace_all(text, keep_inner);
    let text = BOLD_UNDERSCORES.replace_all(&text, keep_inner);
    ITALIC_STARS.replace_all(&text, keep_inner).into_owned()
}
