use std::sync::Arc;

use crate::config::{Config, ResponseFormatMode};
use crate::constants::prompts::{QA_SYSTEM_PROMPT, QA_TEMPERATURE};
use crate::errors::{AppError, AppResult};
use crate::models::domain::question::QuestionPacketSchema;
use crate::models::domain::{Question, QuestionRequest, QuestionSource};
use crate::services::batching::{fill_batch, BatchCall, BatchPolicy};
use crate::services::dedup::DedupMode;
use crate::services::fallback_bank::fallback_questions;
use crate::services::json_extract::{extract_records, snippet};
use crate::services::llm_client::{
    CompletionProvider, CompletionRequest, PromptMessage, ResponseFormat,
};
use crate::services::normalizer::normalize_all;
use crate::services::prompt_builder::{build_question_prompt, max_tokens_for};

pub struct QuestionService {
    provider: Option<Arc<dyn CompletionProvider>>,
    policy: BatchPolicy,
    dedup_mode: DedupMode,
    response_format: ResponseFormat,
}

impl QuestionService {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>, config: &Config) -> Self {
        Self {
            provider,
            policy: BatchPolicy::default()
                .with_chunk_size(config.question_chunk_size)
                .with_retry_allowance(config.question_retry_allowance),
            dedup_mode: config.dedup_mode,
            response_format: response_format_for(config.response_format),
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Produces up to `request.count` unique questions.
    ///
    /// Without a provider the offline bank answers instead. A partial batch is
    /// a success; only an empty one is an error.
    pub async fn generate(
        &self,
        request: &QuestionRequest,
    ) -> AppResult<(Vec<Question>, QuestionSource)> {
        let Some(provider) = self.provider.as_deref() else {
            log::warn!(
                "No question provider configured; serving offline questions for {} {}",
                request.test_type,
                request.subject
            );
            return Ok((fallback_questions(request), QuestionSource::Fallback));
        };

        let outcome = fill_batch(request.count, &self.policy, self.dedup_mode, move |call| {
            self.ask_once(provider, request, call)
        })
        .await;

        log::info!(
            "Generated {}/{} question(s) for {} {} in {} call(s)",
            outcome.questions.len(),
            request.count,
            request.test_type,
            request.subject,
            outcome.attempts
        );

        if outcome.questions.is_empty() {
            return Err(outcome.last_error.unwrap_or_else(|| {
                AppError::ProviderError("no usable questions".to_string())
            }));
        }

        Ok((outcome.questions, QuestionSource::Model))
    }

    async fn ask_once(
        &self,
        provider: &dyn CompletionProvider,
        request: &QuestionRequest,
        call: BatchCall,
    ) -> AppResult<Vec<Question>> {
        let prompt = build_question_prompt(request, call.count, &call.avoid);
        let completion = CompletionRequest::new(vec![
            PromptMessage::system(QA_SYSTEM_PROMPT),
            PromptMessage::user(prompt),
        ])
        .with_temperature(QA_TEMPERATURE)
        .with_max_tokens(max_tokens_for(call.count))
        .with_response_format(self.response_format.clone());

        let text = provider.complete(&completion).await?;

        let records = extract_records(&text).inspect_err(|err| {
            log::warn!("Could not read question packet: {} (output: {})", err, snippet(&text));
        })?;

        let questions = normalize_all(&records, &request.subject);
        if questions.is_empty() && !records.is_empty() {
            log::warn!("All {} question record(s) were unusable", records.len());
        }
        Ok(questions)
    }
}

fn response_format_for(mode: ResponseFormatMode) -> ResponseFormat {
    match mode {
        ResponseFormatMode::Text => ResponseFormat::Text,
        ResponseFormatMode::JsonObject => ResponseFormat::JsonObject,
        ResponseFormatMode::JsonSchema => {
            match serde_json::to_value(schemars::schema_for!(QuestionPacketSchema)) {
                Ok(schema) => ResponseFormat::JsonSchema(schema),
                Err(err) => {
                    log::warn!("Could not build question schema, using json_object: {}", err);
                    ResponseFormat::JsonObject
                }
            }
        }
    }
}
