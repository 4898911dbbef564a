use std::{sync::Arc, time::Duration};

use crate::{
    config::{Config, ProviderSettings},
    errors::{AppError, AppResult},
    services::{
        llm_client::{CompletionProvider, OpenAiCompatibleProvider},
        question_service::QuestionService,
        tutor_service::TutorService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub question_service: Arc<QuestionService>,
    pub tutor_service: Arc<TutorService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.llm_timeout_secs);
        let qa = build_provider(config.qa_provider.as_ref(), timeout)?;
        let chat = build_provider(config.chat_provider.as_ref(), timeout)?;
        Ok(Self::with_providers(config, qa, chat))
    }

    /// Builds the state around already-constructed providers.
    pub fn with_providers(
        config: Config,
        qa: Option<Arc<dyn CompletionProvider>>,
        chat: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        Self {
            question_service: Arc::new(QuestionService::new(qa, &config)),
            tutor_service: Arc::new(TutorService::new(chat)),
            config: Arc::new(config),
        }
    }
}

fn build_provider(
    settings: Option<&ProviderSettings>,
    timeout: Duration,
) -> AppResult<Option<Arc<dyn CompletionProvider>>> {
    let Some(settings) = settings else {
        return Ok(None);
    };
    if !settings.api_base.starts_with("http://") && !settings.api_base.starts_with("https://") {
        return Err(AppError::ConfigError(format!(
            "LLM_API_BASE must be an http(s) URL, got '{}'",
            settings.api_base
        )));
    }
    let provider = OpenAiCompatibleProvider::new(settings, timeout);
    Ok(Some(Arc::new(provider) as Arc<dyn CompletionProvider>))
}
