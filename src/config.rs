use std::{env, path::PathBuf};

use secrecy::SecretString;

use crate::services::dedup::DedupMode;

/// Which OpenAI-compatible backend the server talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    Together,
}

impl ProviderKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "gemini" | "google" => Some(ProviderKind::Gemini),
            "together" | "togetherai" | "together-ai" => Some(ProviderKind::Together),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Together => "together",
        }
    }

    fn env_prefix(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI",
            ProviderKind::Gemini => "GEMINI",
            ProviderKind::Together => "TOGETHER",
        }
    }

    pub fn default_api_base(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            ProviderKind::Together => "https://api.together.xyz/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Gemini => "gemini-2.5-flash",
            ProviderKind::Together => "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo",
        }
    }
}

/// Connection details for one use of the provider (question generation or chat).
#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: SecretString,
    pub api_base: String,
    pub model: String,
}

/// How question-generation calls ask the provider to shape its output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseFormatMode {
    Text,
    JsonObject,
    JsonSchema,
}

impl ResponseFormatMode {
    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "text" => Some(ResponseFormatMode::Text),
            "json_object" | "json" => Some(ResponseFormatMode::JsonObject),
            "json_schema" | "schema" => Some(ResponseFormatMode::JsonSchema),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub static_dir: PathBuf,
    pub provider: ProviderKind,
    pub qa_provider: Option<ProviderSettings>,
    pub chat_provider: Option<ProviderSettings>,
    pub response_format: ResponseFormatMode,
    pub llm_timeout_secs: u64,
    pub question_chunk_size: usize,
    pub question_retry_allowance: u32,
    pub dedup_mode: DedupMode,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = get("LLM_PROVIDER")
            .and_then(|name| {
                let kind = ProviderKind::from_name(&name);
                if kind.is_none() {
                    log::warn!("Unknown LLM_PROVIDER '{}', using gemini", name);
                }
                kind
            })
            .unwrap_or(ProviderKind::Gemini);

        let prefix = provider.env_prefix();
        let shared_key = get(&format!("{}_API_KEY", prefix));
        let qa_key = get(&format!("{}_QA_API_KEY", prefix)).or_else(|| shared_key.clone());
        let chat_key = get(&format!("{}_CHAT_API_KEY", prefix)).or_else(|| shared_key.clone());

        let api_base = get("LLM_API_BASE").unwrap_or_else(|| provider.default_api_base().to_string());

        let settings = |key: Option<String>, model_var: &str| {
            key.map(|api_key| ProviderSettings {
                kind: provider,
                api_key: SecretString::from(api_key),
                api_base: api_base.clone(),
                model: get(model_var).unwrap_or_else(|| provider.default_model().to_string()),
            })
        };

        Self {
            web_server_host: get("WEB_SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_server_port: get("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(10000),
            static_dir: PathBuf::from(get("STATIC_DIR").unwrap_or_else(|| "dist".to_string())),
            provider,
            qa_provider: settings(qa_key, "LLM_QA_MODEL"),
            chat_provider: settings(chat_key, "LLM_CHAT_MODEL"),
            response_format: get("LLM_RESPONSE_FORMAT")
                .and_then(|f| ResponseFormatMode::from_name(&f))
                .unwrap_or(ResponseFormatMode::Text),
            llm_timeout_secs: get("LLM_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .filter(|s| *s > 0)
                .unwrap_or(60),
            question_chunk_size: get("QUESTION_CHUNK_SIZE")
                .and_then(|s| s.trim().parse().ok())
                .filter(|s| *s > 0)
                .unwrap_or(5),
            question_retry_allowance: get("QUESTION_RETRY_ALLOWANCE")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(2),
            dedup_mode: get("DEDUP_MODE")
                .and_then(|m| DedupMode::from_name(&m))
                .unwrap_or(DedupMode::NearDuplicate),
        }
    }

    /// A configuration with no provider keys. Question generation is served
    /// from the offline bank and chat replies are degraded.
    pub fn offline() -> Self {
        Self::from_lookup(|_| None)
    }

    /// Logs which credentials are present without printing them.
    pub fn log_startup_summary(&self) {
        log::info!("LLM provider: {}", self.provider.name());
        log::info!(
            "Has question-generation key? {}",
            self.qa_provider.is_some()
        );
        log::info!("Has chat key? {}", self.chat_provider.is_some());
        if let Some(qa) = &self.qa_provider {
            log::info!("Question model: {} via {}", qa.model, qa.api_base);
        }
        if let Some(chat) = &self.chat_provider {
            log::info!("Chat model: {} via {}", chat.model, chat.api_base);
        }
        log::info!("Serving static from: {}", self.static_dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_offline_config_defaults() {
        let config = Config::offline();

        assert_eq!(config.provider, ProviderKind::Gemini);
        assert!(config.qa_provider.is_none());
        assert!(config.chat_provider.is_none());
        assert_eq!(config.web_server_port, 10000);
        assert_eq!(config.static_dir, PathBuf::from("dist"));
        assert_eq!(config.response_format, ResponseFormatMode::Text);
        assert_eq!(config.question_chunk_size, 5);
        assert_eq!(config.dedup_mode, DedupMode::NearDuplicate);
    }

    #[test]
    fn test_shared_key_feeds_both_uses() {
        let config = config_with(&[("LLM_PROVIDER", "together"), ("TOGETHER_API_KEY", "tk")]);

        let qa = config.qa_provider.expect("qa provider");
        let chat = config.chat_provider.expect("chat provider");
        assert_eq!(qa.kind, ProviderKind::Together);
        assert_eq!(qa.api_key.expose_secret(), "tk");
        assert_eq!(chat.api_base, "https://api.together.xyz/v1");
        assert_eq!(chat.model, ProviderKind::Together.default_model());
    }

    #[test]
    fn test_split_gemini_keys_and_models() {
        let config = config_with(&[
            ("GEMINI_QA_API_KEY", "qa-key"),
            ("GEMINI_CHAT_API_KEY", "chat-key"),
            ("LLM_QA_MODEL", "gemini-2.5-pro"),
        ]);

        let qa = config.qa_provider.expect("qa provider");
        let chat = config.chat_provider.expect("chat provider");
        assert_eq!(qa.api_key.expose_secret(), "qa-key");
        assert_eq!(qa.model, "gemini-2.5-pro");
        assert_eq!(chat.api_key.expose_secret(), "chat-key");
        assert_eq!(chat.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let config = config_with(&[
            ("LLM_PROVIDER", "llama-local"),
            ("PORT", "not-a-port"),
            ("LLM_RESPONSE_FORMAT", "xml"),
            ("QUESTION_CHUNK_SIZE", "0"),
        ]);

        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.web_server_port, 10000);
        assert_eq!(config.response_format, ResponseFormatMode::Text);
        assert_eq!(config.question_chunk_size, 5);
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = config_with(&[("LLM_PROVIDER", "openai"), ("OPENAI_API_KEY", "  ")]);
        assert!(config.qa_provider.is_none());
    }

    #[test]
    fn test_overrides_are_read() {
        let config = config_with(&[
            ("OPENAI_API_KEY", "sk-openai-test"),
            ("LLM_PROVIDER", "openai"),
            ("LLM_API_BASE", "http://localhost:8081/v1"),
            ("LLM_RESPONSE_FORMAT", "json_schema"),
            ("DEDUP_MODE", "exact"),
            ("PORT", "8080"),
        ]);

        assert_eq!(config.web_server_port, 8080);
        assert_eq!(config.response_format, ResponseFormatMode::JsonSchema);
        assert_eq!(config.dedup_mode, DedupMode::Exact);
        let qa = config.qa_provider.expect("qa provider");
        assert_eq!(qa.api_base, "http://localhost:8081/v1");
    }
}
