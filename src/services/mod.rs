pub mod batching;
pub mod dedup;
pub mod fallback_bank;
pub mod json_extract;
pub mod llm_client;
pub mod normalizer;
pub mod prompt_builder;
pub mod question_service;
pub mod tutor_service;
