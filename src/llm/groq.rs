// src/llm/groq.rs

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;

use super::openai::chat_completion;
use super::{endpoint, http_client, Completion, LlmClient};
use crate::config::ClientSettings;

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*?\}").expect("JSON object pattern should compile"));

/// First `{...}` span in `text`, shortest match. Falls back to the whole
/// text so the validator sees it and records the parse failure.
pub fn extract_json_object(text: &str) -> &str {
    JSON_OBJECT.find(text).map_or(text, |m| m.as_str())
}

/// Groq's OpenAI-compatible endpoint. Its models tend to wrap the JSON in
/// prose, so the reply is cut down to the first object.
pub struct GroqClient {
    http: Client,
    url: String,
    settings: ClientSettings,
}

impl GroqClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        Ok(Self {
            http: http_client(&settings)?,
            url: endpoint(&settings.base_url, "openai/v1/chat/completions"),
            settings,
        })
    }
}

#[async_trait]
impl LlmClient for GroqClient {
    fn name(&self) -> &str {
        "groq"
    }

    async fn call(&self) -> Result<Completion> {
        let raw = chat_completion(&self.http, &self.settings, &self.url).await?;
        Ok(Completion {
            text: extract_json_object(&raw.text).to_string(),
            elapsed: raw.elapsed,
        })
    }
}
