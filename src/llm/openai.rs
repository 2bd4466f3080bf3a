// src/llm/openai.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{endpoint, http_client, send_timed, Completion, LlmClient};
use crate::config::ClientSettings;

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Body for an OpenAI-style `/chat/completions` request.
pub(crate) fn chat_request_body(settings: &ClientSettings) -> Value {
    let mut messages = Vec::with_capacity(2);
    if let Some(sys) = &settings.system_prompt {
        messages.push(json!({"role": "system", "content": sys}));
    }
    messages.push(json!({"role": "user", "content": settings.prompt}));

    let mut body = json!({
        "model": settings.model,
        "messages": messages,
        "max_tokens": settings.max_tokens,
        "temperature": settings.temperature,
    });
    if settings.json_mode {
        body["response_format"] = json!({"type": "json_object"});
    }
    body
}

/// POST a chat completion and return the first choice's text.
pub(crate) async fn chat_completion(
    http: &Client,
    settings: &ClientSettings,
    url: &str,
) -> Result<Completion> {
    let req = http
        .post(url)
        .bearer_auth(&settings.api_key)
        .json(&chat_request_body(settings));
    let (resp, elapsed): (ChatResponse, f64) = send_timed(req, url).await?;

    let text = resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .with_context(|| format!("no message content in response from {}", url))?;
    Ok(Completion { text, elapsed })
}

pub struct OpenAiClient {
    http: Client,
    url: String,
    settings: ClientSettings,
}

impl OpenAiClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        Ok(Self {
            http: http_client(&settings)?,
            url: endpoint(&settings.base_url, "v1/chat/completions"),
            settings,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn call(&self) -> Result<Completion> {
        chat_completion(&self.http, &self.settings, &self.url).await
    }
}
