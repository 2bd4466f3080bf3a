// src/llm/anthropic.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{endpoint, http_client, send_timed, Completion, LlmClient};
use crate::config::ClientSettings;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

/// Messages API client. With a prefill, an assistant turn carrying it is
/// sent after the prompt and the reply is stitched back onto it.
pub struct AnthropicClient {
    http: Client,
    url: String,
    settings: ClientSettings,
}

impl AnthropicClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        Ok(Self {
            http: http_client(&settings)?,
            url: endpoint(&settings.base_url, "v1/messages"),
            settings,
        })
    }

    fn request_body(&self) -> Value {
        let s = &self.settings;
        let mut messages = vec![json!({"role": "user", "content": s.prompt})];
        if let Some(prefill) = &s.prefill {
            messages.push(json!({"role": "assistant", "content": prefill}));
        }

        let mut body = json!({
            "model": s.model,
            "max_tokens": s.max_tokens,
            "temperature": s.temperature,
            "messages": messages,
        });
        if let Some(sys) = &s.system_prompt {
            body["system"] = json!(sys);
        }
        body
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn call(&self) -> Result<Completion> {
        let req = self
            .http
            .post(&self.url)
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body());
        let (resp, elapsed): (MessageResponse, f64) = send_timed(req, &self.url).await?;

        let reply = resp
            .content
            .into_iter()
            .next()
            .and_then(|b| b.text)
            .with_context(|| format!("no text block in response from {}", self.url))?;

        let text = match &self.settings.prefill {
            Some(prefill) => format!("{}{}", prefill, reply),
            None => reply,
        };
        Ok(Completion { text, elapsed })
    }
}
