// src/llm/mod.rs

pub mod anthropic;
pub mod groq;
pub mod openai;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::debug;

use crate::config::{ClientSettings, Provider};

pub use anthropic::AnthropicClient;
pub use groq::GroqClient;
pub use openai::OpenAiClient;

/// Text returned by one remote call and how long the call took.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    /// Seconds from sending the request to having the whole body.
    pub elapsed: f64,
}

/// One vendor's chat endpoint, pre-loaded with prompt, model and key.
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn name(&self) -> &str;

    /// Issue exactly one request. Transport, status and body-shape failures
    /// are returned as errors.
    async fn call(&self) -> Result<Completion>;
}

/// Pick the client variant for the configured provider.
pub fn build_client(settings: &ClientSettings) -> Result<Box<dyn LlmClient>> {
    let client: Box<dyn LlmClient> = match settings.provider {
        Provider::Openai => Box::new(OpenAiClient::new(settings.clone())?),
        Provider::Anthropic => Box::new(AnthropicClient::new(settings.clone())?),
        Provider::Groq => Box::new(GroqClient::new(settings.clone())?),
    };
    Ok(client)
}

fn http_client(settings: &ClientSettings) -> Result<Client> {
    Client::builder()
        .timeout(settings.timeout)
        .build()
        .context("building HTTP client")
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Send `req`, wait for the full body, and decode it as `T`. The elapsed
/// time covers send through body read.
async fn send_timed<T: DeserializeOwned>(req: RequestBuilder, url: &str) -> Result<(T, f64)> {
    debug!(url = %url, "sending request");
    let start = Instant::now();
    let resp = req
        .send()
        .await
        .with_context(|| format!("POST {}", url))?;
    let status = resp.status();
    let body = resp
        .text()
        .await
        .with_context(|| format!("reading body from {}", url))?;
    let elapsed = start.elapsed().as_secs_f64();
    debug!(url = %url, status = %status, elapsed, "response received");

    if !status.is_success() {
        bail!("{} returned {}: {}", url, status, body);
    }
    let parsed = serde_json::from_str(&body)
        .with_context(|| format!("decoding response from {}", url))?;
    Ok((parsed, elapsed))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        assert_eq!(
            endpoint("https://api.openai.com/", "/v1/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            endpoint("http://127.0.0.1:9000", "v1/messages"),
            "http://127.0.0.1:9000/v1/messages"
        );
    }

    #[test]
    fn test_build_client_by_provider() {
        for (provider, name) in [
            (Provider::Openai, "openai"),
            (Provider::Anthropic, "anthropic"),
            (Provider::Groq, "groq"),
        ] {
            let s = test_support::settings(provider, "http://localhost:1");
            assert_eq!(build_client(&s).unwrap().name(), name);
        }
    }
}
