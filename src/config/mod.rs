// src/config/mod.rs

pub mod prompts;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use serde::Deserialize;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

use crate::driver::RunPlan;
use crate::validate::{ResponseValidator, DEFAULT_REQUIRED_KEY};
pub use prompts::Prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    #[default]
    Openai,
    Anthropic,
    Groq,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Openai => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Groq => "groq",
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::Openai => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Openai => "https://api.openai.com",
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::Groq => "https://api.groq.com",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Openai => "gpt-3.5-turbo-0125",
            Provider::Anthropic => "claude-3-haiku-20240307",
            Provider::Groq => "gemma-7b-it",
        }
    }

    fn default_prompt(&self) -> Prompt {
        match self {
            Provider::Openai => Prompt::ClaudeSynonymJa,
            Provider::Anthropic => Prompt::ClaudeExtractJa,
            Provider::Groq => Prompt::ExtractJa,
        }
    }

    fn default_system_prompt(&self) -> Option<&'static str> {
        match self {
            Provider::Openai => Some(prompts::RESEARCHER_JSON_SYSTEM),
            Provider::Anthropic => Some(prompts::RESEARCHER_SYSTEM),
            Provider::Groq => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "gpt" => Ok(Provider::Openai),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "groq" => Ok(Provider::Groq),
            other => bail!("unknown provider {:?}", other),
        }
    }
}

/// Benchmark settings as read from YAML. Unset fields fall back to the
/// provider's defaults when resolved.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    pub provider: Provider,
    pub model: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub system_prompt: Option<String>,
    pub prompt: Option<Prompt>,
    pub prompt_text: Option<String>,
    pub prefill: Option<String>,
    pub json_mode: Option<bool>,
    pub required_keys: Vec<String>,
    pub iterations: usize,
    pub delay_secs: f64,
    pub output: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            temperature: 0.0,
            max_tokens: 1000,
            api_key: None,
            base_url: None,
            timeout_secs: 60,
            system_prompt: None,
            prompt: None,
            prompt_text: None,
            prefill: None,
            json_mode: None,
            required_keys: vec![DEFAULT_REQUIRED_KEY.to_string()],
            iterations: 100,
            delay_secs: 2.0,
            output: None,
        }
    }
}

/// Everything a client needs to issue its one request.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub provider: Provider,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub system_prompt: Option<String>,
    pub prompt: String,
    pub prefill: Option<String>,
    pub json_mode: bool,
}

impl BenchConfig {
    /// Read a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Apply `KWBENCH_*` overrides and pick up the provider's API key from
    /// the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|k| std::env::var(k).ok())
    }

    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(p) = lookup("KWBENCH_PROVIDER") {
            self.provider = p.parse()?;
        }
        if let Some(m) = lookup("KWBENCH_MODEL") {
            self.model = Some(m);
        }
        if let Some(n) = lookup("KWBENCH_ITERATIONS") {
            self.iterations = n
                .trim()
                .parse()
                .with_context(|| format!("KWBENCH_ITERATIONS={:?}", n))?;
        }
        if let Some(d) = lookup("KWBENCH_DELAY_SECS") {
            self.delay_secs = d
                .trim()
                .parse()
                .with_context(|| format!("KWBENCH_DELAY_SECS={:?}", d))?;
        }
        if let Some(o) = lookup("KWBENCH_OUTPUT") {
            self.output = Some(PathBuf::from(o));
        }
        if self.api_key.is_none() {
            self.api_key = lookup(self.provider.api_key_var()).filter(|k| !k.is_empty());
        }
        Ok(())
    }

    pub fn client_settings(&self) -> Result<ClientSettings> {
        let provider = self.provider;
        let api_key = self.api_key.clone().ok_or_else(|| {
            anyhow!(
                "no API key for {}; set api_key or {}",
                provider,
                provider.api_key_var()
            )
        })?;

        let base_url = self
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string());
        Url::parse(&base_url).with_context(|| format!("parsing base_url {:?}", base_url))?;

        let prompt = match (&self.prompt_text, self.prompt) {
            (Some(text), _) => text.clone(),
            (None, Some(preset)) => preset.text().to_string(),
            (None, None) => provider.default_prompt().text().to_string(),
        };

        let system_prompt = self
            .system_prompt
            .clone()
            .or_else(|| provider.default_system_prompt().map(str::to_string))
            .filter(|s| !s.is_empty());

        let prefill = match provider {
            Provider::Anthropic => Some(self.prefill.clone().unwrap_or_else(|| "{".to_string())),
            _ => None,
        }
        .filter(|s| !s.is_empty());

        Ok(ClientSettings {
            provider,
            model: self
                .model
                .clone()
                .unwrap_or_else(|| provider.default_model().to_string()),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            api_key,
            base_url,
            timeout: Duration::from_secs(self.timeout_secs),
            system_prompt,
            prompt,
            prefill,
            json_mode: self.json_mode.unwrap_or(provider == Provider::Openai),
        })
    }

    pub fn run_plan(&self) -> Result<RunPlan> {
        let delay = Duration::try_from_secs_f64(self.delay_secs)
            .with_context(|| format!("delay_secs {}", self.delay_secs))?;
        Ok(RunPlan {
            iterations: self.iterations,
            delay,
        })
    }

    pub fn validator(&self) -> ResponseValidator {
        ResponseValidator::new(self.required_keys.iter().cloned())
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stamp = Local::now().format("%Y%m%d_%H%M%S");
            PathBuf::from("results").join(format!("{}_{}.csv", self.provider, stamp))
        })
    }
}
