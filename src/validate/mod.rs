// src/validate/mod.rs

use serde_json::Value;
use std::fmt;

/// Key every response must carry unless configured otherwise.
pub const DEFAULT_REQUIRED_KEY: &str = "keywords";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Ng,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Ng => "NG",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the validator kept of the response. `Raw` is the untouched input
/// when it did not parse as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedData {
    Structured(Value),
    Raw(String),
}

impl ParsedData {
    /// Cell text for the `data` column: compact JSON or the raw input.
    pub fn render(&self) -> String {
        match self {
            ParsedData::Structured(v) => v.to_string(),
            ParsedData::Raw(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub status: Status,
    pub data: ParsedData,
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Cell text for the `error` column. Empty when the response passed,
    /// a JSON array of messages otherwise.
    pub fn render_errors(&self) -> String {
        if self.errors.is_empty() {
            String::new()
        } else {
            serde_json::to_string(&self.errors).unwrap_or_else(|_| self.errors.join("; "))
        }
    }
}

/// One benchmark row: a validation outcome plus the call latency in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub validation: ValidationResult,
    pub time: f64,
}

impl ResultRecord {
    pub fn new(validation: ValidationResult, time: f64) -> Self {
        Self { validation, time }
    }

    pub fn is_ok(&self) -> bool {
        self.validation.status == Status::Ok
    }
}

/// Checks that a response is a JSON object carrying every required key.
#[derive(Debug, Clone)]
pub struct ResponseValidator {
    required_keys: Vec<String>,
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::new([DEFAULT_REQUIRED_KEY])
    }
}

impl ResponseValidator {
    pub fn new<I, S>(required_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_keys: required_keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn required_keys(&self) -> &[String] {
        &self.required_keys
    }

    pub fn validate(&self, raw: &str) -> ValidationResult {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                return ValidationResult {
                    status: Status::Ng,
                    data: ParsedData::Raw(raw.to_string()),
                    errors: vec![e.to_string()],
                }
            }
        };

        // `get` is None on non-objects, so arrays and scalars miss every key
        let errors: Vec<String> = self
            .required_keys
            .iter()
            .filter(|key| value.get(key.as_str()).is_none())
            .map(|key| format!("Key '{}' is missing.", key))
            .collect();

        let status = if errors.is_empty() {
            Status::Ok
        } else {
            Status::Ng
        };

        ValidationResult {
            status,
            data: ParsedData::Structured(value),
            errors,
        }
    }
}
