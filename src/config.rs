use std::{env, time::Duration};

use crate::error::{PlannerError, Result};

pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/v1";

/// Candidate models tried in order after the preferred model, if any.
pub const DEFAULT_MODELS: [&str; 4] = [
    "openai/gpt-oss-20b:together",
    "Qwen/Qwen2.5-72B-Instruct",
    "meta-llama/Meta-Llama-3.1-8B-Instruct",
    "mistralai/Mixtral-8x7B-Instruct-v0.1",
];

pub const DEFAULT_TEMPERATURE: f64 = 0.6;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const TOKEN_VARS: [&str; 2] = ["HF_TOKEN", "VITE_HF_TOKEN"];
const MODEL_VARS: [&str; 2] = ["HF_MODEL", "VITE_HF_MODEL"];
const BASE_URL_VAR: &str = "HF_BASE_URL";

/// Settings for the completion client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_key: String,
    pub preferred_model: Option<String>,
    /// Fallback candidates, tried after the preferred model
    pub models: Vec<String>,
    pub base_url: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            preferred_model: None,
            models: DEFAULT_MODELS.iter().map(|model| model.to_string()).collect(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Snapshot the credential and overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        let api_key = first_non_empty(&TOKEN_VARS).ok_or_else(|| {
            PlannerError::Config(
                "HF_TOKEN environment variable must be set before requesting a completion"
                    .to_string(),
            )
        })?;

        Ok(Self::new(api_key).with_env_overrides())
    }

    /// Apply the optional model and base-URL variables, leaving the key alone.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| env::var(name).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(model) = first_non_empty_with(&MODEL_VARS, &lookup) {
            self.preferred_model = Some(model);
        }
        if let Some(base_url) = first_non_empty_with(&[BASE_URL_VAR], &lookup) {
            self.base_url = base_url;
        }
        self
    }

    pub fn with_preferred_model(mut self, model: impl Into<String>) -> Self {
        self.preferred_model = Some(model.into());
        self
    }

    /// Replace the fallback candidate list.
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Ordered candidate list: preferred model first, then the defaults.
    pub fn candidate_models(&self) -> Vec<String> {
        let mut models: Vec<String> = Vec::with_capacity(self.models.len() + 1);
        if let Some(preferred) = self.preferred_model.as_deref().map(str::trim) {
            if !preferred.is_empty() {
                models.push(preferred.to_string());
            }
        }
        for model in &self.models {
            let model = model.trim();
            if !model.is_empty() && !models.iter().any(|existing| existing == model) {
                models.push(model.to_string());
            }
        }
        models
    }
}

fn first_non_empty(vars: &[&str]) -> Option<String> {
    first_non_empty_with(vars, |name| env::var(name).ok())
}

fn first_non_empty_with(vars: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    vars.iter()
        .filter_map(|&name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
