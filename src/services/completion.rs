use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    config::ClientConfig,
    error::{PlannerError, Result},
};

/// System message sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "You are a travel planner. You MUST respond with one valid JSON object only. No explanations, no markdown, no code fences. Follow the exact schema provided by the user.";

/// Text returned by the first model that answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub model: String,
    pub content: String,
}

/// Anything that can turn a prompt into raw model text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Completion>;
}

/// Chat-completions client that walks the candidate models in order.
#[derive(Clone, Debug)]
pub struct CompletionClient {
    config: ClientConfig,
}

impl CompletionClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Result<Self> {
        ClientConfig::from_env().map(Self::new)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// One linear pass over the candidates; the first success wins.
    ///
    /// A missing credential fails before any request is made. Individual model
    /// failures are logged and only the last one is reported, wrapped in
    /// [`PlannerError::AllModelsFailed`].
    pub async fn request_completion(&self, prompt: &str) -> Result<Completion> {
        if !self.config.has_credential() {
            return Err(PlannerError::Config(
                "an API token is required to request a completion".to_string(),
            ));
        }

        let models = self.config.candidate_models();
        if models.is_empty() {
            return Err(PlannerError::Config(
                "no candidate models configured".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|err| PlannerError::Http(format!("Failed to build HTTP client: {err}")))?;

        let mut last_error = None;
        for (index, model) in models.iter().enumerate() {
            match self.call_model(&http, model, prompt).await {
                Ok(content) => {
                    info!(
                        target: "tripwiz::client",
                        model = %model,
                        attempt = index + 1,
                        chars = content.len(),
                        "completion received"
                    );
                    return Ok(Completion {
                        model: model.clone(),
                        content,
                    });
                }
                Err(err) => {
                    warn!(
                        target: "tripwiz::client",
                        model = %model,
                        attempt = index + 1,
                        error = %err,
                        "model failed, trying next candidate"
                    );
                    last_error = Some(err);
                }
            }
        }

        Err(PlannerError::AllModelsFailed {
            attempts: models.len(),
            last: Box::new(last_error.unwrap_or_else(|| {
                PlannerError::InvalidResponse("no candidate produced a response".to_string())
            })),
        })
    }

    async fn call_model(&self, http: &reqwest::Client, model: &str, prompt: &str) -> Result<String> {
        let body = ChatCompletionRequest::new(
            model,
            vec![
                json!({"role": "system", "content": SYSTEM_INSTRUCTION}),
                json!({"role": "user", "content": prompt}),
            ],
        )
        .with_temperature(self.config.temperature)
        .with_max_tokens(Some(self.config.max_tokens))
        .with_response_format(json!({"type": "json_object"}))
        .into_value();

        let response = http
            .post(build_chat_url(&self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| PlannerError::Http(format!("HTTP request failed: {err}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|err| PlannerError::Http(format!("Failed to read response: {err}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&response_text)
                .ok()
                .and_then(|json| {
                    json.get("error")
                        .and_then(|error| error.get("message"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or(response_text);
            return Err(PlannerError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let response_json: Value = serde_json::from_str(&response_text).map_err(|err| {
            PlannerError::InvalidResponse(format!("response body is not JSON: {err}"))
        })?;

        extract_content(&response_json)
    }
}

#[async_trait]
impl CompletionProvider for CompletionClient {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        self.request_completion(prompt).await
    }
}

/// Pull `choices[0].message.content` out of a chat-completions envelope.
///
/// A missing or `null` content is an empty reply, not an error; a missing
/// `choices` array or an in-band `error` object is.
fn extract_content(response: &Value) -> Result<String> {
    if let Some(error) = response.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(PlannerError::InvalidResponse(format!("API error: {message}")));
    }

    let choice = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| PlannerError::InvalidResponse("response has no choices".to_string()))?;

    Ok(choice
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}

pub fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    stream: bool,
    response_format: Option<Value>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            stream: false,
            response_format: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_response_format(mut self, response_format: Value) -> Self {
        self.response_format = Some(response_format);
        self
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
            "stream": self.stream,
        });

        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(response_format) = self.response_format {
            body["response_format"] = response_format;
        }

        body
    }
}
