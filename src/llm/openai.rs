// SPDX-License-Identifier: MIT

//! OpenAI Model - chat-completions API implementation

use super::{GenerationConfig, Model, ModelFactory};
use crate::error::{CapabilityError, QuillError};
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::env;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat model
pub struct OpenAIModel {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
    temperature: f32,
}

impl OpenAIModel {
    /// Create a new OpenAIModel
    ///
    /// Requires `OPENAI_API_KEY` environment variable to be set.
    /// Optionally uses `OPENAI_BASE_URL` for custom endpoints.
    pub fn new(model_name: impl Into<String>, temperature: f32) -> Result<Self, QuillError> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| QuillError::config("OPENAI_API_KEY not found in environment"))?;
        let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self::with_endpoint(api_key, base_url, model_name, temperature))
    }

    /// Create a model against an explicit endpoint
    pub fn with_endpoint(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model_name: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model_name: model_name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            temperature,
        }
    }

    fn build_body(&self, prompt: &str, config: &GenerationConfig) -> serde_json::Value {
        let mut body = json!({
            "model": self.model_name,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": config.temperature.unwrap_or(self.temperature),
        });

        // gpt-5 models reject the older `max_tokens` parameter
        if let Some(max_tokens) = config.max_output_tokens {
            body["max_completion_tokens"] = json!(max_tokens);
        }

        body
    }

    /// Extract the assistant text from a chat-completions response
    fn parse_response(response: &serde_json::Value) -> Result<String, CapabilityError> {
        let choice = response["choices"]
            .as_array()
            .and_then(|c| c.first())
            .ok_or_else(|| CapabilityError::unknown("No choices in OpenAI response"))?;

        choice["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CapabilityError::unknown("OpenAI response has no text content"))
    }
}

/// Map a non-success HTTP status onto the capability error taxonomy
fn classify_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> CapabilityError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CapabilityError::Unauthorized(body.to_string())
        }
        StatusCode::TOO_MANY_REQUESTS => CapabilityError::RateLimited {
            retry_after_secs: retry_after,
        },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            CapabilityError::unknown(format!("upstream timeout ({}): {}", status, body))
        }
        _ => CapabilityError::unknown(format!("OpenAI API error ({}): {}", status, body)),
    }
}

#[async_trait]
impl Model for OpenAIModel {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, CapabilityError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(prompt, config);

        log::debug!(
            "OpenAI request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body);
        if let Some(timeout) = config.timeout {
            request = request.timeout(timeout);
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CapabilityError::Timeout(config.timeout.unwrap_or_default())
            } else {
                CapabilityError::unknown(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let retry_after = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_status(status, retry_after, &text));
        }

        let resp_json: serde_json::Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                CapabilityError::Timeout(config.timeout.unwrap_or_default())
            } else {
                CapabilityError::unknown(e.to_string())
            }
        })?;
        log::debug!("OpenAI response: {}", resp_json);

        Self::parse_response(&resp_json)
    }
}

/// Builds [`OpenAIModel`]s from the process environment
#[derive(Debug, Clone, Default)]
pub struct OpenAIFactory;

impl ModelFactory for OpenAIFactory {
    fn create(&self, model: &str, temperature: f32) -> Result<Arc<dyn Model>, QuillError> {
        Ok(Arc::new(OpenAIModel::new(model, temperature)?))
    }
}
