// SPDX-License-Identifier: MIT

//! Settings - YAML file plus environment overrides
//!
//! Every key is optional; missing keys take their defaults. After the file is
//! read, `QUILL_MODEL`, `QUILL_TEMPERATURE` and `QUILL_PORT` override it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::QuillError;
use crate::llm::catalog::DEFAULT_MODEL;
use crate::llm::GenerationConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Output budget for translation calls
    pub translation_max_output_tokens: u32,
    pub request_timeout_secs: u64,
    pub host: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_output_tokens: 2048,
            translation_max_output_tokens: 8192,
            request_timeout_secs: 60,
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file, then apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, QuillError> {
        let content = fs::read_to_string(path)?;
        let mut settings = Self::parse_yaml(&content)?;
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Settings from the file if given, defaults otherwise.
    /// Environment overrides apply in both cases.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, QuillError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let mut settings = Self::default();
                settings.apply_overrides(|key| std::env::var(key).ok())?;
                Ok(settings)
            }
        }
    }

    pub fn parse_yaml(content: &str) -> Result<Self, QuillError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), QuillError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("QUILL_MODEL").filter(|m| !m.is_empty()) {
            self.model = model;
        }
        if let Some(raw) = lookup("QUILL_TEMPERATURE") {
            self.temperature = raw.parse().map_err(|_| {
                QuillError::config(format!("QUILL_TEMPERATURE: invalid value '{}'", raw))
            })?;
        }
        if let Some(raw) = lookup("QUILL_PORT") {
            self.port = raw.parse().map_err(|_| {
                QuillError::config(format!("QUILL_PORT: invalid value '{}'", raw))
            })?;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Config for title and content calls.
    ///
    /// Temperature is left unset so the model's own setting, chosen per request, applies.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: None,
            max_output_tokens: Some(self.max_output_tokens),
            timeout: Some(self.request_timeout()),
        }
    }

    /// Config for translation calls, with the larger output budget
    pub fn translation_config(&self) -> GenerationConfig {
        self.generation_config()
            .with_max_output_tokens(self.translation_max_output_tokens)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
