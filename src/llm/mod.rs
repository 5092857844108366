// SPDX-License-Identifier: MIT

//! Model module - the text-generation capability consumed by pipeline nodes
//!
//! This module provides the core [`Model`] trait and shared types.
//! - [openai] - OpenAI chat-completions implementation
//! - [catalog] - the models a caller may pick from

pub mod catalog;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{CapabilityError, QuillError};

/// Configuration for a single generation call
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    /// Per-call deadline. `None` leaves the call unbounded.
    #[serde(default, with = "duration_secs")]
    pub timeout: Option<Duration>,
}

impl GenerationConfig {
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Text-generation capability: given a prompt, returns generated text or fails.
///
/// Implementations must be stateless per call so one instance can serve
/// concurrent runs.
#[async_trait]
pub trait Model: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, CapabilityError>;
}

/// Builds a model for a requested model id and temperature
pub trait ModelFactory: Send + Sync {
    fn create(&self, model: &str, temperature: f32) -> Result<Arc<dyn Model>, QuillError>;
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}
