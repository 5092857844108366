// SPDX-License-Identifier: MIT

//! Models a caller may request, with human-readable names

use serde::Serialize;

/// The only provider the catalog serves
pub const PROVIDER: &str = "openai";

/// Model used when a request does not name one
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// A model entry as listed by `GET /models`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: &'static str,
}

const MODELS: &[(&str, &str)] = &[
    ("gpt-5", "GPT-5 - Latest Generation"),
    ("gpt-5-mini", "GPT-5 Mini - Fast & Latest"),
    ("gpt-4.1", "GPT-4.1 - Enhanced Coding & Long Context"),
    ("gpt-4.1-mini", "GPT-4.1 Mini - Fast & Efficient"),
    ("gpt-4.1-nano", "GPT-4.1 Nano - Lightweight"),
    ("gpt-4o", "GPT-4o - High Quality"),
    ("gpt-4o-mini", "GPT-4o Mini - Fast & Efficient"),
    ("gpt-3.5-turbo", "GPT-3.5 Turbo - Fast & Cost-Effective"),
];

/// All known models, in display order
pub fn available_models() -> Vec<ModelInfo> {
    MODELS
        .iter()
        .map(|&(id, name)| ModelInfo {
            id,
            name,
            provider: PROVIDER,
        })
        .collect()
}

/// Human-readable name for a model id; unknown ids are echoed back
pub fn display_name(model: &str) -> &str {
    MODELS
        .iter()
        .find(|&&(id, _)| id == model)
        .map(|&(_, name)| name)
        .unwrap_or(model)
}

/// Whether a provider name refers to the supported provider
pub fn is_supported_provider(provider: &str) -> bool {
    provider.eq_ignore_ascii_case(PROVIDER)
}
