// SPDX-License-Identifier: MIT

//! Pipeline nodes
//!
//! Each node reads the run state, makes at most one generation call and
//! returns a partial update. Title and content failures are fatal to the run;
//! a failed translation falls back to the untranslated blog.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::language::Language;
use super::postprocess;
use crate::error::NodeError;
use crate::llm::{GenerationConfig, Model};
use crate::workflow::{Blog, Node, StateUpdate, WorkflowState};

/// Title used when a combined response cannot be split
pub const UNTITLED: &str = "Untitled";

const TITLE_MARKER: &str = "TITLE:";
const CONTENT_MARKER: &str = "CONTENT:";

fn title_prompt(topic: &str) -> String {
    format!(
        "You are an expert blog content writer. Use Markdown formatting. Generate \
         a blog title for the {topic}. This title should be creative and SEO friendly. \
         Respond with the title only."
    )
}

fn content_prompt(topic: &str, title: &str) -> String {
    format!(
        "You are an expert blog writer. Use Markdown formatting.\n\
         Generate detailed blog content with a detailed breakdown for the topic: {topic}\n\
         The blog is titled: {title}\n\
         Do not include a TL;DR, summary or recap section at the end."
    )
}

fn combined_prompt(topic: &str) -> String {
    format!(
        "You are an expert blog writer. Use Markdown formatting.\n\
         Write a creative, SEO friendly title and detailed blog content with a detailed \
         breakdown for the topic: {topic}\n\
         Do not include a TL;DR, summary or recap section at the end.\n\
         Answer in exactly this format:\n\
         {TITLE_MARKER} <the title>\n\
         {CONTENT_MARKER}\n\
         <the blog content>"
    )
}

fn translation_prompt(language: Language, content: &str) -> String {
    let name = language.display_name();
    format!(
        "Translate the following blog content into {name}.\n\
         - Maintain the original tone, style, and formatting.\n\
         - Adapt cultural references and idioms to be appropriate for {name}.\n\
         - Keep the Markdown formatting intact.\n\
         - Use proper grammar and natural phrasing in {name}.\n\
         - Preserve technical terms when appropriate, but provide context if needed.\n\
         \n\
         ORIGINAL CONTENT:\n\
         {content}\n\
         \n\
         Return only the translated content, maintaining the same structure and formatting."
    )
}

/// Markers at the start of a line, allowing Markdown emphasis or heading prefixes
static TITLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*[*_#]*[ \t]*TITLE[ \t]*:[*_]*").unwrap());
static CONTENT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*[*_#]*[ \t]*CONTENT[ \t]*:[*_]*").unwrap());

/// Split a `TITLE: ... CONTENT: ...` response.
///
/// A `CONTENT:` marker that starts a line wins over one inside the title, so
/// titles such as "User-Generated Content: A Guide" survive. When no marker
/// starts a line the first upper-case marker is used, then the first marker
/// in any case. Without a `CONTENT:` marker the whole response is the content
/// and the title is [`UNTITLED`].
pub(crate) fn split_title_and_content(response: &str) -> (String, String) {
    let Some((start, end)) = find_marker(response, &CONTENT_LINE, CONTENT_MARKER) else {
        return (UNTITLED.to_string(), response.trim().to_string());
    };

    let head = &response[..start];
    let body = &response[end..];
    let head = match find_marker(head, &TITLE_LINE, TITLE_MARKER) {
        Some((_, title_end)) => &head[title_end..],
        None => head,
    };

    let title = clean_title(head);
    let title = if title.is_empty() { UNTITLED } else { title };
    (title.to_string(), body.trim().to_string())
}

/// Byte range of the marker to split on
fn find_marker(text: &str, line: &Regex, marker: &str) -> Option<(usize, usize)> {
    if let Some(m) = line.find(text) {
        return Some((m.start(), m.end()));
    }
    // ASCII upper-casing keeps byte offsets aligned with `text`
    let at = text
        .find(marker)
        .or_else(|| text.to_ascii_uppercase().find(marker))?;
    Some((at, at + marker.len()))
}

fn clean_title(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c: char| c == '#' || c == '*' || c == '"')
        .trim()
}

/// Generates the blog title
pub struct TitleNode {
    model: Arc<dyn Model>,
    config: GenerationConfig,
}

impl TitleNode {
    pub fn new(model: Arc<dyn Model>, config: GenerationConfig) -> Self {
        Self { model, config }
    }
}

#[async_trait]
impl Node for TitleNode {
    async fn call(&self, state: &WorkflowState) -> Result<Option<StateUpdate>, NodeError> {
        let Some(topic) = state.non_empty_topic() else {
            return Ok(None);
        };

        let prompt = title_prompt(topic);
        log::debug!("Title prompt: {}", prompt);
        let title = self.model.generate(&prompt, &self.config).await?;

        Ok(Some(StateUpdate::blog(Blog::titled(clean_title(&title)))))
    }
}

/// Generates the blog body, and the title too when none exists yet
pub struct ContentNode {
    model: Arc<dyn Model>,
    config: GenerationConfig,
}

impl ContentNode {
    pub fn new(model: Arc<dyn Model>, config: GenerationConfig) -> Self {
        Self { model, config }
    }
}

#[async_trait]
impl Node for ContentNode {
    async fn call(&self, state: &WorkflowState) -> Result<Option<StateUpdate>, NodeError> {
        let Some(topic) = state.non_empty_topic() else {
            return Ok(None);
        };

        let existing_title = state
            .blog()
            .map(|b| b.title.as_str())
            .filter(|t| !t.trim().is_empty());

        let blog = match existing_title {
            Some(title) => {
                let prompt = content_prompt(topic, title);
                log::debug!("Content prompt: {}", prompt);
                let content = self.model.generate(&prompt, &self.config).await?;
                Blog::new(title, postprocess::strip(&content))
            }
            None => {
                let prompt = combined_prompt(topic);
                log::debug!("Combined prompt: {}", prompt);
                let response = self.model.generate(&prompt, &self.config).await?;
                let (title, content) = split_title_and_content(&response);
                if title == UNTITLED {
                    log::warn!(
                        "No {} marker in combined response, using placeholder title",
                        CONTENT_MARKER
                    );
                }
                Blog::new(title, postprocess::strip(&content))
            }
        };

        Ok(Some(StateUpdate::blog(blog)))
    }
}

/// Anchor for the language branch. Re-emits `current_language` unchanged.
pub struct RouteNode;

#[async_trait]
impl Node for RouteNode {
    async fn call(&self, state: &WorkflowState) -> Result<Option<StateUpdate>, NodeError> {
        Ok(Some(StateUpdate::language(
            state.current_language().map(str::to_string),
        )))
    }
}

/// Translates the blog content into one language
pub struct TranslationNode {
    language: Language,
    model: Arc<dyn Model>,
    /// Extended output budget
    config: GenerationConfig,
}

impl TranslationNode {
    pub fn new(language: Language, model: Arc<dyn Model>, config: GenerationConfig) -> Self {
        Self {
            language,
            model,
            config,
        }
    }
}

#[async_trait]
impl Node for TranslationNode {
    async fn call(&self, state: &WorkflowState) -> Result<Option<StateUpdate>, NodeError> {
        let Some(blog) = state.blog() else {
            return Ok(None);
        };
        let Some(content) = blog.content.as_deref() else {
            return Ok(None);
        };

        let prompt = translation_prompt(self.language, content);
        log::debug!("Translation prompt ({}): {} chars", self.language, prompt.len());

        match self.model.generate(&prompt, &self.config).await {
            Ok(translated) => Ok(Some(StateUpdate::blog(Blog::new(
                blog.title.clone(),
                postprocess::strip(&translated),
            )))),
            Err(e) => {
                log::warn!(
                    "Translation to {} failed, keeping original content: {}",
                    self.language,
                    e
                );
                Ok(Some(StateUpdate::blog(blog.clone())))
            }
        }
    }
}
