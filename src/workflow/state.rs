// SPDX-License-Identifier: MIT

//! Runtime state threaded through a graph run
//!
//! A run owns exactly one [`WorkflowState`]. Nodes never mutate it directly;
//! they return a [`StateUpdate`] which the executor merges with
//! [`WorkflowState::apply`].

use serde::{Deserialize, Serialize};

/// The blog artifact built up by the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub title: String,
    /// Absent until a content step has run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Blog {
    /// A blog with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: None,
        }
    }

    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: Some(content.into()),
        }
    }
}

/// State for a single run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    #[serde(default)]
    topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    blog: Option<Blog>,
}

impl WorkflowState {
    /// Create the initial state for a run. The topic is fixed from here on.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            current_language: None,
            blog: None,
        }
    }

    /// Request a translation into `language`. An empty string means no translation.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        self.current_language = (!language.is_empty()).then_some(language);
        self
    }

    pub fn with_blog(mut self, blog: Blog) -> Self {
        self.blog = Some(blog);
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The topic, if one was supplied
    pub fn non_empty_topic(&self) -> Option<&str> {
        Some(self.topic.as_str()).filter(|t| !t.is_empty())
    }

    pub fn current_language(&self) -> Option<&str> {
        self.current_language.as_deref()
    }

    pub fn blog(&self) -> Option<&Blog> {
        self.blog.as_ref()
    }

    /// Merge a partial update into this state.
    ///
    /// The policy is shallow last-write-wins per top-level field: a field the
    /// update leaves as `None` is untouched, a field it sets replaces the old
    /// value entirely. `blog` is never merged key-by-key, so a node that wants
    /// to keep the existing title must carry it in its own update.
    pub fn apply(&mut self, update: StateUpdate) {
        let StateUpdate {
            current_language,
            blog,
        } = update;

        if let Some(language) = current_language {
            self.current_language = Some(language);
        }
        if let Some(blog) = blog {
            self.blog = Some(blog);
        }
    }

    /// Convert state to a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Partial update returned by a node.
///
/// Has no `topic` field: the topic is fixed once a run starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub current_language: Option<String>,
    pub blog: Option<Blog>,
}

impl StateUpdate {
    /// An update that replaces the whole blog
    pub fn blog(blog: Blog) -> Self {
        Self {
            blog: Some(blog),
            ..Self::default()
        }
    }

    pub fn language(language: Option<String>) -> Self {
        Self {
            current_language: language,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current_language.is_none() && self.blog.is_none()
    }
}
