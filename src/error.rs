// SPDX-License-Identifier: MIT

//! Typed error handling for quill-rs
//!
//! Errors are split by the phase in which they can occur:
//! - [`GraphError`] - raised while compiling a graph, never during a run
//! - [`RunError`] - raised while walking a compiled graph
//! - [`CapabilityError`] - raised by the text-generation model
//! - [`QuillError`] - top-level error for the pipeline, config and server layers

use std::time::Duration;
use thiserror::Error;

/// Top-level error type for quill-rs
#[derive(Debug, Error)]
pub enum QuillError {
    /// Graph construction failed
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// A graph run failed
    #[error("Run error: {0}")]
    Run(#[from] RunError),

    /// Configuration errors (missing env vars, invalid config)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request did not carry a topic
    #[error("Topic is required")]
    MissingTopic,

    /// Translation requested into a language outside the supported set
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Only the openai provider is wired up
    #[error("Unsupported provider: {0}. Only openai is supported")]
    UnsupportedProvider(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl QuillError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error was caused by the caller's input rather than by the run
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingTopic
                | Self::UnsupportedLanguage(_)
                | Self::UnsupportedProvider(_)
                | Self::Config(_)
        )
    }
}

/// Compile-time graph errors. These abort `StateGraph::compile` before any run starts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    /// An edge or conditional-edge target names a node that was never declared
    #[error("Edge from '{from}' targets unknown node '{target}'")]
    UnknownTarget { from: String, target: String },

    /// An edge starts from a node that was never declared
    #[error("Edge declared from unknown node '{0}'")]
    UnknownSource(String),

    /// The entry node was never declared
    #[error("Entry node '{0}' is not declared")]
    UnknownEntry(String),

    /// A declared node cannot be reached from the entry
    #[error("Node '{0}' is unreachable from the entry")]
    Unreachable(String),

    /// Following edges from this node can lead back to it
    #[error("Cycle detected at node '{0}'")]
    CycleDetected(String),

    /// A node declares more than one outgoing edge, or both kinds of edge
    #[error("Node '{0}' declares more than one outgoing transition")]
    AmbiguousEdge(String),

    /// A router can produce a label that has no target
    #[error("Router on '{node}' can produce label '{label}' with no target")]
    UnroutedLabel { node: String, label: String },

    /// Two nodes share a name
    #[error("Node '{0}' is declared twice")]
    DuplicateNode(String),

    /// A node tried to use the terminal sentinel as its name
    #[error("'{0}' is reserved for the terminal marker")]
    ReservedName(String),
}

/// Errors surfaced while a compiled graph is running
#[derive(Debug, Error)]
pub enum RunError {
    /// A router produced a label that its conditional edge has no target for
    #[error("Routing failure at '{node}': no target for label '{label}'")]
    RoutingFailure { node: String, label: String },

    /// A node failed and the failure is fatal for the run
    #[error("Node '{node}' failed: {source}")]
    Node {
        node: String,
        #[source]
        source: NodeError,
    },
}

/// Failure reported by a single node
#[derive(Debug, Error)]
pub enum NodeError {
    /// The generation capability failed
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// Any other node-level failure
    #[error("{0}")]
    Other(String),
}

impl From<&str> for NodeError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<String> for NodeError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

/// Errors from the text-generation capability
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    /// Credentials missing or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The call did not complete within its deadline
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    /// Anything else (transport errors, malformed responses, server errors)
    #[error("Generation failed: {0}")]
    Unknown(String),
}

impl CapabilityError {
    /// Create an unknown error
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }
}
