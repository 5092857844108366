// SPDX-License-Identifier: MIT

//! Blog pipeline factory
//!
//! Builds the two supported topologies on demand:
//!
//! ```text
//! topic:     title_creation -> content_generation -> END
//! language:  title_creation -> content_generation -> route -+-> hindi_translation  -> END
//!                                                          +-> french_translation -> END
//!                                                          +-> ...                -> END
//! ```

use std::sync::Arc;

use super::language::{route_language, Language};
use super::nodes::{ContentNode, RouteNode, TitleNode, TranslationNode};
use crate::config::Settings;
use crate::error::{GraphError, QuillError};
use crate::llm::{GenerationConfig, Model};
use crate::workflow::{CompiledGraph, StateGraph, WorkflowState, END};

pub const TITLE_NODE: &str = "title_creation";
pub const CONTENT_NODE: &str = "content_generation";
pub const ROUTE_NODE: &str = "route";

/// Which topology a request needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usecase {
    /// Title and content only
    Topic,
    /// Title, content and a translation
    Language,
}

/// A validated generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogRequest {
    topic: String,
    language: Option<Language>,
}

impl BlogRequest {
    /// Validate caller input.
    ///
    /// An empty or absent language means no translation. Any other value must
    /// name a supported language, so the language branch can never be asked
    /// for a label it has no target for.
    pub fn new(topic: impl Into<String>, language: Option<&str>) -> Result<Self, QuillError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(QuillError::MissingTopic);
        }

        let language = match language.map(str::trim).filter(|l| !l.is_empty()) {
            Some(raw) => Some(raw.parse::<Language>()?),
            None => None,
        };

        Ok(Self { topic, language })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn language(&self) -> Option<Language> {
        self.language
    }

    pub fn usecase(&self) -> Usecase {
        match self.language {
            Some(_) => Usecase::Language,
            None => Usecase::Topic,
        }
    }

    pub fn initial_state(&self) -> WorkflowState {
        let state = WorkflowState::new(self.topic.clone());
        match self.language {
            Some(language) => state.with_language(language.id()),
            None => state,
        }
    }
}

/// Builds blog graphs around one model
#[derive(Clone)]
pub struct BlogPipeline {
    model: Arc<dyn Model>,
    generation: GenerationConfig,
    translation: GenerationConfig,
}

impl BlogPipeline {
    /// Pipeline with default settings
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self::from_settings(model, &Settings::default())
    }

    pub fn from_settings(model: Arc<dyn Model>, settings: &Settings) -> Self {
        Self {
            model,
            generation: settings.generation_config(),
            translation: settings.translation_config(),
        }
    }

    fn base_graph(&self, name: &str) -> StateGraph {
        StateGraph::new(name)
            .add_node(
                TITLE_NODE,
                TitleNode::new(self.model.clone(), self.generation.clone()),
            )
            .add_node(
                CONTENT_NODE,
                ContentNode::new(self.model.clone(), self.generation.clone()),
            )
            .add_edge(TITLE_NODE, CONTENT_NODE)
    }

    /// title_creation -> content_generation -> END
    pub fn topic_graph(&self) -> Result<CompiledGraph, GraphError> {
        self.base_graph("topic")
            .add_edge(CONTENT_NODE, END)
            .compile(TITLE_NODE)
    }

    /// The topic graph plus a route node dispatching to one translation node per language
    pub fn language_graph(&self) -> Result<CompiledGraph, GraphError> {
        let graph = self
            .base_graph("language")
            .add_node(ROUTE_NODE, RouteNode)
            .add_edge(CONTENT_NODE, ROUTE_NODE)
            .add_conditional_edges(
                ROUTE_NODE,
                route_language,
                Language::ALL.map(|lang| (lang, lang.node_name())),
            );

        Language::ALL
            .into_iter()
            .fold(graph, |graph, lang| {
                let node =
                    TranslationNode::new(lang, self.model.clone(), self.translation.clone());
                graph
                    .add_node(lang.node_name(), node)
                    .add_edge(lang.node_name(), END)
            })
            .compile(TITLE_NODE)
    }

    pub fn setup_graph(&self, usecase: Usecase) -> Result<CompiledGraph, GraphError> {
        match usecase {
            Usecase::Topic => self.topic_graph(),
            Usecase::Language => self.language_graph(),
        }
    }

    /// Run the topology the request needs and return the final state.
    ///
    /// A failed run returns only the error; no partial blog is exposed.
    pub async fn generate(&self, request: &BlogRequest) -> Result<WorkflowState, QuillError> {
        let usecase = request.usecase();
        log::info!(
            "Generating blog for topic '{}' ({:?} graph)",
            request.topic(),
            usecase
        );

        let graph = self.setup_graph(usecase)?;
        let state = graph.run(request.initial_state()).await?;
        Ok(state)
    }
}
