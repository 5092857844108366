// SPDX-License-Identifier: MIT

//! Integration tests for graph compilation and blog pipeline runs
//!
//! These tests drive the public API end to end using a scripted mock model.

use async_trait::async_trait;
use quill_rs::blog::nodes::{ContentNode, RouteNode};
use quill_rs::blog::pipeline::{CONTENT_NODE, ROUTE_NODE, TITLE_NODE};
use quill_rs::blog::{route_language, BlogPipeline, BlogRequest, Language};
use quill_rs::error::{CapabilityError, GraphError, QuillError, RunError};
use quill_rs::llm::{GenerationConfig, Model};
use quill_rs::workflow::{StateGraph, WorkflowState, END};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock Components
// ============================================================================

const FALLBACK: &str = "Generated text";

/// Mock model that returns predefined responses in call order
struct MockModel {
    responses: Vec<String>,
    /// Call index that fails instead of answering
    fail_at: Option<usize>,
    call_count: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockModel {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(|r| r.to_string()).collect(),
            fail_at: None,
            call_count: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Model for MockModel {
    async fn generate(
        &self,
        prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<String, CapabilityError> {
        let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        if self.fail_at == Some(idx) {
            return Err(CapabilityError::RateLimited {
                retry_after_secs: Some(30),
            });
        }
        Ok(self
            .responses
            .get(idx)
            .cloned()
            .unwrap_or_else(|| FALLBACK.to_string()))
    }
}

fn pipeline(model: &Arc<MockModel>) -> BlogPipeline {
    BlogPipeline::new(model.clone())
}

// ============================================================================
// Topic-only pipeline
// ============================================================================

#[tokio::test]
async fn test_topic_graph_produces_title_and_content() {
    let model = Arc::new(MockModel::new(&[
        "Ownership Without Fear",
        "Rust tracks ownership at compile time.\n\nTL;DR: it is safe.",
    ]));
    let graph = pipeline(&model).topic_graph().unwrap();

    let execution = graph
        .invoke(WorkflowState::new("Rust ownership"))
        .await
        .unwrap();

    let blog = execution.state.blog().unwrap();
    assert_eq!(blog.title, "Ownership Without Fear");
    assert_eq!(
        blog.content.as_deref(),
        Some("Rust tracks ownership at compile time.")
    );
    assert_eq!(execution.visited, vec![TITLE_NODE, CONTENT_NODE]);
    assert_eq!(model.calls(), 2);

    // The content prompt carries the title produced by the previous step
    assert!(model.prompt(1).contains("Ownership Without Fear"));
}

#[tokio::test]
async fn test_empty_topic_leaves_no_blog() {
    let model = Arc::new(MockModel::new(&[]));
    let graph = pipeline(&model).topic_graph().unwrap();

    let state = graph.run(WorkflowState::new("")).await.unwrap();

    assert!(state.blog().is_none());
    assert_eq!(state.to_json(), serde_json::json!({ "topic": "" }));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_title_failure_fails_run() {
    let model = Arc::new(MockModel::new(&[]).failing_at(0));
    let request = BlogRequest::new("Rust", None).unwrap();

    let err = pipeline(&model).generate(&request).await.unwrap_err();
    match err {
        QuillError::Run(RunError::Node { node, .. }) => assert_eq!(node, TITLE_NODE),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(model.calls(), 1);
}

// ============================================================================
// Language pipeline
// ============================================================================

#[tokio::test]
async fn test_french_run_visits_expected_nodes() {
    let model = Arc::new(MockModel::new(&[
        "Ownership Without Fear",
        "Body in English.",
        "Corps en français.",
    ]));
    let request = BlogRequest::new("Rust ownership", Some("french")).unwrap();
    let graph = pipeline(&model).language_graph().unwrap();

    let execution = graph.invoke(request.initial_state()).await.unwrap();

    assert_eq!(
        execution.visited,
        vec![TITLE_NODE, CONTENT_NODE, ROUTE_NODE, "french_translation"]
    );
    let blog = execution.state.blog().unwrap();
    assert_eq!(blog.title, "Ownership Without Fear");
    assert_eq!(blog.content.as_deref(), Some("Corps en français."));
    assert_eq!(execution.state.current_language(), Some("french"));

    assert_eq!(model.calls(), 3);
    let translation_prompt = model.prompt(2);
    assert!(translation_prompt.contains("French (Français)"));
    assert!(translation_prompt.contains("Body in English."));
}

#[tokio::test]
async fn test_router_is_case_insensitive() {
    let model = Arc::new(MockModel::new(&["T", "B", "अनुवाद"]));
    let graph = pipeline(&model).language_graph().unwrap();

    let state = WorkflowState::new("Rust").with_language("Hindi");
    assert_eq!(route_language(&state), Ok(Language::Hindi));

    let execution = graph.invoke(state).await.unwrap();
    assert_eq!(
        execution.visited.last().map(String::as_str),
        Some("hindi_translation")
    );
    assert_eq!(execution.visited.len(), 4);
}

#[tokio::test]
async fn test_unsupported_language_rejected_before_run() {
    match BlogRequest::new("Rust", Some("klingon")) {
        Err(QuillError::UnsupportedLanguage(lang)) => assert_eq!(lang, "klingon"),
        other => panic!("expected UnsupportedLanguage, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unsupported_language_fails_run_with_routing_failure() {
    let model = Arc::new(MockModel::new(&["T", "B"]));
    let graph = pipeline(&model).language_graph().unwrap();

    let state = WorkflowState::new("Rust").with_language("Klingon");
    let err = graph.run(state).await.unwrap_err();

    match err {
        RunError::RoutingFailure { node, label } => {
            assert_eq!(node, ROUTE_NODE);
            assert_eq!(label, "klingon");
        }
        other => panic!("expected RoutingFailure, got {:?}", other),
    }
    // No translation node was reached
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn test_translation_failure_keeps_original_blog() {
    let original_content = "## Ownership\n\nEvery value has *one* owner.";
    let model = Arc::new(
        MockModel::new(&["Ownership Without Fear", original_content]).failing_at(2),
    );
    let request = BlogRequest::new("Rust ownership", Some("yoruba")).unwrap();

    let state = pipeline(&model).generate(&request).await.unwrap();

    let blog = state.blog().unwrap();
    assert_eq!(blog.title, "Ownership Without Fear");
    assert_eq!(blog.content.as_deref(), Some(original_content));
    assert_eq!(model.calls(), 3);
}

// ============================================================================
// Content node two-part parsing
// ============================================================================

#[tokio::test]
async fn test_combined_response_is_split() {
    let model = Arc::new(MockModel::new(&[
        "TITLE: X\nCONTENT:\nY is the body.\n\nTLDR: Y.",
    ]));
    let graph = StateGraph::new("content-only")
        .add_node(
            CONTENT_NODE,
            ContentNode::new(model.clone(), GenerationConfig::default()),
        )
        .add_edge(CONTENT_NODE, END)
        .compile(CONTENT_NODE)
        .unwrap();

    let state = graph.run(WorkflowState::new("Rust")).await.unwrap();

    let blog = state.blog().unwrap();
    assert_eq!(blog.title, "X");
    let content = blog.content.as_deref().unwrap();
    assert_eq!(content, "Y is the body.");
    assert!(!content.contains("TITLE:"));
    assert!(!content.contains("CONTENT:"));
}

#[tokio::test]
async fn test_combined_response_with_marker_word_in_title() {
    let model = Arc::new(MockModel::new(&[
        "TITLE: User-Generated Content: A Guide\nCONTENT:\nBody here.\n\nTL;DR\nshort recap",
    ]));
    let graph = StateGraph::new("content-only")
        .add_node(
            CONTENT_NODE,
            ContentNode::new(model.clone(), GenerationConfig::default()),
        )
        .add_edge(CONTENT_NODE, END)
        .compile(CONTENT_NODE)
        .unwrap();

    let state = graph.run(WorkflowState::new("UGC")).await.unwrap();

    let blog = state.blog().unwrap();
    assert_eq!(blog.title, "User-Generated Content: A Guide");
    assert_eq!(blog.content.as_deref(), Some("Body here."));
}

// ============================================================================
// Graph compilation
// ============================================================================

#[test]
fn test_branch_missing_a_language_does_not_compile() {
    let err = StateGraph::new("partial")
        .add_node(ROUTE_NODE, RouteNode)
        .add_node("french_translation", RouteNode)
        .add_conditional_edges(
            ROUTE_NODE,
            route_language,
            [(Language::French, "french_translation")],
        )
        .add_edge("french_translation", END)
        .compile(ROUTE_NODE)
        .unwrap_err();

    assert!(matches!(
        err,
        GraphError::UnroutedLabel { ref node, ref label } if node == ROUTE_NODE && label == "hindi"
    ));
}

#[test]
fn test_compilation_is_deterministic() {
    let model = Arc::new(MockModel::new(&[]));
    let first = pipeline(&model).language_graph().unwrap();
    let second = pipeline(&model).language_graph().unwrap();

    assert_eq!(first.node_names(), second.node_names());
    assert_eq!(first.to_dot(), second.to_dot());
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_runs_share_compiled_graph() {
    let model = Arc::new(MockModel::new(&[]));
    let graph = Arc::new(pipeline(&model).language_graph().unwrap());

    let languages = ["hindi", "french", "hausa", "yoruba", "igbo"];
    let handles: Vec<_> = languages
        .iter()
        .enumerate()
        .map(|(i, lang)| {
            let graph = graph.clone();
            let state = WorkflowState::new(format!("topic {}", i)).with_language(*lang);
            tokio::spawn(async move { graph.invoke(state).await })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let execution = handle.await.unwrap().unwrap();
        assert_eq!(execution.state.topic(), format!("topic {}", i));
        assert_eq!(
            execution.visited.last().cloned(),
            Some(format!("{}_translation", languages[i]))
        );
        assert_eq!(
            execution.state.blog().unwrap().content.as_deref(),
            Some(FALLBACK)
        );
    }
    assert_eq!(model.calls(), 3 * languages.len());
}
