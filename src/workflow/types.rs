// SPDX-License-Identifier: MIT

//! Graph workflow type definitions
//!
//! This module defines the building blocks a graph is declared from:
//! nodes, route labels and the terminal marker.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::hash::Hash;
use std::sync::Arc;

use super::state::{StateUpdate, WorkflowState};
use crate::error::{NodeError, RunError};

/// Terminal marker. An edge to `END` finishes the run.
pub const END: &str = "__end__";

/// A named unit of work.
///
/// Returning `Ok(None)` is a no-op merge: the state is left as it is and the
/// run still advances along the node's outgoing edge.
#[async_trait]
pub trait Node: Send + Sync {
    async fn call(&self, state: &WorkflowState) -> Result<Option<StateUpdate>, NodeError>;
}

/// Adapts a synchronous closure into a [`Node`]
pub struct FnNode<F>(F);

impl<F> FnNode<F>
where
    F: Fn(&WorkflowState) -> Result<Option<StateUpdate>, NodeError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Node for FnNode<F>
where
    F: Fn(&WorkflowState) -> Result<Option<StateUpdate>, NodeError> + Send + Sync,
{
    async fn call(&self, state: &WorkflowState) -> Result<Option<StateUpdate>, NodeError> {
        (self.0)(state)
    }
}

/// A closed set of branch labels.
///
/// Conditional edges are declared over a `RouteLabel` type, so the compiler
/// knows every label a router can produce and can insist each one has a target.
pub trait RouteLabel: Copy + Eq + Hash + Send + Sync + 'static {
    /// Every label, in a stable order
    fn variants() -> &'static [Self];

    fn as_str(&self) -> &'static str;
}

/// Type-erased router: a label from the declared set, or the raw label it could not match
pub(crate) type RouterFn = Arc<dyn Fn(&WorkflowState) -> Result<&'static str, String> + Send + Sync>;

/// A conditional edge group: a router plus its label-to-target mapping
#[derive(Clone)]
pub(crate) struct Branch {
    pub labels: Vec<&'static str>,
    pub router: RouterFn,
    pub targets: BTreeMap<&'static str, String>,
}

impl Branch {
    /// Resolve the next node for `state`. An unmatched label is a routing failure.
    pub fn resolve(&self, node: &str, state: &WorkflowState) -> Result<&str, RunError> {
        let label = (self.router)(state).map_err(|label| RunError::RoutingFailure {
            node: node.to_string(),
            label,
        })?;

        self.targets
            .get(label)
            .map(String::as_str)
            .ok_or_else(|| RunError::RoutingFailure {
                node: node.to_string(),
                label: label.to_string(),
            })
    }
}

/// Where a node hands control after it runs
#[derive(Clone)]
pub(crate) enum Transition {
    End,
    Goto(String),
    Branch(Branch),
}
