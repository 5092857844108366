// SPDX-License-Identifier: MIT

//! Graph workflow executor

use petgraph::dot::Dot;
use petgraph::graph::DiGraph;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::state::WorkflowState;
use super::types::{Node, Transition, END};
use crate::error::RunError;

/// Compiled node ready for execution
pub(crate) struct CompiledNode {
    pub node: Arc<dyn Node>,
    pub next: Transition,
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Final merged state
    pub state: WorkflowState,
    /// Node names in the order they ran
    pub visited: Vec<String>,
}

/// An immutable, validated graph.
///
/// Holds no per-run data, so one instance can be shared across concurrent runs.
pub struct CompiledGraph {
    name: String,
    entry: String,
    nodes: HashMap<String, CompiledNode>,
    order: Vec<String>, // Declaration order, for display
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("name", &self.name)
            .field("entry", &self.entry)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl CompiledGraph {
    pub(crate) fn new(
        name: String,
        entry: String,
        nodes: HashMap<String, CompiledNode>,
        order: Vec<String>,
    ) -> Self {
        Self {
            name,
            entry,
            nodes,
            order,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Node names in declaration order
    pub fn node_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Run the graph and return only the final state
    pub async fn run(&self, initial: WorkflowState) -> Result<WorkflowState, RunError> {
        self.invoke(initial).await.map(|execution| execution.state)
    }

    /// Run the graph from its entry until a terminal transition.
    ///
    /// Nodes run strictly one after another. After each node its update is
    /// merged with [`WorkflowState::apply`]; then the node's edge, or its
    /// router, picks the next node. Any error ends the run and no partial
    /// state is returned.
    pub async fn invoke(&self, initial: WorkflowState) -> Result<Execution, RunError> {
        let run_id = Uuid::new_v4();
        let mut state = initial;
        let mut visited = Vec::new();
        let mut current = self.entry.as_str();

        log::info!("[{}] Starting graph '{}' at '{}'", run_id, self.name, current);

        loop {
            let step = &self.nodes[current];
            visited.push(current.to_string());

            log::info!("[{}] Executing node: {}", run_id, current);
            match step.node.call(&state).await {
                Ok(Some(update)) => state.apply(update),
                Ok(None) => log::debug!("[{}] Node {} returned no update", run_id, current),
                Err(source) => {
                    log::error!("[{}] Node {} failed: {}", run_id, current, source);
                    return Err(RunError::Node {
                        node: current.to_string(),
                        source,
                    });
                }
            }

            let next = match &step.next {
                Transition::End => END,
                Transition::Goto(target) => target.as_str(),
                Transition::Branch(branch) => {
                    let target = branch.resolve(current, &state)?;
                    log::info!("[{}] Routed {} -> {}", run_id, current, target);
                    target
                }
            };

            if next == END {
                break;
            }
            current = next;
        }

        log::info!(
            "[{}] Graph '{}' finished after {} nodes",
            run_id,
            self.name,
            visited.len()
        );

        Ok(Execution { state, visited })
    }

    /// Render the topology as Graphviz dot. Conditional edges are labelled.
    pub fn to_dot(&self) -> String {
        let mut graph: DiGraph<&str, &str> = DiGraph::new();
        let mut indices = HashMap::new();
        for name in &self.order {
            indices.insert(name.as_str(), graph.add_node(name.as_str()));
        }
        let end = graph.add_node(END);

        for name in &self.order {
            let from = indices[name.as_str()];
            let resolve = |target: &str| indices.get(target).copied().unwrap_or(end);
            match &self.nodes[name].next {
                Transition::End => {
                    graph.add_edge(from, end, "");
                }
                Transition::Goto(target) => {
                    graph.add_edge(from, resolve(target), "");
                }
                Transition::Branch(branch) => {
                    for (label, target) in &branch.targets {
                        graph.add_edge(from, resolve(target), *label);
                    }
                }
            }
        }

        format!("{}", Dot::new(&graph))
    }
}
