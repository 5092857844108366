// SPDX-License-Identifier: MIT

//! Graph declaration and compilation
//!
//! A [`StateGraph`] collects node and edge declarations without checking them.
//! [`StateGraph::compile`] validates the whole topology at once and produces an
//! immutable [`CompiledGraph`]. Every structural problem is reported here, so a
//! compiled graph can only fail at run time through its nodes or routers.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use super::executor::{CompiledGraph, CompiledNode};
use super::state::WorkflowState;
use super::types::{Branch, Node, RouteLabel, RouterFn, Transition, END};
use crate::error::GraphError;

struct EdgeDecl {
    from: String,
    to: String,
}

struct BranchDecl {
    from: String,
    branch: Branch,
}

/// Declarative graph topology
#[derive(Default)]
pub struct StateGraph {
    name: String,
    nodes: Vec<(String, Arc<dyn Node>)>,
    edges: Vec<EdgeDecl>,
    branches: Vec<BranchDecl>,
}

impl StateGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declare a named node
    pub fn add_node(mut self, name: impl Into<String>, node: impl Node + 'static) -> Self {
        let node: Arc<dyn Node> = Arc::new(node);
        self.nodes.push((name.into(), node));
        self
    }

    /// Declare an unconditional edge. `to` may be [`END`].
    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.push(EdgeDecl {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Declare a conditional edge group on `from`.
    ///
    /// `router` returns a label of type `L`, or `Err(raw)` with the label text
    /// it could not match. Every variant of `L` must appear in `targets`.
    pub fn add_conditional_edges<L, R, I, T>(
        mut self,
        from: impl Into<String>,
        router: R,
        targets: I,
    ) -> Self
    where
        L: RouteLabel,
        R: Fn(&WorkflowState) -> Result<L, String> + Send + Sync + 'static,
        I: IntoIterator<Item = (L, T)>,
        T: Into<String>,
    {
        let router: RouterFn = Arc::new(move |state: &WorkflowState| {
            router(state).map(|label| label.as_str())
        });
        let targets: BTreeMap<&'static str, String> = targets
            .into_iter()
            .map(|(label, target)| (label.as_str(), target.into()))
            .collect();

        self.branches.push(BranchDecl {
            from: from.into(),
            branch: Branch {
                labels: L::variants().iter().map(L::as_str).collect(),
                router,
                targets,
            },
        });
        self
    }

    /// Validate the topology and produce an executable graph.
    ///
    /// Compilation is deterministic: errors are reported in declaration order.
    pub fn compile(self, entry: impl Into<String>) -> Result<CompiledGraph, GraphError> {
        let entry = entry.into();

        let mut declared: HashSet<&str> = HashSet::new();
        for (name, _) in &self.nodes {
            if name == END {
                return Err(GraphError::ReservedName(name.clone()));
            }
            if !declared.insert(name.as_str()) {
                return Err(GraphError::DuplicateNode(name.clone()));
            }
        }

        if !declared.contains(entry.as_str()) {
            return Err(GraphError::UnknownEntry(entry));
        }

        let known = |target: &str| target == END || declared.contains(target);

        let mut outgoing: HashMap<&str, usize> = HashMap::new();
        let sources = self
            .edges
            .iter()
            .map(|e| e.from.as_str())
            .chain(self.branches.iter().map(|b| b.from.as_str()));
        for from in sources {
            if !declared.contains(from) {
                return Err(GraphError::UnknownSource(from.to_string()));
            }
            let count = outgoing.entry(from).or_default();
            *count += 1;
            if *count > 1 {
                return Err(GraphError::AmbiguousEdge(from.to_string()));
            }
        }

        for edge in &self.edges {
            if !known(&edge.to) {
                return Err(GraphError::UnknownTarget {
                    from: edge.from.clone(),
                    target: edge.to.clone(),
                });
            }
        }

        for decl in &self.branches {
            for target in decl.branch.targets.values() {
                if !known(target) {
                    return Err(GraphError::UnknownTarget {
                        from: decl.from.clone(),
                        target: target.clone(),
                    });
                }
            }
            if let Some(label) = decl
                .branch
                .labels
                .iter()
                .find(|label| !decl.branch.targets.contains_key(*label))
            {
                return Err(GraphError::UnroutedLabel {
                    node: decl.from.clone(),
                    label: label.to_string(),
                });
            }
        }

        check_dag(&self.nodes, &self.edges, &self.branches, &entry)?;

        let mut transitions: HashMap<String, Transition> = HashMap::new();
        for edge in self.edges {
            let transition = if edge.to == END {
                Transition::End
            } else {
                Transition::Goto(edge.to)
            };
            transitions.insert(edge.from, transition);
        }
        for decl in self.branches {
            transitions.insert(decl.from, Transition::Branch(decl.branch));
        }

        let order: Vec<String> = self.nodes.iter().map(|(name, _)| name.clone()).collect();
        let nodes: HashMap<String, CompiledNode> = self
            .nodes
            .into_iter()
            .map(|(name, node)| {
                let next = transitions.remove(&name).unwrap_or(Transition::End);
                (name, CompiledNode { node, next })
            })
            .collect();

        log::debug!(
            "Compiled graph '{}' with {} nodes, entry '{}'",
            self.name,
            nodes.len(),
            entry
        );

        Ok(CompiledGraph::new(self.name, entry, nodes, order))
    }
}

/// Reject cycles and nodes the entry cannot reach. Conditional edges count as fan-out.
fn check_dag(
    nodes: &[(String, Arc<dyn Node>)],
    edges: &[EdgeDecl],
    branches: &[BranchDecl],
    entry: &str,
) -> Result<(), GraphError> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let indices: HashMap<&str, NodeIndex> = nodes
        .iter()
        .map(|(name, _)| (name.as_str(), graph.add_node(name.as_str())))
        .collect();

    let links = edges
        .iter()
        .map(|e| (e.from.as_str(), e.to.as_str()))
        .chain(branches.iter().flat_map(|b| {
            b.branch
                .targets
                .values()
                .map(move |to| (b.from.as_str(), to.as_str()))
        }));
    for (from, to) in links {
        if let (Some(&a), Some(&b)) = (indices.get(from), indices.get(to)) {
            graph.update_edge(a, b, ());
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        return Err(GraphError::CycleDetected(graph[cycle.node_id()].to_string()));
    }

    let mut reached = HashSet::new();
    let mut dfs = Dfs::new(&graph, indices[entry]);
    while let Some(idx) = dfs.next(&graph) {
        reached.insert(idx);
    }
    if let Some((name, _)) = nodes
        .iter()
        .find(|(name, _)| !reached.contains(&indices[name.as_str()]))
    {
        return Err(GraphError::Unreachable(name.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NodeError;
    use crate::workflow::state::StateUpdate;
    use crate::workflow::types::FnNode;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Fork {
        Yes,
        No,
    }

    impl RouteLabel for Fork {
        fn variants() -> &'static [Self] {
            &[Fork::Yes, Fork::No]
        }

        fn as_str(&self) -> &'static str {
            match self {
                Fork::Yes => "yes",
                Fork::No => "no",
            }
        }
    }

    fn noop() -> FnNode<impl Fn(&WorkflowState) -> Result<Option<StateUpdate>, NodeError> + Send + Sync>
    {
        FnNode::new(|_: &WorkflowState| Ok(None))
    }

    fn fork_router(state: &WorkflowState) -> Result<Fork, String> {
        if state.topic().is_empty() {
            Ok(Fork::No)
        } else {
            Ok(Fork::Yes)
        }
    }

    #[test]
    fn test_linear_graph_compiles() {
        let graph = StateGraph::new("linear")
            .add_node("a", noop())
            .add_node("b", noop())
            .add_edge("a", "b")
            .add_edge("b", END)
            .compile("a")
            .unwrap();

        assert_eq!(graph.entry(), "a");
        assert_eq!(graph.node_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_node_without_edge_is_terminal() {
        let graph = StateGraph::new("single")
            .add_node("only", noop())
            .compile("only");
        assert!(graph.is_ok());
    }

    #[test]
    fn test_unknown_target() {
        let err = StateGraph::new("g")
            .add_node("a", noop())
            .add_edge("a", "missing")
            .compile("a")
            .err()
            .unwrap();
        assert_eq!(
            err,
            GraphError::UnknownTarget {
                from: "a".into(),
                target: "missing".into()
            }
        );
    }

    #[test]
    fn test_unknown_branch_target() {
        let err = StateGraph::new("g")
            .add_node("a", noop())
            .add_node("b", noop())
            .add_conditional_edges("a", fork_router, [(Fork::Yes, "b"), (Fork::No, "nowhere")])
            .compile("a")
            .err()
            .unwrap();
        assert!(matches!(err, GraphError::UnknownTarget { target, .. } if target == "nowhere"));
    }

    #[test]
    fn test_unknown_entry() {
        let err = StateGraph::new("g")
            .add_node("a", noop())
            .compile("b")
            .err()
            .unwrap();
        assert_eq!(err, GraphError::UnknownEntry("b".into()));
    }

    #[test]
    fn test_unknown_source() {
        let err = StateGraph::new("g")
            .add_node("a", noop())
            .add_edge("ghost", "a")
            .compile("a")
            .err()
            .unwrap();
        assert_eq!(err, GraphError::UnknownSource("ghost".into()));
    }

    #[test]
    fn test_unreachable_node() {
        let err = StateGraph::new("g")
            .add_node("a", noop())
            .add_node("island", noop())
            .add_edge("a", END)
            .compile("a")
            .err()
            .unwrap();
        assert_eq!(err, GraphError::Unreachable("island".into()));
    }

    #[test]
    fn test_cycle_detected() {
        let err = StateGraph::new("g")
            .add_node("a", noop())
            .add_node("b", noop())
            .add_edge("a", "b")
            .add_edge("b", "a")
            .compile("a")
            .err()
            .unwrap();
        assert!(matches!(err, GraphError::CycleDetected(_)));
    }

    #[test]
    fn test_cycle_through_branch_detected() {
        let err = StateGraph::new("g")
            .add_node("a", noop())
            .add_node("b", noop())
            .add_edge("a", "b")
            .add_conditional_edges("b", fork_router, [(Fork::Yes, "a"), (Fork::No, END)])
            .compile("a")
            .err()
            .unwrap();
        assert!(matches!(err, GraphError::CycleDetected(_)));
    }

    #[test]
    fn test_self_loop_detected() {
        let err = StateGraph::new("g")
            .add_node("a", noop())
            .add_edge("a", "a")
            .compile("a")
            .err()
            .unwrap();
        assert_eq!(err, GraphError::CycleDetected("a".into()));
    }

    #[test]
    fn test_edge_and_branch_is_ambiguous() {
        let err = StateGraph::new("g")
            .add_node("a", noop())
            .add_node("b", noop())
            .add_edge("a", "b")
            .add_conditional_edges("a", fork_router, [(Fork::Yes, "b"), (Fork::No, END)])
            .compile("a")
            .err()
            .unwrap();
        assert_eq!(err, GraphError::AmbiguousEdge("a".into()));
    }

    #[test]
    fn test_two_edges_is_ambiguous() {
        let err = StateGraph::new("g")
            .add_node("a", noop())
            .add_node("b", noop())
            .add_edge("a", "b")
            .add_edge("a", END)
            .compile("a")
            .err()
            .unwrap();
        assert_eq!(err, GraphError::AmbiguousEdge("a".into()));
    }

    #[test]
    fn test_unrouted_label() {
        let err = StateGraph::new("g")
            .add_node("a", noop())
            .add_node("b", noop())
            .add_conditional_edges("a", fork_router, [(Fork::Yes, "b")])
            .compile("a")
            .err()
            .unwrap();
        assert_eq!(
            err,
            GraphError::UnroutedLabel {
                node: "a".into(),
                label: "no".into()
            }
        );
    }

    #[test]
    fn test_duplicate_node() {
        let err = StateGraph::new("g")
            .add_node("a", noop())
            .add_node("a", noop())
            .compile("a")
            .err()
            .unwrap();
        assert_eq!(err, GraphError::DuplicateNode("a".into()));
    }

    #[test]
    fn test_reserved_name() {
        let err = StateGraph::new("g")
            .add_node(END, noop())
            .compile(END)
            .err()
            .unwrap();
        assert_eq!(err, GraphError::ReservedName(END.into()));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let build = || {
            StateGraph::new("g")
                .add_node("a", noop())
                .add_node("x", noop())
                .add_node("y", noop())
                .add_edge("a", END)
                .compile("a")
                .err()
        };
        assert_eq!(build(), build());
        assert_eq!(build(), Some(GraphError::Unreachable("x".into())));
    }
}
