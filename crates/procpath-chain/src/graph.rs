//! Chain graph and its builder
//!
//! A chain is turned into a directed graph with one node per distinct
//! process identity and one edge per distinct parent → child transition.

use crate::error::{ChainError, InvalidPathReason};
use crate::tokenizer::{PathTokenizer, TokenizedPath};
use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

/// A process identity as it appears in a chain
///
/// Identity is exact string equality; no case folding or path stripping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProcessNode {
    name: String,
}

impl ProcessNode {
    /// Process name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A parent → child transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessEdge;

/// What to do with a hop from a process to itself (`A → A`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfLoopPolicy {
    /// Keep it as a self-loop edge
    #[default]
    Allow,
    /// Treat the path as invalid
    Reject,
}

/// Directed graph of one process chain
///
/// Nodes are unique by name, edges unique by ordered pair. Both are kept in
/// first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ChainGraph {
    graph: DiGraph<ProcessNode, ProcessEdge>,
    index: IndexMap<String, NodeIndex>,
}

impl ChainGraph {
    /// Tokenize `path` and build its graph in one step
    ///
    /// # Errors
    /// [`ChainError::InvalidPath`] if tokenization fails or the policy
    /// rejects a self-loop.
    pub fn from_path(
        path: &str,
        tokenizer: &PathTokenizer,
        policy: SelfLoopPolicy,
    ) -> Result<Self, ChainError> {
        let tokens = tokenizer.tokenize(path)?;
        let mut builder = ChainGraphBuilder::new(policy);
        builder.extend_chain(&tokens)?;
        Ok(builder.build())
    }

    /// Number of distinct processes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct transitions
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// True when the graph has no nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Processes in first-seen order
    pub fn nodes(&self) -> impl Iterator<Item = &ProcessNode> + '_ {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Node for a process name
    #[must_use]
    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    /// Process stored at `idx`
    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> Option<&ProcessNode> {
        self.graph.node_weight(idx)
    }

    /// Transitions as `(parent, child)` names, first-seen order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.graph.edge_references().map(move |edge| {
            (
                self.graph[edge.source()].name(),
                self.graph[edge.target()].name(),
            )
        })
    }

    /// Transitions as node index pairs, first-seen order
    pub fn edge_endpoints(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.target()))
    }

    /// Whether a `from → to` transition exists
    #[must_use]
    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        match (self.node_index(from), self.node_index(to)) {
            (Some(a), Some(b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }
}

/// Incrementally builds a [`ChainGraph`]
///
/// Both insertions are idempotent: an existing name returns its existing
/// node, an existing ordered pair is a no-op.
#[derive(Debug, Default)]
pub struct ChainGraphBuilder {
    policy: SelfLoopPolicy,
    graph: ChainGraph,
}

impl ChainGraphBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new(policy: SelfLoopPolicy) -> Self {
        Self {
            policy,
            graph: ChainGraph::default(),
        }
    }

    /// Self-loop policy in force
    #[inline]
    #[must_use]
    pub fn policy(&self) -> SelfLoopPolicy {
        self.policy
    }

    /// Get the number of nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Insert a process, returning the node for its name
    pub fn insert_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.graph.index.get(name) {
            return idx;
        }
        let idx = self.graph.graph.add_node(ProcessNode {
            name: name.to_string(),
        });
        self.graph.index.insert(name.to_string(), idx);
        idx
    }

    /// Insert a `from → to` transition, creating missing nodes
    ///
    /// Returns `true` when a new edge was added.
    ///
    /// # Errors
    /// [`ChainError::InvalidPath`] for a self-loop under
    /// [`SelfLoopPolicy::Reject`].
    pub fn insert_edge(&mut self, from: &str, to: &str) -> Result<bool, ChainError> {
        if from == to && self.policy == SelfLoopPolicy::Reject {
            return Err(ChainError::invalid_path(
                format!("{from} → {to}"),
                InvalidPathReason::SelfLoop,
            ));
        }

        let a = self.insert_node(from);
        let b = self.insert_node(to);
        if self.graph.graph.find_edge(a, b).is_some() {
            return Ok(false);
        }
        self.graph.graph.add_edge(a, b, ProcessEdge);
        Ok(true)
    }

    /// Insert every token and every consecutive transition of a chain
    ///
    /// # Errors
    /// See [`ChainGraphBuilder::insert_edge`]; a rejected self-loop reports
    /// the whole chain as the invalid path.
    pub fn extend_chain(&mut self, chain: &TokenizedPath<'_>) -> Result<(), ChainError> {
        let mut prev: Option<&str> = None;
        for token in chain.tokens() {
            self.insert_node(token);
            if let Some(parent) = prev {
                self.insert_edge(parent, token).map_err(|err| match err {
                    ChainError::InvalidPath { reason, .. } => {
                        ChainError::invalid_path(chain.as_str(), reason)
                    }
                    other => other,
                })?;
            }
            prev = Some(token);
        }
        tracing::trace!(
            nodes = self.node_count(),
            edges = self.edge_count(),
            "chain inserted"
        );
        Ok(())
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> ChainGraph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(path: &str, policy: SelfLoopPolicy) -> Result<ChainGraph, ChainError> {
        ChainGraph::from_path(path, &PathTokenizer::default(), policy)
    }

    #[test]
    fn three_hop_chain() {
        let graph = build("A → B → C", SelfLoopPolicy::Allow).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(
            graph.edges().collect::<Vec<_>>(),
            vec![("A", "B"), ("B", "C")]
        );
    }

    #[test]
    fn single_token_is_isolated_node() {
        let graph = build("A", SelfLoopPolicy::Allow).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn immediate_repeat_is_self_loop() {
        let graph = build("A → A", SelfLoopPolicy::Allow).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.contains_edge("A", "A"));
    }

    #[test]
    fn immediate_repeat_rejected_by_policy() {
        let err = build("A → B → B", SelfLoopPolicy::Reject).unwrap_err();
        match err {
            ChainError::InvalidPath { path, reason } => {
                assert_eq!(path, "A → B → B");
                assert_eq!(reason, InvalidPathReason::SelfLoop);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn revisited_process_maps_to_existing_node() {
        let graph = build("A → B → A → B", SelfLoopPolicy::Allow).unwrap();
        assert_eq!(graph.node_count(), 2);
        // A→B twice collapses, B→A once
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.contains_edge("A", "B"));
        assert!(graph.contains_edge("B", "A"));
    }

    #[test]
    fn insert_node_is_idempotent() {
        let mut builder = ChainGraphBuilder::new(SelfLoopPolicy::Allow);
        let first = builder.insert_node("cmd.exe");
        let second = builder.insert_node("cmd.exe");
        assert_eq!(first, second);
        assert_eq!(builder.node_count(), 1);
    }

    #[test]
    fn insert_edge_is_idempotent() {
        let mut builder = ChainGraphBuilder::new(SelfLoopPolicy::Allow);
        assert!(builder.insert_edge("a", "b").unwrap());
        assert!(!builder.insert_edge("a", "b").unwrap());
        assert_eq!(builder.edge_count(), 1);
        // Reverse direction is a distinct edge
        assert!(builder.insert_edge("b", "a").unwrap());
    }

    #[test]
    fn nodes_keep_first_seen_order() {
        let graph = build("C → A → C → B", SelfLoopPolicy::Allow).unwrap();
        let names: Vec<_> = graph.nodes().map(ProcessNode::name).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn contains_edge_unknown_names() {
        let graph = build("A → B", SelfLoopPolicy::Allow).unwrap();
        assert!(!graph.contains_edge("A", "Z"));
        assert!(!graph.contains_edge("B", "A"));
    }
}
