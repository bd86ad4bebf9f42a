use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    stable_graph::StableGraph,
    visit::EdgeRef,
    Directed, Direction,
};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::ExtraFieldsError,
    properties::{LabelNode, MappingEdge, MappingNode, NodeKey, VariableNode, LABEL_DOMAIN},
};

pub type MappingStableGraph = StableGraph<MappingNode, MappingEdge, Directed, u32>;

/// Directed graph of variables and labels for one run.
///
/// Nodes are looked up by [NodeKey]. Removing a node keeps every other index valid, which the
/// resolver and expander rely on while they hold index snapshots. Not `Clone`: one graph is
/// threaded through every stage of a run.
#[derive(Debug)]
pub struct MappingGraph {
    graph: MappingStableGraph,
    index: BTreeMap<NodeKey, NodeIndex>,
    domains: BTreeSet<String>,
    last_event: u32,
}

impl MappingGraph {
    /// Create an empty graph that accepts variables from the given domains.
    pub fn new<I, S>(domains: I) -> MappingGraph
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MappingGraph {
            graph: StableGraph::default(),
            index: BTreeMap::new(),
            domains: domains.into_iter().map(Into::into).collect(),
            last_event: 0,
        }
    }

    pub fn as_graph(&self) -> &MappingStableGraph {
        &self.graph
    }

    pub(crate) fn as_graph_mut(&mut self) -> &mut MappingStableGraph {
        &mut self.graph
    }

    pub fn domains(&self) -> &BTreeSet<String> {
        &self.domains
    }

    pub fn check_domain(&self, domain: &str) -> Result<(), ExtraFieldsError> {
        if domain == LABEL_DOMAIN || !self.domains.contains(domain) {
            return Err(ExtraFieldsError::UnknownDomain(domain.to_string()));
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn find(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&MappingNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_by_key(&self, key: &NodeKey) -> Option<&MappingNode> {
        self.find(key).and_then(|idx| self.node(idx))
    }

    pub fn variable(&self, domain: &str, name: &str) -> Option<&VariableNode> {
        self.node_by_key(&NodeKey::variable(domain, name))
            .and_then(MappingNode::as_variable)
    }

    pub fn label(&self, text: &str) -> Option<&LabelNode> {
        self.node_by_key(&NodeKey::label(text))
            .and_then(MappingNode::as_label)
    }

    pub fn edge(&self, idx: EdgeIndex) -> Option<&MappingEdge> {
        self.graph.edge_weight(idx)
    }

    pub(crate) fn edge_mut(&mut self, idx: EdgeIndex) -> Option<&mut MappingEdge> {
        self.graph.edge_weight_mut(idx)
    }

    pub fn find_edge(&self, source: &NodeKey, sink: &NodeKey) -> Option<EdgeIndex> {
        let source_idx = self.find(source)?;
        let sink_idx = self.find(sink)?;
        self.graph.find_edge(source_idx, sink_idx)
    }

    pub fn edge_between(&self, source: &NodeKey, sink: &NodeKey) -> Option<&MappingEdge> {
        self.find_edge(source, sink).and_then(|idx| self.edge(idx))
    }

    /// Node indices in ascending order, so every full scan is deterministic.
    pub fn node_indices(&self) -> Vec<NodeIndex> {
        let mut indices = self.graph.node_indices().collect::<Vec<_>>();
        indices.sort();
        indices
    }

    /// Label nodes sorted by their text.
    pub fn labels(&self) -> Vec<(NodeIndex, &LabelNode)> {
        self.index
            .iter()
            .filter_map(|(key, idx)| match key {
                NodeKey::Label(_) => self.node(*idx).and_then(|n| n.as_label()).map(|l| (*idx, l)),
                NodeKey::Variable { .. } => None,
            })
            .collect()
    }

    /// Variable nodes sorted by `(domain, name)`.
    pub fn variables(&self) -> Vec<(NodeIndex, &VariableNode)> {
        self.index
            .iter()
            .filter_map(|(key, idx)| match key {
                NodeKey::Variable { .. } => self
                    .node(*idx)
                    .and_then(|n| n.as_variable())
                    .map(|v| (*idx, v)),
                NodeKey::Label(_) => None,
            })
            .collect()
    }

    /// Targets of every outgoing edge of `idx`, paired with the edge weight.
    pub fn targets(&self, idx: NodeIndex) -> Vec<(NodeIndex, &MappingEdge)> {
        let mut targets = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (edge.target(), edge.weight()))
            .collect::<Vec<_>>();
        targets.sort_by_key(|(target, _)| *target);
        targets
    }

    pub fn incoming(&self, idx: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
        let mut incoming = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|edge| (edge.id(), edge.source()))
            .collect::<Vec<_>>();
        incoming.sort();
        incoming
    }

    pub(crate) fn insert_node(&mut self, node: MappingNode) -> NodeIndex {
        let key = node.key();
        let idx = self.graph.add_node(node);
        self.index.insert(key, idx);
        idx
    }

    /// Remove a node and every edge touching it. Returns the removed node, if it existed.
    pub fn remove_node(&mut self, key: &NodeKey) -> Option<MappingNode> {
        let idx = self.index.remove(key)?;
        tracing::debug!("Removing node {key}");
        self.graph.remove_node(idx)
    }

    /// Hand out the next conflict/inference event ID. IDs start at 1 for a fresh graph.
    pub fn next_event_id(&mut self) -> u32 {
        self.last_event += 1;
        self.last_event
    }

    pub fn last_event_id(&self) -> u32 {
        self.last_event
    }
}
