//! Single-source shortest paths over the mapping graph.
//!
//! The cost function sees every edge and may return `None` to take the edge out of routing
//! entirely. The expander uses this to route around edges the conflict resolver removed.
use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    stable_graph::EdgeReference,
    visit::EdgeRef,
    Direction,
};
use std::{
    cmp::Reverse,
    collections::{BTreeMap, BinaryHeap},
};

use super::MappingStableGraph;
use crate::properties::MappingEdge;

#[derive(Debug, Clone, Default)]
pub struct ShortestPaths {
    source: NodeIndex,
    distance: BTreeMap<NodeIndex, u32>,
    predecessor: BTreeMap<NodeIndex, (NodeIndex, EdgeIndex)>,
}

impl ShortestPaths {
    pub fn source(&self) -> NodeIndex {
        self.source
    }

    pub fn distance(&self, target: NodeIndex) -> Option<u32> {
        self.distance.get(&target).copied()
    }

    /// Reachable nodes (the source included) in ascending index order.
    pub fn reachable(&self) -> impl Iterator<Item = (NodeIndex, u32)> + '_ {
        self.distance.iter().map(|(idx, dist)| (*idx, *dist))
    }

    /// Nodes along the chosen shortest path, both endpoints included.
    pub fn path(&self, target: NodeIndex) -> Option<Vec<NodeIndex>> {
        self.distance.get(&target)?;
        let mut nodes = vec![target];
        let mut cursor = target;
        while let Some((prev, _)) = self.predecessor.get(&cursor) {
            nodes.push(*prev);
            cursor = *prev;
        }
        nodes.reverse();
        Some(nodes)
    }

    /// Edges along the chosen shortest path, in travel order.
    pub fn path_edges(&self, target: NodeIndex) -> Option<Vec<EdgeIndex>> {
        self.distance.get(&target)?;
        let mut edges = Vec::new();
        let mut cursor = target;
        while let Some((prev, edge)) = self.predecessor.get(&cursor) {
            edges.push(*edge);
            cursor = *prev;
        }
        edges.reverse();
        Some(edges)
    }
}

/// Dijkstra from `source`. Ties keep the first path found; neighbors are relaxed in ascending
/// edge index order so the result only depends on graph construction order.
pub fn shortest_paths<F>(
    graph: &MappingStableGraph,
    source: NodeIndex,
    mut cost: F,
) -> ShortestPaths
where
    F: FnMut(EdgeReference<'_, MappingEdge>) -> Option<u32>,
{
    let mut paths = ShortestPaths {
        source,
        ..Default::default()
    };
    if graph.node_weight(source).is_none() {
        return paths;
    }

    let mut frontier = BinaryHeap::new();
    paths.distance.insert(source, 0);
    frontier.push(Reverse((0u32, source)));

    while let Some(Reverse((dist, node))) = frontier.pop() {
        if paths.distance.get(&node).is_some_and(|best| dist > *best) {
            continue;
        }
        let mut edges = graph
            .edges_directed(node, Direction::Outgoing)
            .collect::<Vec<_>>();
        edges.sort_by_key(|edge| edge.id());
        for edge in edges {
            let Some(step) = cost(edge) else {
                continue;
            };
            let next = edge.target();
            let candidate = dist + step;
            let improves = paths
                .distance
                .get(&next)
                .map_or(true, |known| candidate < *known);
            if improves {
                paths.distance.insert(next, candidate);
                paths.predecessor.insert(next, (node, edge.id()));
                frontier.push(Reverse((candidate, next)));
            }
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        graph::MappingGraph,
        properties::{FieldType, NodeKey},
    };
    use test_log::test;

    fn chain() -> MappingGraph {
        let mut g = MappingGraph::new(["zotero", "csl"]);
        for name in ["a", "b", "c"] {
            g.upsert_variable("zotero", name, FieldType::Text, "zotero")
                .unwrap();
        }
        g.upsert_variable("csl", "d", FieldType::Text, "zotero")
            .unwrap();
        let key = |name: &str| NodeKey::variable("zotero", name);
        g.add_mapping(&key("a"), &key("b"), false).unwrap();
        g.add_mapping(&key("b"), &key("c"), false).unwrap();
        g.add_mapping(&key("a"), &NodeKey::variable("csl", "d"), false)
            .unwrap();
        g.add_mapping(&NodeKey::variable("csl", "d"), &key("c"), false)
            .unwrap();
        g
    }

    #[test]
    fn unit_costs_find_two_edge_paths() {
        let g = chain();
        let a = g.find(&NodeKey::variable("zotero", "a")).unwrap();
        let c = g.find(&NodeKey::variable("zotero", "c")).unwrap();
        let paths = shortest_paths(g.as_graph(), a, |_| Some(1));

        assert_eq!(paths.distance(a), Some(0));
        assert_eq!(paths.distance(c), Some(2));
        assert_eq!(paths.path(c).unwrap().len(), 3);
        assert_eq!(paths.path_edges(c).unwrap().len(), 2);
        assert_eq!(paths.path(a).unwrap(), vec![a]);
        assert!(paths.path_edges(a).unwrap().is_empty());
    }

    #[test]
    fn rejected_edges_are_never_routed() {
        let g = chain();
        let a = g.find(&NodeKey::variable("zotero", "a")).unwrap();
        let b = g.find(&NodeKey::variable("zotero", "b")).unwrap();
        let c = g.find(&NodeKey::variable("zotero", "c")).unwrap();
        let d = g.find(&NodeKey::variable("csl", "d")).unwrap();
        let ab = g.as_graph().find_edge(a, b).unwrap();

        let paths = shortest_paths(g.as_graph(), a, |edge| {
            if edge.id() == ab {
                None
            } else {
                Some(1)
            }
        });

        assert_eq!(paths.distance(b), None);
        assert_eq!(paths.path(c).unwrap(), vec![a, d, c]);
        assert!(!paths.path_edges(c).unwrap().contains(&ab));
    }

    #[test]
    fn nodes_without_routes_are_absent() {
        let g = chain();
        let c = g.find(&NodeKey::variable("zotero", "c")).unwrap();
        let paths = shortest_paths(g.as_graph(), c, |_| Some(1));
        assert_eq!(paths.reachable().count(), 1);
        assert_eq!(paths.source(), c);
    }
}
