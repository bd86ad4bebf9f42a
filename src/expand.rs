//! Hop-through expansion.
//!
//! A label pointing at a variable that itself maps into another domain gets a direct edge to the
//! variable on the far side, provided that:
//!
//! - the shortest live path is exactly `label -> intermediate -> target` (longer chains are not
//!   inferred),
//! - no edge `label -> target` exists yet,
//! - the label had no direct edge into the target's domain before expansion started.
//!
//! Paths are computed once, up front, over the live topology only (removed edges are not
//! routable), so expansion never cascades off its own synthetic edges and the resulting edge set
//! does not depend on the order labels are visited in.
use petgraph::graph::{EdgeIndex, NodeIndex};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    graph::{shortest_paths, MappingGraph},
    properties::{MappingEdge, NodeKey},
};

/// Number of nodes on a justifying path: label, intermediate, target.
pub const HOP_THROUGH_PATH_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopThrough {
    pub event: u32,
    pub label: String,
    pub via: NodeKey,
    pub target: NodeKey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandReport {
    pub added: Vec<HopThrough>,
}

struct Candidate {
    label: NodeIndex,
    target: NodeIndex,
    nodes: Vec<NodeIndex>,
    edges: Vec<EdgeIndex>,
}

/// Domains each plain (non-shadow) label reaches through a direct edge.
pub fn direct_domains(graph: &MappingGraph) -> BTreeMap<NodeIndex, BTreeSet<String>> {
    graph
        .labels()
        .into_iter()
        .filter(|(_, label)| !label.is_shadow())
        .map(|(idx, _)| {
            let domains = graph
                .targets(idx)
                .into_iter()
                .filter_map(|(target, _)| graph.node(target))
                .map(|node| node.domain().to_string())
                .collect::<BTreeSet<_>>();
            (idx, domains)
        })
        .collect()
}

pub fn expand_hop_through(graph: &mut MappingGraph) -> ExpandReport {
    let direct = direct_domains(graph);

    let mut candidates = Vec::new();
    for label in direct.keys() {
        let paths = shortest_paths(graph.as_graph(), *label, |edge| {
            if edge.weight().is_removed() {
                None
            } else {
                Some(1)
            }
        });
        for (target, _) in paths.reachable() {
            if target == *label {
                continue;
            }
            let (Some(nodes), Some(edges)) = (paths.path(target), paths.path_edges(target)) else {
                continue;
            };
            candidates.push(Candidate {
                label: *label,
                target,
                nodes,
                edges,
            });
        }
    }

    let mut report = ExpandReport::default();
    for candidate in candidates {
        if candidate.nodes.len() != HOP_THROUGH_PATH_LEN {
            continue;
        }
        if graph
            .as_graph()
            .find_edge(candidate.label, candidate.target)
            .is_some()
        {
            continue;
        }
        let (Some(label), Some(target), Some(via)) = (
            graph.node(candidate.label).map(|n| n.name().to_string()),
            graph.node(candidate.target).map(|n| n.key()),
            graph.node(candidate.nodes[1]).map(|n| n.key()),
        ) else {
            continue;
        };
        if direct
            .get(&candidate.label)
            .is_some_and(|domains| domains.contains(target.domain()))
        {
            continue;
        }

        let event = graph.next_event_id();
        for edge in candidate.edges.iter() {
            if let Some(weight) = graph.edge_mut(*edge) {
                weight.record(event);
            }
        }
        graph
            .as_graph_mut()
            .add_edge(candidate.label, candidate.target, MappingEdge::hop_through(event));
        tracing::debug!("Hop-through {event}: label '{label}' -> {target} via {via}");
        report.added.push(HopThrough {
            event,
            label,
            via,
            target,
        });
    }

    tracing::info!("Added {} hop-through edges", report.added.len());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{properties::FieldType, resolve::resolve_conflicts};
    use test_log::test;

    fn author_graph() -> MappingGraph {
        let mut g = MappingGraph::new(["domain1", "domain2"]);
        g.upsert_variable("domain1", "creator", FieldType::Name, "client")
            .unwrap();
        g.upsert_variable("domain2", "author", FieldType::Name, "client")
            .unwrap();
        g.add_mapping(
            &NodeKey::variable("domain1", "creator"),
            &NodeKey::variable("domain2", "author"),
            false,
        )
        .unwrap();
        g.add_label("domain1", "creator", "writer").unwrap();
        g
    }

    #[test]
    fn one_hop_relationships_become_direct_edges() {
        let mut g = author_graph();
        let report = expand_hop_through(&mut g);

        assert_eq!(report.added.len(), 1);
        let hop = &report.added[0];
        assert_eq!(hop.label, "writer");
        assert_eq!(hop.via, NodeKey::variable("domain1", "creator"));
        assert_eq!(hop.target, NodeKey::variable("domain2", "author"));

        let added = g
            .edge_between(&NodeKey::label("writer"), &hop.target)
            .unwrap();
        assert!(added.is_added());
        assert_eq!(added.events(), &[hop.event]);
        // the justifying path carries the event too
        let label_edge = g
            .edge_between(&NodeKey::label("writer"), &hop.via)
            .unwrap();
        assert_eq!(label_edge.events(), &[hop.event]);
        let mapping_edge = g.edge_between(&hop.via, &hop.target).unwrap();
        assert_eq!(mapping_edge.events(), &[hop.event]);
    }

    #[test]
    fn labels_already_in_the_target_domain_are_not_fanned_out() {
        let mut g = author_graph();
        g.upsert_variable("domain2", "editor", FieldType::Name, "client")
            .unwrap();
        g.add_label("domain2", "editor", "writer").unwrap();

        let report = expand_hop_through(&mut g);
        assert!(report.added.is_empty());
        assert!(g
            .edge_between(
                &NodeKey::label("writer"),
                &NodeKey::variable("domain2", "author")
            )
            .is_none());
    }

    #[test]
    fn longer_chains_are_not_inferred() {
        let mut g = MappingGraph::new(["domain1", "domain2"]);
        for name in ["a", "b"] {
            g.upsert_variable("domain1", name, FieldType::Text, "client")
                .unwrap();
        }
        g.upsert_variable("domain2", "c", FieldType::Text, "client")
            .unwrap();
        g.add_mapping(
            &NodeKey::variable("domain1", "a"),
            &NodeKey::variable("domain1", "b"),
            false,
        )
        .unwrap();
        g.add_mapping(
            &NodeKey::variable("domain1", "b"),
            &NodeKey::variable("domain2", "c"),
            false,
        )
        .unwrap();
        g.add_label("domain1", "a", "start").unwrap();

        let report = expand_hop_through(&mut g);
        // start -> a -> b is one hop but b shares the label's direct domain
        assert!(report.added.is_empty());
        assert!(g
            .edge_between(&NodeKey::label("start"), &NodeKey::variable("domain2", "c"))
            .is_none());
    }

    #[test]
    fn removed_edges_are_not_routed() {
        let mut g = MappingGraph::new(["domain1", "domain2"]);
        for name in ["titleShort", "titleFull"] {
            g.upsert_variable("domain1", name, FieldType::Text, "client")
                .unwrap();
        }
        g.upsert_variable("domain2", "title", FieldType::Text, "client")
            .unwrap();
        for name in ["titleShort", "titleFull"] {
            g.add_mapping(
                &NodeKey::variable("domain1", name),
                &NodeKey::variable("domain2", "title"),
                true,
            )
            .unwrap();
        }
        g.derive_labels().unwrap();
        resolve_conflicts(&mut g);

        let report = expand_hop_through(&mut g);
        let title = NodeKey::variable("domain2", "title");
        for label in ["title short", "title full"] {
            assert!(g.edge_between(&NodeKey::label(label), &title).is_none());
        }
        // the live reverse edges still let the domain2 label reach both domain1 variables
        assert_eq!(report.added.len(), 2);
        assert!(report.added.iter().all(|hop| hop.label == "title"));
        // removed edges keep their flag
        for name in ["titleShort", "titleFull"] {
            assert!(g
                .edge_between(&NodeKey::variable("domain1", name), &title)
                .unwrap()
                .is_removed());
        }
    }

    #[test]
    fn shadow_labels_are_not_expanded() {
        let mut g = author_graph();
        g.add_label("domain1", "creator", "creatorName").unwrap();
        let report = expand_hop_through(&mut g);
        assert!(report
            .added
            .iter()
            .all(|hop| hop.label != "creatorName"));
        assert!(g
            .edge_between(
                &NodeKey::label("creatorName"),
                &NodeKey::variable("domain2", "author")
            )
            .is_none());
        // its plain spelling is expanded
        assert!(g
            .edge_between(
                &NodeKey::label("creator name"),
                &NodeKey::variable("domain2", "author")
            )
            .is_some());
    }

    fn declared_graph(reverse: bool) -> MappingGraph {
        let mut variables = vec![
            ("domain1", "creator", FieldType::Name),
            ("domain1", "title", FieldType::Text),
            ("domain1", "place", FieldType::Text),
            ("domain2", "author", FieldType::Name),
            ("domain2", "title", FieldType::Text),
            ("domain2", "event-place", FieldType::Text),
        ];
        let mut mappings = vec![
            (("domain1", "creator"), ("domain2", "author")),
            (("domain1", "title"), ("domain2", "title")),
            (("domain1", "place"), ("domain2", "event-place")),
        ];
        let mut labels = vec![
            ("domain1", "creator", "writer"),
            ("domain2", "title", "heading"),
            ("domain1", "place", "venue"),
            ("domain2", "event-place", "venue"),
        ];
        if reverse {
            variables.reverse();
            mappings.reverse();
            labels.reverse();
        }

        let mut g = MappingGraph::new(["domain1", "domain2"]);
        for (domain, name, kind) in variables {
            g.upsert_variable(domain, name, kind, "client").unwrap();
        }
        for ((d1, n1), (d2, n2)) in mappings {
            g.add_mapping(&NodeKey::variable(d1, n1), &NodeKey::variable(d2, n2), true)
                .unwrap();
        }
        for (domain, name, text) in labels {
            g.add_label(domain, name, text).unwrap();
        }
        g
    }

    #[test]
    fn inferred_edges_do_not_depend_on_declaration_order() {
        let pairs = |report: ExpandReport| {
            report
                .added
                .into_iter()
                .map(|hop| (hop.label, hop.target))
                .collect::<BTreeSet<_>>()
        };

        let mut forward = declared_graph(false);
        let mut backward = declared_graph(true);
        assert_ne!(
            forward.find(&NodeKey::label("writer")),
            backward.find(&NodeKey::label("writer"))
        );

        let forward_pairs = pairs(expand_hop_through(&mut forward));
        let backward_pairs = pairs(expand_hop_through(&mut backward));
        assert_eq!(forward_pairs, backward_pairs);
        assert_eq!(
            forward_pairs,
            BTreeSet::from([
                ("heading".to_string(), NodeKey::variable("domain1", "title")),
                ("writer".to_string(), NodeKey::variable("domain2", "author")),
            ])
        );
    }
}
