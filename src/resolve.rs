//! Conflict resolution.
//!
//! Two or more variables of one domain mapping into the same node would overwrite each other
//! when materialized. Every edge of such a fan-in is marked removed and stamped with a shared
//! event ID. Nothing is ranked and nothing is deleted: removed edges stay in the graph for audit
//! but are excluded from hop-through routing.
use petgraph::graph::EdgeIndex;
use std::collections::BTreeMap;

use crate::{
    config::DeniedField,
    graph::MappingGraph,
    properties::{NodeKey, LABEL_DOMAIN},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictEvent {
    pub event: u32,
    pub target: NodeKey,
    pub domain: String,
    pub sources: Vec<NodeKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub conflicts: Vec<ConflictEvent>,
}

impl ResolveReport {
    pub fn removed_edges(&self) -> usize {
        self.conflicts.iter().map(|c| c.sources.len()).sum()
    }
}

/// Drop long-form text variables so they never take part in ambiguity analysis. Returns the
/// number of nodes removed.
pub fn prune_denied(graph: &mut MappingGraph, deny_list: &[DeniedField]) -> usize {
    let removed = deny_list
        .iter()
        .filter(|denied| {
            graph
                .remove_node(&NodeKey::variable(&denied.domain, &denied.field))
                .is_some()
        })
        .count();
    tracing::info!("Pruned {removed} long-form text variables");
    removed
}

/// Mark every same-domain fan-in as removed.
pub fn resolve_conflicts(graph: &mut MappingGraph) -> ResolveReport {
    let mut report = ResolveReport::default();

    for node in graph.node_indices() {
        let Some(target) = graph.node(node).map(|n| n.key()) else {
            continue;
        };
        let mut by_domain: BTreeMap<String, Vec<(EdgeIndex, NodeKey)>> = BTreeMap::new();
        for (edge, source) in graph.incoming(node) {
            let Some(source_node) = graph.node(source) else {
                continue;
            };
            by_domain
                .entry(source_node.domain().to_string())
                .or_default()
                .push((edge, source_node.key()));
        }

        for (domain, edges) in by_domain {
            if domain == LABEL_DOMAIN || edges.len() < 2 {
                continue;
            }
            let event = graph.next_event_id();
            let mut sources = Vec::with_capacity(edges.len());
            for (edge, source) in edges {
                if let Some(weight) = graph.edge_mut(edge) {
                    weight.mark_removed(event);
                }
                sources.push(source);
            }
            tracing::debug!(
                "Conflict {event}: {} {domain} variables map into {target}",
                sources.len()
            );
            report.conflicts.push(ConflictEvent {
                event,
                target: target.clone(),
                domain,
                sources,
            });
        }
    }

    tracing::info!(
        "Resolved {} conflicts, {} edges removed from routing",
        report.conflicts.len(),
        report.removed_edges()
    );
    report
}

/// Delete labels left without any outgoing edge, e.g. after their variable was pruned.
pub fn prune_orphan_labels(graph: &mut MappingGraph) -> usize {
    let orphans = graph
        .labels()
        .into_iter()
        .filter(|(idx, _)| graph.targets(*idx).is_empty())
        .map(|(_, label)| NodeKey::label(&label.text))
        .collect::<Vec<_>>();
    for key in orphans.iter() {
        graph.remove_node(key);
    }
    tracing::debug!("Removed {} orphaned labels", orphans.len());
    orphans.len()
}
