//! GML serialization of the mapping graph for offline visualization (yEd, Gephi, Cytoscape).
//!
//! Shadow labels only exist to carry literal spellings into the mapping table, so they and their
//! edges are left out of the artifact.
use petgraph::graph::NodeIndex;
use std::{collections::BTreeMap, fmt::Write};

use crate::{
    config::Palette,
    error::ExtraFieldsError,
    graph::MappingGraph,
    properties::{EdgeStyle, MappingNode},
};

const NODE_HEIGHT: f32 = 30.0;
const CHAR_WIDTH: usize = 7;

pub fn render_gml(graph: &MappingGraph, palette: &Palette) -> Result<String, ExtraFieldsError> {
    let mut ids: BTreeMap<NodeIndex, usize> = BTreeMap::new();
    let mut out = String::new();
    writeln!(out, "graph [")?;
    writeln!(out, "  directed 1")?;

    for idx in graph.node_indices() {
        let Some(node) = graph.node(idx) else {
            continue;
        };
        if node.as_label().is_some_and(|label| label.is_shadow()) {
            continue;
        }
        let id = ids.len();
        ids.insert(idx, id);

        writeln!(out, "  node [")?;
        writeln!(out, "    id {id}")?;
        writeln!(out, "    label {}", quote(&node.key().to_string()))?;
        writeln!(out, "    domain {}", quote(node.domain()))?;
        writeln!(out, "    name {}", quote(node.name()))?;
        let width = CHAR_WIDTH * node.name().chars().count();
        match node {
            MappingNode::Variable(var) => {
                writeln!(out, "    type {}", quote(var.kind.as_str()))?;
                for client in var.attestations.iter() {
                    writeln!(out, "    {} 1", key(client))?;
                }
                writeln!(
                    out,
                    "    graphics [ h {NODE_HEIGHT:.1} w {width} fill {} ]",
                    quote(palette.domain(&var.domain))
                )?;
            }
            MappingNode::Label(_) => {
                writeln!(
                    out,
                    "    graphics [ h {NODE_HEIGHT:.1} w {width} hasFill 0 outline {} ]",
                    quote(&palette.label)
                )?;
            }
        }
        writeln!(out, "  ]")?;
    }

    let mut edge_count = 0;
    for (source_idx, source) in ids.iter() {
        for (target_idx, edge) in graph.targets(*source_idx) {
            let Some(target) = ids.get(&target_idx) else {
                continue;
            };
            edge_count += 1;
            writeln!(out, "  edge [")?;
            writeln!(out, "    source {source}")?;
            writeln!(out, "    target {target}")?;
            if !edge.events().is_empty() {
                writeln!(out, "    label {}", quote(&edge.ledger()))?;
            }
            if edge.is_removed() {
                writeln!(out, "    removed 1")?;
            }
            if edge.is_added() {
                writeln!(out, "    added 1")?;
            }
            match edge.style() {
                EdgeStyle::Declared => {
                    writeln!(out, "    graphics [ targetArrow \"standard\" ]")?;
                }
                EdgeStyle::Removed => {
                    writeln!(
                        out,
                        "    graphics [ style \"dashed\" fill {} targetArrow \"standard\" ]",
                        quote(&palette.removed)
                    )?;
                    writeln!(out, "    LabelGraphics [ color {} ]", quote(&palette.label))?;
                }
                EdgeStyle::Added => {
                    writeln!(
                        out,
                        "    graphics [ style \"dashed\" fill {} targetArrow \"standard\" ]",
                        quote(&palette.added)
                    )?;
                }
            }
            writeln!(out, "  ]")?;
        }
    }
    writeln!(out, "]")?;

    tracing::info!(
        "Serialized graph artifact: {} nodes, {edge_count} edges",
        ids.len()
    );
    Ok(out)
}

/// GML strings may not contain `"` and are restricted to ASCII; everything else is written as an
/// HTML character reference.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("&quot;"),
            '&' => quoted.push_str("&amp;"),
            c if c.is_ascii() && !c.is_ascii_control() => quoted.push(c),
            c => {
                let _ = write!(quoted, "&#{};", c as u32);
            }
        }
    }
    quoted.push('"');
    quoted
}

/// GML keys must start with a letter and contain only alphanumerics.
fn key(value: &str) -> String {
    let mut key = value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>();
    if !key.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        key.insert(0, 'k');
    }
    key
}
