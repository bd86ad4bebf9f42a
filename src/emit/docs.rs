use pulldown_cmark::{Alignment, CowStr, Event, Tag, TagEnd};
use pulldown_cmark_to_cmark::cmark;
use std::collections::BTreeMap;

use crate::{
    error::ExtraFieldsError,
    graph::MappingGraph,
    properties::{FieldType, VariableNode},
};

/// Marks a value attested only by the first of two clients.
pub const FIRST_ONLY_MARK: char = '\u{00B2}';
/// Marks a value attested only by the second of two clients.
pub const SECOND_ONLY_MARK: char = '\u{00B9}';

/// Column layout of the documentation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsLayout {
    pub primary_domain: String,
    pub secondary_domain: String,
    /// Header of the primary domain column, e.g. `zotero/jurism`.
    pub primary_header: String,
    pub secondary_header: String,
    /// The two clients whose attestation marks disambiguate values. No marks without them.
    pub variants: Option<(String, String)>,
}

impl DocsLayout {
    pub fn new(primary_domain: &str, secondary_domain: &str, clients: &[String]) -> DocsLayout {
        let primary_header = if clients.is_empty() {
            primary_domain.to_string()
        } else {
            clients.join("/")
        };
        let variants = match clients {
            [first, second] => Some((first.clone(), second.clone())),
            _ => None,
        };
        DocsLayout {
            primary_domain: primary_domain.to_string(),
            secondary_domain: secondary_domain.to_string(),
            primary_header,
            secondary_header: secondary_domain.to_string(),
            variants,
        }
    }

    fn mark(&self, var: &VariableNode) -> Option<char> {
        let (first, second) = self.variants.as_ref()?;
        match (var.is_attested_by(first), var.is_attested_by(second)) {
            (true, false) => Some(FIRST_ONLY_MARK),
            (false, true) => Some(SECOND_ONLY_MARK),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsRow {
    pub label: String,
    pub kind: FieldType,
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

/// One row per plain multi-word label that denotes at least one variable, sorted by label.
/// Single-word labels name the field itself and are not documented.
pub fn docs_rows(
    graph: &MappingGraph,
    layout: &DocsLayout,
) -> Result<Vec<DocsRow>, ExtraFieldsError> {
    let mut rows = BTreeMap::new();
    for (idx, label) in graph.labels() {
        if label.is_shadow() || !label.text.contains(' ') {
            continue;
        }
        let mut row: Option<DocsRow> = None;
        for (target, _) in graph.targets(idx) {
            let Some(var) = graph.node(target).and_then(|n| n.as_variable()) else {
                continue;
            };
            let current = row.get_or_insert_with(|| DocsRow {
                label: label.text.clone(),
                kind: var.kind,
                primary: Vec::new(),
                secondary: Vec::new(),
            });
            if current.kind != var.kind {
                return Err(ExtraFieldsError::MixedLabelTypes {
                    label: label.text.clone(),
                    first: current.kind,
                    second: var.kind,
                });
            }
            let mut value = var.name.clone();
            if let Some(mark) = layout.mark(var) {
                value.push(mark);
            }
            if var.domain == layout.primary_domain {
                current.primary.push(value);
            } else if var.domain == layout.secondary_domain {
                current.secondary.push(value);
            }
        }
        if let Some(mut row) = row {
            row.primary.sort();
            row.secondary.sort();
            rows.insert(row.label.clone(), row);
        }
    }
    Ok(rows.into_values().collect())
}

/// Render the documentation table as markdown.
pub fn render_docs(graph: &MappingGraph, layout: &DocsLayout) -> Result<String, ExtraFieldsError> {
    let rows = docs_rows(graph, layout)?;

    let mut events: Vec<Event<'static>> = vec![
        Event::Start(Tag::Table(vec![Alignment::None; 4])),
        Event::Start(Tag::TableHead),
    ];
    for header in [
        "label",
        "type",
        layout.primary_header.as_str(),
        layout.secondary_header.as_str(),
    ] {
        push_cell(&mut events, header.to_string(), false);
    }
    events.push(Event::End(TagEnd::TableHead));

    for row in rows.iter() {
        events.push(Event::Start(Tag::TableRow));
        push_cell(&mut events, row.label.clone(), true);
        push_cell(&mut events, row.kind.to_string(), false);
        push_cell(&mut events, escape_values(&row.primary), false);
        push_cell(&mut events, escape_values(&row.secondary), false);
        events.push(Event::End(TagEnd::TableRow));
    }
    events.push(Event::End(TagEnd::Table));

    let mut out = String::new();
    cmark(events.iter(), &mut out)?;
    out.push('\n');
    tracing::info!("Rendered documentation table with {} rows", rows.len());
    Ok(out)
}

/// Field names like `event_place` would otherwise open emphasis.
fn escape_values(values: &[String]) -> String {
    values
        .iter()
        .map(|value| value.replace('_', "\\_"))
        .collect::<Vec<_>>()
        .join(" / ")
}

fn push_cell(events: &mut Vec<Event<'static>>, text: String, strong: bool) {
    events.push(Event::Start(Tag::TableCell));
    if !text.is_empty() {
        if strong {
            events.push(Event::Start(Tag::Strong));
        }
        events.push(Event::Text(CowStr::from(text)));
        if strong {
            events.push(Event::End(TagEnd::Strong));
        }
    }
    events.push(Event::End(TagEnd::TableCell));
}
