//! Schema loading: turns one normalized schema document into variables, cross-domain mappings
//! and labels on the shared [MappingGraph].
use crate::{
    error::ExtraFieldsError,
    graph::MappingGraph,
    properties::{FieldType, NodeKey},
    schema::SchemaDocument,
};

/// The two domains a schema document describes: `itemTypes` belong to the primary domain and the
/// `csl` section declares the secondary one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPair {
    pub primary: String,
    pub secondary: String,
}

impl DomainPair {
    pub fn new(primary: &str, secondary: &str) -> DomainPair {
        DomainPair {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
        }
    }
}

impl Default for DomainPair {
    fn default() -> Self {
        DomainPair::new("zotero", "csl")
    }
}

/// Count of what one load pass contributed, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Load `schema` into `graph`, attesting every variable it touches for `client`.
pub fn load_schema(
    graph: &mut MappingGraph,
    schema: &SchemaDocument,
    client: &str,
    domains: &DomainPair,
) -> Result<LoadSummary, ExtraFieldsError> {
    let before = (graph.node_count(), graph.edge_count());
    let primary = domains.primary.as_str();
    let secondary = domains.secondary.as_str();

    for item_type in schema.item_types.iter() {
        for field in item_type.fields.iter() {
            let name = field.mapped_name();
            let kind = FieldType::from_kind_lenient(schema.field_type(name));
            graph.upsert_variable(primary, name, kind, client)?;
        }
        for creator in item_type.creator_types.iter() {
            graph.upsert_variable(primary, &creator.creator_type, FieldType::Name, client)?;
        }
    }

    for (csl, fields) in schema.csl.fields.text.iter() {
        graph.upsert_variable(secondary, csl, FieldType::Text, client)?;
        for field in fields {
            graph.upsert_variable(primary, field, FieldType::Text, client)?;
            graph.add_mapping(
                &NodeKey::variable(secondary, csl),
                &NodeKey::variable(primary, field),
                true,
            )?;
        }
    }

    for (csl, fields) in schema.csl.fields.date.iter() {
        graph.upsert_variable(secondary, csl, FieldType::Date, client)?;
        for field in fields.to_vec() {
            graph.upsert_variable(primary, &field, FieldType::Date, client)?;
            graph.add_mapping(
                &NodeKey::variable(secondary, csl),
                &NodeKey::variable(primary, &field),
                true,
            )?;
        }
    }

    for (role, csl) in schema.csl.names.iter() {
        graph.upsert_variable(secondary, csl, FieldType::Name, client)?;
        graph.upsert_variable(primary, role, FieldType::Name, client)?;
        graph.add_mapping(
            &NodeKey::variable(secondary, csl),
            &NodeKey::variable(primary, role),
            true,
        )?;
    }

    for (csl, kind) in schema.csl.unmapped.iter() {
        if kind == "type" {
            continue;
        }
        let field_type =
            FieldType::from_kind(kind).ok_or_else(|| ExtraFieldsError::UnexpectedKind {
                domain: secondary.to_string(),
                name: csl.clone(),
                kind: kind.clone(),
            })?;
        graph.upsert_variable(secondary, csl, field_type, client)?;
    }

    graph.derive_labels()?;

    for item_type in schema.item_types.iter() {
        for field in item_type.fields.iter() {
            if let Some(base) = field.base_field.as_deref() {
                graph.add_label(primary, base, &field.field)?;
            }
        }
    }

    for (alias, csl) in schema.csl.alias.iter() {
        graph.add_label(secondary, csl, alias)?;
    }

    let summary = LoadSummary {
        nodes: graph.node_count() - before.0,
        edges: graph.edge_count() - before.1,
    };
    tracing::info!(
        "Loaded schema for client '{client}': {} new nodes, {} new edges",
        summary.nodes,
        summary.edges
    );
    Ok(summary)
}
