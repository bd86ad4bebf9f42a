use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::{error::ExtraFieldsError, graph::MappingGraph, properties::FieldType};

/// Fields one label denotes, grouped by domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMapping {
    pub kind: FieldType,
    pub fields: BTreeMap<String, Vec<String>>,
}

impl LabelMapping {
    pub fn fields_in(&self, domain: &str) -> &[String] {
        self.fields.get(domain).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Canonical label -> fields table, sorted by label text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping(pub BTreeMap<String, LabelMapping>);

impl FieldMapping {
    pub fn get(&self, label: &str) -> Option<&LabelMapping> {
        self.0.get(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LabelMapping)> {
        self.0.iter()
    }

    /// A name label must never map onto more than one field per domain.
    pub fn check_name_cardinality(&self) -> Result<(), ExtraFieldsError> {
        for (label, mapped) in self.0.iter() {
            if mapped.kind != FieldType::Name {
                continue;
            }
            if let Some((domain, fields)) = mapped.fields.iter().find(|(_, f)| f.len() > 1) {
                return Err(ExtraFieldsError::NameCardinality {
                    label: label.clone(),
                    domain: domain.clone(),
                    fields: fields.clone(),
                });
            }
        }
        Ok(())
    }

    /// `{label: {"type": kind, domain: [fields...]}}` with every object's keys sorted.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        for (label, mapped) in self.0.iter() {
            let mut entry = Map::new();
            entry.insert("type".to_string(), Value::from(mapped.kind.as_str()));
            for (domain, fields) in mapped.fields.iter() {
                entry.insert(domain.clone(), Value::from(fields.clone()));
            }
            root.insert(label.clone(), Value::Object(entry));
        }
        Value::Object(root)
    }

    pub fn to_json_string(&self) -> Result<String, ExtraFieldsError> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }
}

/// Walk every label and collect the variables it points at. Labels without variables are left
/// out. Mixed variable types under one label and name labels fanning out within a domain abort
/// the projection.
pub fn project_mapping(graph: &MappingGraph) -> Result<FieldMapping, ExtraFieldsError> {
    let mut mapping = BTreeMap::new();
    for (idx, label) in graph.labels() {
        let mut entry: Option<LabelMapping> = None;
        for (target, _) in graph.targets(idx) {
            let Some(var) = graph.node(target).and_then(|n| n.as_variable()) else {
                continue;
            };
            let mapped = entry.get_or_insert_with(|| LabelMapping {
                kind: var.kind,
                fields: BTreeMap::new(),
            });
            if mapped.kind != var.kind {
                return Err(ExtraFieldsError::MixedLabelTypes {
                    label: label.text.clone(),
                    first: mapped.kind,
                    second: var.kind,
                });
            }
            mapped
                .fields
                .entry(var.domain.clone())
                .or_default()
                .push(var.name.clone());
        }
        if let Some(mut mapped) = entry {
            for fields in mapped.fields.values_mut() {
                fields.sort();
            }
            mapping.insert(label.text.clone(), mapped);
        }
    }

    let mapping = FieldMapping(mapping);
    mapping.check_name_cardinality()?;
    tracing::info!("Projected {} labels", mapping.len());
    Ok(mapping)
}
