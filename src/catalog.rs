//! Per-client catalogs extracted straight from the schema documents: creator roles per item type,
//! which fields are valid for which item type (and in which client), base-field aliases and the
//! CSL type list. No graph involved.
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

use crate::{error::ExtraFieldsError, schema::SchemaDocument};

/// Alias bucket for base-field aliases declared by more than one client.
pub const SHARED_ALIASES: &str = "both";

const NOTE_FIELDS: &[&str] = &[
    "itemType",
    "tags",
    "note",
    "id",
    "itemID",
    "dateAdded",
    "dateModified",
];
const ATTACHMENT_FIELDS: &[&str] = &[
    "itemType",
    "tags",
    "id",
    "itemID",
    "dateAdded",
    "dateModified",
];
const REGULAR_FIELDS: &[&str] = &[
    "itemType",
    "creators",
    "tags",
    "attachments",
    "notes",
    "seeAlso",
    "id",
    "itemID",
    "dateAdded",
    "dateModified",
    "multi",
];

/// Which client(s) know an item type or field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Client(String),
    All,
}

impl Availability {
    /// Fold another client's sighting into this one.
    fn merge(&mut self, client: &str) {
        if let Availability::Client(known) = self {
            if known != client {
                *self = Availability::All;
            }
        }
    }
}

impl Serialize for Availability {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        match self {
            Availability::Client(client) => ser.serialize_str(client),
            Availability::All => ser.serialize_bool(true),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldValidity {
    #[serde(rename = "type")]
    pub item_types: BTreeMap<String, Availability>,
    #[serde(rename = "field")]
    pub fields: BTreeMap<String, BTreeMap<String, Availability>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaCatalog {
    /// client -> item type -> creator roles
    pub creators: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    pub fields: FieldValidity,
    /// client (or [SHARED_ALIASES]) -> base field -> alias fields
    pub aliases: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    pub csl_types: Vec<String>,
}

impl SchemaCatalog {
    pub fn extract(schemas: &[(String, SchemaDocument)]) -> SchemaCatalog {
        let catalog = SchemaCatalog {
            creators: extract_creators(schemas),
            fields: extract_field_validity(schemas),
            aliases: extract_aliases(schemas),
            csl_types: extract_csl_types(schemas),
        };
        tracing::info!(
            "Catalogued {} item types, {} CSL types",
            catalog.fields.item_types.len(),
            catalog.csl_types.len()
        );
        catalog
    }

    pub fn creators_json(&self) -> Result<String, ExtraFieldsError> {
        Ok(serde_json::to_string_pretty(&self.creators)?)
    }

    pub fn fields_json(&self) -> Result<String, ExtraFieldsError> {
        #[derive(Serialize)]
        struct FieldsFile<'a> {
            valid: &'a FieldValidity,
            aliases: &'a BTreeMap<String, BTreeMap<String, Vec<String>>>,
        }
        Ok(serde_json::to_string_pretty(&FieldsFile {
            valid: &self.fields,
            aliases: &self.aliases,
        })?)
    }

    pub fn csl_types_json(&self) -> Result<String, ExtraFieldsError> {
        Ok(serde_json::to_string(&self.csl_types)?)
    }
}

fn extract_creators(
    schemas: &[(String, SchemaDocument)],
) -> BTreeMap<String, BTreeMap<String, Vec<String>>> {
    let mut creators = BTreeMap::new();
    for (client, schema) in schemas {
        let per_type: &mut BTreeMap<String, Vec<String>> =
            creators.entry(client.clone()).or_default();
        for item_type in schema.item_types.iter() {
            if item_type.creator_types.is_empty() {
                continue;
            }
            per_type
                .entry(item_type.item_type.clone())
                .or_default()
                .extend(item_type.creator_types.iter().map(|c| c.creator_type.clone()));
        }
    }
    creators
}

fn always_valid(item_type: &str) -> &'static [&'static str] {
    match item_type {
        "note" => NOTE_FIELDS,
        "attachment" => ATTACHMENT_FIELDS,
        _ => REGULAR_FIELDS,
    }
}

fn extract_field_validity(schemas: &[(String, SchemaDocument)]) -> FieldValidity {
    let mut valid = FieldValidity::default();

    for (client, schema) in schemas {
        for item_type in schema.item_types.iter() {
            let name = &item_type.item_type;
            match valid.item_types.get_mut(name) {
                Some(known) => known.merge(client),
                None => {
                    valid
                        .item_types
                        .insert(name.clone(), Availability::Client(client.clone()));
                    valid.fields.insert(
                        name.clone(),
                        always_valid(name)
                            .iter()
                            .map(|field| (field.to_string(), Availability::All))
                            .collect(),
                    );
                }
            }
        }
    }

    for (client, schema) in schemas {
        for item_type in schema.item_types.iter() {
            let fields = valid.fields.entry(item_type.item_type.clone()).or_default();
            for field in item_type.fields.iter() {
                match fields.get_mut(field.mapped_name()) {
                    Some(known) => known.merge(client),
                    None => {
                        fields.insert(
                            field.mapped_name().to_string(),
                            Availability::Client(client.clone()),
                        );
                    }
                }
            }
        }
    }
    valid
}

fn extract_aliases(
    schemas: &[(String, SchemaDocument)],
) -> BTreeMap<String, BTreeMap<String, Vec<String>>> {
    // (alias, base) -> declaring client, or SHARED_ALIASES
    let mut declared: BTreeMap<(String, String), String> = BTreeMap::new();
    for (client, schema) in schemas {
        for item_type in schema.item_types.iter() {
            for field in item_type.fields.iter() {
                let Some(base) = field.base_field.as_ref() else {
                    continue;
                };
                let key = (field.field.clone(), base.clone());
                match declared.get_mut(&key) {
                    Some(known) if known != client => *known = SHARED_ALIASES.to_string(),
                    Some(_) => {}
                    None => {
                        declared.insert(key, client.clone());
                    }
                }
            }
        }
    }

    let mut aliases: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
    for ((alias, base), client) in declared {
        aliases
            .entry(client)
            .or_default()
            .entry(base)
            .or_default()
            .push(alias);
    }
    aliases
}

fn extract_csl_types(schemas: &[(String, SchemaDocument)]) -> Vec<String> {
    let mut types = BTreeSet::new();
    for (_, schema) in schemas {
        types.extend(schema.csl.types.keys().cloned());
        types.extend(
            schema
                .csl
                .unmapped
                .iter()
                .filter(|(_, kind)| kind.as_str() == "type")
                .map(|(field, _)| field.clone()),
        );
    }
    types.into_iter().collect()
}
