//! Serde model of a normalized (already fetched and patched) schema document.
//!
//! Only the parts the mapping engine reads are modelled; everything else in the document is
//! ignored.
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs::read_to_string, path::Path, str::FromStr};

use crate::error::ExtraFieldsError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaDocument {
    pub meta: SchemaMeta,
    #[serde(rename = "itemTypes")]
    pub item_types: Vec<ItemType>,
    pub csl: CslSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaMeta {
    pub fields: BTreeMap<String, FieldMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMeta {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemType {
    #[serde(rename = "itemType")]
    pub item_type: String,
    pub fields: Vec<ItemField>,
    #[serde(rename = "creatorTypes")]
    pub creator_types: Vec<CreatorType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemField {
    pub field: String,
    #[serde(rename = "baseField", default, skip_serializing_if = "Option::is_none")]
    pub base_field: Option<String>,
}

impl ItemField {
    /// The identity this field maps under: its base field when it is an alias.
    pub fn mapped_name(&self) -> &str {
        self.base_field.as_deref().unwrap_or(&self.field)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatorType {
    #[serde(rename = "creatorType")]
    pub creator_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CslSection {
    /// CSL type to the item types it covers.
    pub types: BTreeMap<String, Vec<String>>,
    pub fields: CslFields,
    /// Primary-domain creator role to CSL name variable.
    pub names: BTreeMap<String, String>,
    /// CSL variables without a primary-domain counterpart, with their kind.
    pub unmapped: BTreeMap<String, String>,
    /// Alternate spelling to CSL variable.
    pub alias: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CslFields {
    pub text: BTreeMap<String, Vec<String>>,
    pub date: BTreeMap<String, OneOrMany>,
}

/// Date mappings are a single field in some schema variants and a list in others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(field) => vec![field.clone()],
            OneOrMany::Many(fields) => fields.clone(),
        }
    }
}

impl SchemaDocument {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<SchemaDocument, ExtraFieldsError> {
        tracing::debug!("Reading schema document {:?}", path.as_ref());
        let content = read_to_string(path)?;
        content.parse()
    }

    pub fn field_type(&self, field: &str) -> Option<&str> {
        self.meta
            .fields
            .get(field)
            .and_then(|meta| meta.kind.as_deref())
    }
}

impl FromStr for SchemaDocument {
    type Err = ExtraFieldsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}
