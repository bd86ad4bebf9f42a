//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use extra_fields::schema::SchemaDocument;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

#[allow(dead_code)]
pub fn schema(value: serde_json::Value) -> SchemaDocument {
    serde_json::from_value(value).unwrap()
}

/// A small zotero-style schema: a book with a creator role mapped to CSL `author`, a title, a
/// base-field alias and the long-form fields that are always pruned.
#[allow(dead_code)]
pub fn zotero_schema() -> serde_json::Value {
    json!({
        "meta": {"fields": {"date": {"type": "date"}}},
        "itemTypes": [
            {
                "itemType": "book",
                "fields": [
                    {"field": "title"},
                    {"field": "date"},
                    {"field": "abstractNote"},
                    {"field": "extra"}
                ],
                "creatorTypes": [{"creatorType": "creator", "primary": true}]
            },
            {
                "itemType": "film",
                "fields": [
                    {"field": "title"},
                    {"field": "distributor", "baseField": "publisher"}
                ],
                "creatorTypes": [{"creatorType": "director", "primary": true}]
            }
        ],
        "csl": {
            "types": {"book": ["book"], "motion_picture": ["film"]},
            "fields": {
                "text": {
                    "title": ["title"],
                    "publisher": ["publisher"],
                    "abstract": ["abstractNote"],
                    "note": ["extra"]
                },
                "date": {"issued": "date"}
            },
            "names": {"creator": "author", "director": "director"},
            "unmapped": {"dataset": "type", "genre": "text"}
        }
    })
}

/// A second client that adds a legal item type and two fields fanning into CSL `container-title`.
#[allow(dead_code)]
pub fn jurism_schema() -> serde_json::Value {
    json!({
        "meta": {"fields": {"date": {"type": "date"}}},
        "itemTypes": [
            {
                "itemType": "book",
                "fields": [{"field": "title"}, {"field": "date"}],
                "creatorTypes": [{"creatorType": "creator", "primary": true}]
            },
            {
                "itemType": "case",
                "fields": [
                    {"field": "caseName", "baseField": "title"},
                    {"field": "court", "baseField": "authority"},
                    {"field": "titleShort"}
                ]
            },
            {
                "itemType": "bookSection",
                "fields": [{"field": "bookTitle"}, {"field": "publicationTitle"}]
            }
        ],
        "csl": {
            "types": {"legal_case": ["case"]},
            "fields": {
                "text": {
                    "title": ["title"],
                    "title-short": ["titleShort"],
                    "authority": ["authority"],
                    "container-title": ["publicationTitle", "bookTitle"]
                },
                "date": {"issued": ["date"]}
            },
            "names": {"creator": "author"},
            "alias": {"court": "authority"}
        }
    })
}

/// Write a schema document and a config pointing at it into `dir`. Returns the config path.
#[allow(dead_code)]
pub fn write_config(dir: &Path, clients: &[(&str, serde_json::Value)]) -> PathBuf {
    let mut config = String::from("primary_domain = \"zotero\"\nsecondary_domain = \"csl\"\n");
    for (name, schema) in clients {
        let file = format!("{name}.json");
        std::fs::write(dir.join(&file), serde_json::to_string(schema).unwrap()).unwrap();
        config.push_str(&format!(
            "\n[[clients]]\nname = \"{name}\"\nschema = \"{file}\"\n"
        ));
    }
    config.push_str(
        "\n[output]\nmapping = \"gen/extra-fields.json\"\ndocs = \"gen/extra-fields.md\"\n\
         graph = \"gen/extra-fields.gml\"\ncreators = \"gen/creators.json\"\n\
         fields = \"gen/fields.json\"\ncsl_types = \"gen/csl-types.json\"\n",
    );
    let path = dir.join("extra-fields.toml");
    std::fs::write(&path, config).unwrap();
    path
}
