//! Shared test utilities for unit tests

use crate::schema::SchemaDocument;

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Build a schema document from an inline JSON literal. Missing sections default to empty.
pub fn schema_from_json(value: serde_json::Value) -> SchemaDocument {
    serde_json::from_value(value).expect("test schema should deserialize")
}
